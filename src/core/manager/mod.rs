mod static_data;

pub use static_data::StaticDataManager;
