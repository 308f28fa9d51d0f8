mod app_state;

pub use app_state::{AppState, CacheSettings, SharedState, DATA_DIR_ENV};
