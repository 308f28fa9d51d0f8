pub mod data_type;
pub mod model;
pub mod serializer;

pub use data_type::{DataDefinition, StaticDataType};
pub use model::{
    ChampionProperties, ChampionRole, ImageReference, ItemProperties, PropertySet,
    RuneProperties, RuneSlot, StaticProperties,
};
pub use serializer::{save_property_set, write_json_atomic};
