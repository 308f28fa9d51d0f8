pub mod context;
pub mod model;

pub use context::{
    most_recent_download, truncate_at_boundary, StaticDataContext, BOUNDARY_PATCH,
    INDEX_FILE_NAME,
};
pub use model::{
    Bundle, LanguageFile, LanguageFiles, PathCollection, RuneImageFile, SpriteFile,
    validate_patch, BUNDLE_MANIFEST_NAME,
};
