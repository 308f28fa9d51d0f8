// ─── Remote sources ───
// The cache never asks these for resolution decisions, it only pulls data
// through them. Both traits are object safe so the manager can hold them
// behind `Arc<dyn …>` and tests can swap in fakes.

mod community_dragon;
mod data_dragon;

use std::path::Path;

use async_trait::async_trait;

pub use community_dragon::CommunityDragonClient;
pub use data_dragon::DataDragonClient;

use crate::core::bundle::{RuneImageFile, SpriteFile};
use crate::core::error::StaticDataResult;
use crate::core::properties::{DataDefinition, PropertySet, RuneProperties};

/// Primary source of patch lists, property sets and images.
#[async_trait]
pub trait StaticDataSource: Send + Sync {
    /// Every patch identifier, most recent first.
    async fn get_patch_list(&self) -> StaticDataResult<Vec<String>>;

    async fn get_property_set(
        &self,
        patch: &str,
        definition: DataDefinition,
        language: &str,
    ) -> StaticDataResult<PropertySet>;

    /// Download sprite atlases below `data_path` and return them with paths
    /// relative to `data_path`.
    async fn get_sprite_images(
        &self,
        data_path: &Path,
        patch: &str,
        definition: DataDefinition,
    ) -> StaticDataResult<Vec<SpriteFile>>;

    /// Download one icon per rune below `data_path`.
    async fn get_rune_images(
        &self,
        data_path: &Path,
        patch: &str,
        runes: &[RuneProperties],
    ) -> StaticDataResult<Vec<RuneImageFile>>;
}

/// Secondary source for rune text the primary source lacks.
#[async_trait]
pub trait RuneDescriptionSource: Send + Sync {
    async fn get_rune_stat_descriptions(
        &self,
        runes: &mut [RuneProperties],
        patch: &str,
        language: &str,
    ) -> StaticDataResult<()>;
}
