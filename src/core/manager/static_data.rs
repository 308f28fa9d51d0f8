use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::core::bundle::{validate_patch, Bundle, StaticDataContext};
use crate::core::disk::directory_size_bytes;
use crate::core::downloader::Downloader;
use crate::core::error::{StaticDataError, StaticDataResult};
use crate::core::fetch::{
    CommunityDragonClient, DataDragonClient, RuneDescriptionSource, StaticDataSource,
};
use crate::core::http::build_http_client;
use crate::core::properties::{
    save_property_set, DataDefinition, PropertySet, RuneProperties, StaticDataType,
    StaticProperties,
};

/// Resolves (patch, language) requests against the cache and drives
/// downloads into it.
///
/// Not internally synchronized: callers serialize mutating calls for a
/// given cache root (see [`crate::core::state::SharedState`]).
pub struct StaticDataManager {
    /// Cache root. Every path stored in a bundle is relative to it.
    data_path: PathBuf,
    source: Arc<dyn StaticDataSource>,
    rune_descriptions: Arc<dyn RuneDescriptionSource>,
    pub context: StaticDataContext,
}

impl StaticDataManager {
    pub fn new(
        data_path: PathBuf,
        source: Arc<dyn StaticDataSource>,
        rune_descriptions: Arc<dyn RuneDescriptionSource>,
    ) -> Self {
        Self {
            data_path,
            source,
            rune_descriptions,
            context: StaticDataContext::default(),
        }
    }

    /// Manager backed by Data Dragon and Community Dragon.
    pub fn with_remote(
        data_path: PathBuf,
        user_agent: &str,
        download_concurrency: usize,
    ) -> StaticDataResult<Self> {
        let client = build_http_client(user_agent)?;
        let downloader = Downloader::new(client.clone()).with_concurrency(download_concurrency);

        Ok(Self::new(
            data_path,
            Arc::new(DataDragonClient::new(client.clone(), downloader)),
            Arc::new(CommunityDragonClient::new(client)),
        ))
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    // ── Index ───────────────────────────────────────────

    /// Load all static data information, must be done first.
    pub async fn load_index(&mut self) -> StaticDataResult<()> {
        self.context = StaticDataContext::load(&self.data_path).await?;
        Ok(())
    }

    pub async fn save_index(&self) -> StaticDataResult<()> {
        self.context.save(&self.data_path).await
    }

    // ── Patches ─────────────────────────────────────────

    /// Fetch the patch list only if none is known yet.
    pub async fn ensure_patches_loaded(&mut self) -> StaticDataResult<()> {
        if self.context.known_patch_numbers.is_empty() {
            self.refresh_patches().await?;
        }
        Ok(())
    }

    /// Replace the known patch list with a fresh one from the source.
    pub async fn refresh_patches(&mut self) -> StaticDataResult<()> {
        self.context.known_patch_numbers.clear();

        let versions = self.source.get_patch_list().await?;
        self.context.replace_known_patches(versions);

        info!(
            "Known patches refreshed: {}",
            self.context.known_patch_numbers.len()
        );
        Ok(())
    }

    // ── Lookups ─────────────────────────────────────────

    /// Bundle for `patch`, or the most recently downloaded bundle when the
    /// patch has no data. `None` only when the index is empty.
    pub fn resolve_bundle(&self, patch: &str) -> Option<&Bundle> {
        match self.context.get_bundle(patch) {
            Cow::Borrowed(bundle) => Some(bundle),
            Cow::Owned(placeholder) => {
                debug!(
                    "No bundle for {}, using most recent download",
                    placeholder.patch()
                );
                self.context.first_downloaded_bundle()
            }
        }
    }

    /// Property `id` for `patch` in `language`, falling back to the bundle's
    /// default language. Every failure is logged and turned into `None`.
    pub async fn get_properties<T: StaticProperties>(
        &self,
        id: &str,
        patch: &str,
        language: &str,
    ) -> Option<T> {
        let Some(bundle) = self.resolve_bundle(patch) else {
            error!(
                "could not find bundle for properties: {} - {} - {}",
                id, patch, language
            );
            return None;
        };

        match bundle
            .get_properties::<T>(id, &self.data_path, Some(language))
            .await
        {
            Ok(properties) => Some(properties),
            Err(e) => {
                warn!(
                    "could not load static data, loading backup: {} - {} - {} - {}",
                    id, patch, language, e
                );

                match bundle.get_properties::<T>(id, &self.data_path, None).await {
                    Ok(properties) => Some(properties),
                    Err(e) => {
                        error!(
                            "could not load any static data: {} - {} - {} - {}",
                            id, patch, language, e
                        );
                        None
                    }
                }
            }
        }
    }

    /// Absolute path of the sprite atlas `source`. Decoding is up to the caller.
    pub fn get_atlas_image(&self, source: &str, patch: &str) -> Option<PathBuf> {
        let Some(bundle) = self.resolve_bundle(patch) else {
            error!("could not find bundle for image: {} - {}", source, patch);
            return None;
        };

        match bundle.atlas_image_path(source, &self.data_path) {
            Some(path) if path.exists() => Some(path),
            Some(path) => {
                error!("image file missing for: {} - {} - {:?}", source, patch, path);
                None
            }
            None => {
                error!("could not load image for: {} - {}", source, patch);
                None
            }
        }
    }

    pub fn get_rune_image_path(&self, key: &str, patch: &str) -> Option<PathBuf> {
        let Some(bundle) = self.resolve_bundle(patch) else {
            error!("could not find bundle for image: {} - {}", key, patch);
            return None;
        };

        let path = bundle.rune_image_path(key, &self.data_path);
        if path.is_none() {
            error!("no rune image for: {} - {}", key, patch);
        }
        path
    }

    // ── Mutations ───────────────────────────────────────

    pub async fn delete_bundle(&mut self, patch: &str) -> StaticDataResult<()> {
        self.context.delete_bundle(&self.data_path, patch).await
    }

    /// Download sprite atlases for items and/or champions. Each type's
    /// collection is replaced only after its fetch succeeded.
    pub async fn download_images(
        &mut self,
        patch: &str,
        types: StaticDataType,
    ) -> StaticDataResult<()> {
        validate_patch(patch)?;
        if types.contains(StaticDataType::ITEM) {
            self.download_sprites(patch, DataDefinition::Item).await?;
        }
        if types.contains(StaticDataType::CHAMPION) {
            self.download_sprites(patch, DataDefinition::Champion).await?;
        }
        if types.contains(StaticDataType::RUNE) {
            // Rune icons are addressed through the rune property set.
            warn!("Runes cannot be downloaded with this function, use rune specific function");
        }
        Ok(())
    }

    async fn download_sprites(
        &mut self,
        patch: &str,
        definition: DataDefinition,
    ) -> StaticDataResult<()> {
        if definition == DataDefinition::Rune {
            return Ok(());
        }

        let sprites = self
            .source
            .get_sprite_images(&self.data_path, patch, definition)
            .await?;

        let bundle = self.context.get_or_insert(patch)?;
        match definition {
            DataDefinition::Item => bundle.item_image_paths.replace_all(sprites),
            _ => bundle.champion_image_paths.replace_all(sprites),
        }
        bundle.mark_downloaded();
        Ok(())
    }

    /// Download rune icons for already known rune properties. An empty
    /// rune list leaves the index untouched.
    pub async fn download_rune_images(
        &mut self,
        patch: &str,
        runes: &[RuneProperties],
    ) -> StaticDataResult<()> {
        validate_patch(patch)?;
        if runes.is_empty() {
            warn!("No runes given for {}, nothing to download", patch);
            return Ok(());
        }

        let files = self
            .source
            .get_rune_images(&self.data_path, patch, runes)
            .await?;

        let bundle = self.context.get_or_insert(patch)?;
        bundle.rune_image_files.replace_all(files);
        bundle.mark_downloaded();
        Ok(())
    }

    /// Download rune icons using the rune property set already saved for
    /// `language`.
    pub async fn download_rune_images_for_language(
        &mut self,
        patch: &str,
        language: &str,
    ) -> StaticDataResult<()> {
        validate_patch(patch)?;
        let runes: Vec<RuneProperties> = {
            let bundle = self.context.get_bundle(patch);
            bundle
                .load_property_set(&self.data_path, Some(language))
                .await?
        };

        if runes.is_empty() {
            return Err(StaticDataError::EmptyPropertySet {
                patch: patch.to_string(),
                language: language.to_string(),
            });
        }

        self.download_rune_images(patch, &runes).await
    }

    /// Download and save property sets for every type in `types`.
    ///
    /// Types are processed one by one. If one fails, the types saved before
    /// it stay recorded and the error is returned. The bundle is stamped
    /// only when at least one type was saved.
    pub async fn download_properties(
        &mut self,
        patch: &str,
        types: StaticDataType,
        language: &str,
    ) -> StaticDataResult<()> {
        validate_patch(patch)?;
        if types.is_empty() {
            warn!("No data types selected for {}, nothing to download", patch);
            return Ok(());
        }

        let mut succeeded = 0;
        let mut outcome = Ok(());

        for definition in DataDefinition::selected(types) {
            match self.download_property_set(patch, definition, language).await {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    error!(
                        "Failed to download {} data for {} ({}): {}",
                        definition, patch, language, e
                    );
                    outcome = Err(e);
                    break;
                }
            }
        }

        if succeeded > 0 {
            self.context.get_or_insert(patch)?.mark_downloaded();
        }
        outcome
    }

    async fn download_property_set(
        &mut self,
        patch: &str,
        definition: DataDefinition,
        language: &str,
    ) -> StaticDataResult<()> {
        let mut set = self
            .source
            .get_property_set(patch, definition, language)
            .await?;

        if let PropertySet::Runes(runes) = &mut set {
            self.rune_descriptions
                .get_rune_stat_descriptions(runes, patch, language)
                .await?;
        }

        let saved = save_property_set(&self.data_path, &set, patch, language).await?;

        let bundle = self.context.get_or_insert(patch)?;
        if !bundle.data_files_mut(definition).try_insert(language, saved) {
            warn!(
                "Failed to record {} data: {} already exists for {}",
                definition, language, patch
            );
        }
        Ok(())
    }

    // ── Disk usage ──────────────────────────────────────

    /// Bytes used by the whole cache, or by one patch. `None` if the patch
    /// has no bundle. The walk runs on the blocking pool.
    pub async fn calculate_disk_usage(&self, patch: Option<&str>) -> Option<u64> {
        let target = match patch.filter(|p| !p.is_empty()) {
            None => self.data_path.clone(),
            Some(patch) => match self.context.get(patch) {
                Some(bundle) => bundle.directory(&self.data_path),
                None => {
                    error!("Failed to calculate disk usage for patch: {}", patch);
                    return None;
                }
            },
        };

        match tokio::task::spawn_blocking(move || directory_size_bytes(&target)).await {
            Ok(total) => Some(total),
            Err(e) => {
                error!("Disk usage task failed: {}", e);
                None
            }
        }
    }
}
