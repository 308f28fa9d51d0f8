use serde::Serialize;
use tracing::{info, warn};

use crate::core::bundle::Bundle;
use crate::core::error::{StaticDataError, StaticDataResult};
use crate::core::language::Language;
use crate::core::properties::{StaticDataType, StaticProperties};
use crate::core::state::{CacheSettings, SharedState};

#[derive(Debug, Serialize)]
pub struct BundleInfo {
    pub patch: String,
    pub last_download_date: Option<String>,
    pub item_languages: Vec<String>,
    pub champion_languages: Vec<String>,
    pub rune_languages: Vec<String>,
    pub item_sprites: usize,
    pub champion_sprites: usize,
    pub rune_images: usize,
    pub total_size_bytes: Option<u64>,
}

impl From<&Bundle> for BundleInfo {
    fn from(bundle: &Bundle) -> Self {
        Self {
            patch: bundle.patch().to_string(),
            last_download_date: bundle.last_download_date.map(|date| date.to_rfc3339()),
            item_languages: bundle.item_data_files.languages().map(String::from).collect(),
            champion_languages: bundle
                .champion_data_files
                .languages()
                .map(String::from)
                .collect(),
            rune_languages: bundle.rune_data_files.languages().map(String::from).collect(),
            item_sprites: bundle.item_image_paths.len(),
            champion_sprites: bundle.champion_image_paths.len(),
            rune_images: bundle.rune_image_files.len(),
            total_size_bytes: None,
        }
    }
}

pub async fn list_patches(state: &SharedState, refresh: bool) -> StaticDataResult<Vec<String>> {
    let mut state = state.lock().await;
    if refresh {
        state.manager.refresh_patches().await?;
    } else {
        state.manager.ensure_patches_loaded().await?;
    }
    state.manager.save_index().await?;
    Ok(state.manager.context.known_patch_numbers.clone())
}

pub async fn list_bundles(state: &SharedState) -> StaticDataResult<Vec<BundleInfo>> {
    let state = state.lock().await;
    let mut infos = Vec::new();
    for bundle in state.manager.context.bundles() {
        let mut info = BundleInfo::from(bundle);
        info.total_size_bytes = state.manager.calculate_disk_usage(Some(bundle.patch())).await;
        infos.push(info);
    }
    Ok(infos)
}

/// Download everything a patch needs in one language: property sets for
/// every type, item and champion sprites, rune icons. Saves the index.
pub async fn download_bundle(
    state: &SharedState,
    patch: String,
    language: Option<Language>,
) -> StaticDataResult<BundleInfo> {
    let mut state = state.lock().await;
    let language = language.unwrap_or(state.settings.language);
    let code = language.riot_region_code();

    state.manager.ensure_patches_loaded().await?;
    if !state
        .manager
        .context
        .known_patch_numbers
        .iter()
        .any(|known| known == &patch)
    {
        return Err(StaticDataError::UnknownPatch(patch));
    }

    info!("Downloading bundle {} ({})", patch, code);
    let result = async {
        state
            .manager
            .download_properties(&patch, StaticDataType::ALL, code)
            .await?;
        state
            .manager
            .download_images(&patch, StaticDataType::ITEM | StaticDataType::CHAMPION)
            .await?;
        state
            .manager
            .download_rune_images_for_language(&patch, code)
            .await
    }
    .await;

    // Whatever finished is worth keeping, even if a later step failed.
    state.manager.save_index().await?;
    result?;

    let bundle = state
        .manager
        .context
        .get(&patch)
        .ok_or_else(|| StaticDataError::Other(format!("Bundle {} missing after download", patch)))?;
    let mut info = BundleInfo::from(bundle);
    info.total_size_bytes = state.manager.calculate_disk_usage(Some(&patch)).await;
    Ok(info)
}

pub async fn delete_bundle(state: &SharedState, patch: String) -> StaticDataResult<()> {
    let mut state = state.lock().await;
    state.manager.delete_bundle(&patch).await?;
    state.manager.save_index().await?;
    info!("Deleted bundle {}", patch);
    Ok(())
}

pub async fn get_disk_usage(state: &SharedState, patch: Option<String>) -> Option<u64> {
    let state = state.lock().await;
    state.manager.calculate_disk_usage(patch.as_deref()).await
}

pub async fn lookup_properties<T: StaticProperties>(
    state: &SharedState,
    id: String,
    patch: String,
    language: Option<Language>,
) -> Option<T> {
    let state = state.lock().await;
    let language = language.unwrap_or(state.settings.language);
    state
        .manager
        .get_properties::<T>(&id, &patch, language.riot_region_code())
        .await
}

pub async fn get_settings(state: &SharedState) -> CacheSettings {
    state.lock().await.settings.clone()
}

/// Persist new settings. Network settings apply on the next start.
pub async fn update_settings(
    state: &SharedState,
    settings: CacheSettings,
) -> StaticDataResult<CacheSettings> {
    let mut state = state.lock().await;
    if settings.user_agent != state.settings.user_agent {
        warn!("User agent change takes effect after restart");
    }
    state.settings = settings;
    state.save_settings().map_err(StaticDataError::io(state.settings_path()))?;
    Ok(state.settings.clone())
}
