use std::borrow::Cow;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::model::{validate_patch, Bundle, BUNDLE_MANIFEST_NAME};
use crate::core::disk::find_files_named;
use crate::core::error::{StaticDataError, StaticDataResult};
use crate::core::properties::write_json_atomic;

pub const INDEX_FILE_NAME: &str = "index.json";

/// Oldest patch any remote source still serves data for.
pub const BOUNDARY_PATCH: &str = "7.22.1";

/// Every known bundle plus cache-wide metadata, persisted as `index.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaticDataContext {
    #[serde(default)]
    bundles: Vec<Bundle>,
    /// Most recent first, ending at [`BOUNDARY_PATCH`].
    #[serde(default)]
    pub known_patch_numbers: Vec<String>,
    #[serde(default)]
    pub last_patch_fetch: Option<DateTime<Utc>>,
}

impl StaticDataContext {
    pub fn index_path(data_path: &Path) -> PathBuf {
        data_path.join(INDEX_FILE_NAME)
    }

    /// Load `index.json`, or rebuild the index from bundle manifests when
    /// the file is missing.
    pub async fn load(data_path: &Path) -> StaticDataResult<Self> {
        let index_path = Self::index_path(data_path);
        if !index_path.exists() {
            info!("{} is missing", INDEX_FILE_NAME);
            return Self::reindex(data_path).await;
        }

        let json = tokio::fs::read_to_string(&index_path)
            .await
            .map_err(StaticDataError::io(&index_path))?;
        let context: StaticDataContext =
            serde_json::from_str(&json).map_err(StaticDataError::malformed(&index_path))?;

        for (i, bundle) in context.bundles.iter().enumerate() {
            if context.bundles[..i].iter().any(|b| b.patch() == bundle.patch()) {
                return Err(StaticDataError::DuplicateBundle(bundle.patch().to_string()));
            }
            bundle.validate()?;
        }

        info!("Found index, loaded {} bundles", context.bundles.len());
        Ok(context)
    }

    /// Build an index from every `bundle.json` found below `data_path`.
    /// Known patches are left empty and must be refreshed separately.
    pub async fn reindex(data_path: &Path) -> StaticDataResult<Self> {
        let root = data_path.to_path_buf();
        let manifests = tokio::task::spawn_blocking(move || {
            find_files_named(&root, BUNDLE_MANIFEST_NAME).map_err(StaticDataError::io(root))
        })
        .await??;

        let mut context = StaticDataContext::default();
        for manifest in manifests {
            info!("Discovered bundle {:?}", manifest);
            let bundle = Bundle::from_manifest(&manifest).await?;
            if context.get(bundle.patch()).is_some() {
                return Err(StaticDataError::DuplicateBundle(bundle.patch().to_string()));
            }
            context.bundles.push(bundle);
        }

        info!("Found and loaded {} existing bundles", context.bundles.len());
        Ok(context)
    }

    /// Write `index.json` and every bundle manifest.
    pub async fn save(&self, data_path: &Path) -> StaticDataResult<()> {
        for bundle in &self.bundles {
            bundle.save_manifest(data_path).await?;
        }
        write_json_atomic(&Self::index_path(data_path), self).await?;

        info!("Saved index with {} bundles", self.bundles.len());
        Ok(())
    }

    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn get(&self, patch: &str) -> Option<&Bundle> {
        self.bundles.iter().find(|b| b.patch() == patch)
    }

    /// Bundle for `patch`, or a placeholder flagged `just_created` that is
    /// not added to the index.
    pub fn get_bundle(&self, patch: &str) -> Cow<'_, Bundle> {
        match self.get(patch) {
            Some(bundle) => Cow::Borrowed(bundle),
            None => Cow::Owned(Bundle::placeholder(patch)),
        }
    }

    /// Bundle for `patch`, inserting an empty one if needed.
    pub fn get_or_insert(&mut self, patch: &str) -> StaticDataResult<&mut Bundle> {
        validate_patch(patch)?;
        let position = match self.bundles.iter().position(|b| b.patch() == patch) {
            Some(position) => position,
            None => {
                self.bundles.push(Bundle::new(patch));
                self.bundles.len() - 1
            }
        };
        Ok(&mut self.bundles[position])
    }

    /// The most recently downloaded bundle, used when a patch has no data.
    pub fn first_downloaded_bundle(&self) -> Option<&Bundle> {
        most_recent_download(&self.bundles)
    }

    pub fn replace_known_patches(&mut self, versions: impl IntoIterator<Item = String>) {
        self.known_patch_numbers = truncate_at_boundary(versions);
        self.last_patch_fetch = Some(Utc::now());
    }

    /// Remove the bundle's directory and its entry. Unknown patches are a no-op.
    pub async fn delete_bundle(&mut self, data_path: &Path, patch: &str) -> StaticDataResult<()> {
        validate_patch(patch)?;
        let Some(position) = self.bundles.iter().position(|b| b.patch() == patch) else {
            return Ok(());
        };

        let directory = self.bundles[position].directory(data_path);
        match tokio::fs::remove_dir_all(&directory).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Bundle directory {:?} was already gone", directory);
            }
            Err(source) => {
                return Err(StaticDataError::Io {
                    path: directory,
                    source,
                })
            }
        }

        self.bundles.remove(position);
        info!("Deleted bundle {}", patch);
        Ok(())
    }
}

/// Pick the bundle with the latest download date. Bundles never downloaded
/// rank below any downloaded one.
pub fn most_recent_download(bundles: &[Bundle]) -> Option<&Bundle> {
    bundles.iter().max_by_key(|b| b.last_download_date)
}

/// Keep versions in order up to and including [`BOUNDARY_PATCH`].
pub fn truncate_at_boundary(versions: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut kept = Vec::new();
    for version in versions {
        let at_boundary = version == BOUNDARY_PATCH;
        kept.push(version);
        if at_boundary {
            break;
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bundle::model::SpriteFile;
    use chrono::TimeZone;

    fn downloaded(patch: &str, day: u32) -> Bundle {
        let mut bundle = Bundle::new(patch);
        bundle.last_download_date = Some(Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap());
        bundle
    }

    fn context_with(bundles: Vec<Bundle>) -> StaticDataContext {
        StaticDataContext {
            bundles,
            ..Default::default()
        }
    }

    #[test]
    fn truncates_after_boundary_inclusive() {
        let versions = ["13.2.1", "13.1.1", "7.22.1", "7.21.1", "7.20.1"]
            .into_iter()
            .map(String::from);
        let kept = truncate_at_boundary(versions);
        assert_eq!(kept, vec!["13.2.1", "13.1.1", "7.22.1"]);
        assert_eq!(kept.last().map(String::as_str), Some(BOUNDARY_PATCH));
    }

    #[test]
    fn most_recent_download_prefers_latest_date() {
        let bundles = vec![downloaded("13.1.1", 1), downloaded("13.2.1", 5), Bundle::new("13.3.1")];
        assert_eq!(most_recent_download(&bundles).unwrap().patch(), "13.2.1");
        assert!(most_recent_download(&[]).is_none());
    }

    #[test]
    fn get_bundle_does_not_insert_placeholders() {
        let context = context_with(vec![downloaded("13.1.1", 1)]);

        let found = context.get_bundle("13.1.1");
        assert!(!found.is_just_created());

        let missing = context.get_bundle("13.5.1");
        assert!(missing.is_just_created());
        assert_eq!(missing.patch(), "13.5.1");
        assert_eq!(context.bundles().len(), 1);
    }

    #[test]
    fn get_or_insert_keeps_one_bundle_per_patch() {
        let mut context = StaticDataContext::default();
        context.get_or_insert("13.1.1").unwrap().mark_downloaded();
        context.get_or_insert("13.1.1").unwrap();
        assert_eq!(context.bundles().len(), 1);
        assert!(context.get("13.1.1").unwrap().last_download_date.is_some());

        assert!(matches!(
            context.get_or_insert(".."),
            Err(StaticDataError::InvalidPatch(_))
        ));
        assert_eq!(context.bundles().len(), 1);
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = downloaded("13.1.1", 1);
        first.item_data_files.try_insert("en_US", "13.1.1/item/en_US.data.json".into());
        first.champion_image_paths.replace_all(vec![SpriteFile {
            name: "champion0.png".into(),
            relative_path: "13.1.1/champion/sprite/champion0.png".into(),
        }]);
        let mut context = context_with(vec![first, downloaded("13.2.1", 2)]);
        context.replace_known_patches(vec!["13.2.1".to_string(), "13.1.1".to_string()]);

        context.save(dir.path()).await.unwrap();
        let loaded = StaticDataContext::load(dir.path()).await.unwrap();

        assert_eq!(loaded, context);
        assert!(dir.path().join("13.1.1").join(BUNDLE_MANIFEST_NAME).exists());
    }

    #[tokio::test]
    async fn missing_index_rebuilds_from_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = context_with(vec![downloaded("13.1.1", 1), downloaded("13.2.1", 2)]);
        context.replace_known_patches(vec!["13.2.1".to_string()]);
        context.save(dir.path()).await.unwrap();
        std::fs::remove_file(StaticDataContext::index_path(dir.path())).unwrap();

        let rebuilt = StaticDataContext::load(dir.path()).await.unwrap();

        assert_eq!(rebuilt.bundles(), context.bundles());
        assert!(rebuilt.known_patch_numbers.is_empty());
    }

    #[tokio::test]
    async fn empty_cache_loads_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let context = StaticDataContext::load(&dir.path().join("data")).await.unwrap();
        assert!(context.bundles().is_empty());
    }

    #[tokio::test]
    async fn malformed_index_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(StaticDataContext::index_path(dir.path()), "{ not json").unwrap();

        let result = StaticDataContext::load(dir.path()).await;
        assert!(matches!(result, Err(StaticDataError::Malformed { .. })));
    }

    #[tokio::test]
    async fn malformed_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("13.1.1")).unwrap();
        std::fs::write(dir.path().join("13.1.1").join(BUNDLE_MANIFEST_NAME), "[]").unwrap();

        let result = StaticDataContext::load(dir.path()).await;
        assert!(matches!(result, Err(StaticDataError::Malformed { .. })));
    }

    #[tokio::test]
    async fn deleting_unknown_patch_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = context_with(vec![downloaded("13.1.1", 1)]);
        let before = serde_json::to_vec(&context).unwrap();

        context.delete_bundle(dir.path(), "12.1.1").await.unwrap();

        assert_eq!(serde_json::to_vec(&context).unwrap(), before);
    }

    #[tokio::test]
    async fn deleting_bundle_removes_directory_and_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = context_with(vec![downloaded("13.1.1", 1), downloaded("13.2.1", 2)]);
        context.save(dir.path()).await.unwrap();

        context.delete_bundle(dir.path(), "13.1.1").await.unwrap();

        assert!(context.get("13.1.1").is_none());
        assert!(!dir.path().join("13.1.1").exists());
        assert!(dir.path().join("13.2.1").exists());
    }

    #[tokio::test]
    async fn deleting_bundle_with_missing_directory_drops_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = context_with(vec![downloaded("13.1.1", 1)]);
        assert!(!dir.path().join("13.1.1").exists());

        context.delete_bundle(dir.path(), "13.1.1").await.unwrap();

        assert!(context.bundles().is_empty());
    }

    #[tokio::test]
    async fn index_with_escaping_patch_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let data = root.path().join("data");
        let outside = root.path().join("precious");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::create_dir_all(&outside).unwrap();

        for patch in ["../precious", "", ".."] {
            let index = format!(r#"{{"bundles":[{{"patch":"{}"}}]}}"#, patch);
            std::fs::write(StaticDataContext::index_path(&data), index).unwrap();

            let result = StaticDataContext::load(&data).await;
            assert!(
                matches!(result, Err(StaticDataError::InvalidPatch(_))),
                "{:?}",
                patch
            );
        }

        let mut context = StaticDataContext::default();
        assert!(context.delete_bundle(&data, "../precious").await.is_err());
        assert!(context.delete_bundle(&data, "").await.is_err());
        assert!(outside.exists());
        assert!(data.exists());
    }

    #[tokio::test]
    async fn manifest_with_escaping_patch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("13.1.1")).unwrap();
        std::fs::write(
            dir.path().join("13.1.1").join(BUNDLE_MANIFEST_NAME),
            r#"{"patch":"../.."}"#,
        )
        .unwrap();

        let result = StaticDataContext::load(dir.path()).await;
        assert!(matches!(result, Err(StaticDataError::InvalidPatch(_))));
    }
}
