use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{StaticDataError, StaticDataResult};
use crate::core::properties::{write_json_atomic, DataDefinition, StaticProperties};

/// File name of the per-bundle manifest, used to rebuild a lost index.
pub const BUNDLE_MANIFEST_NAME: &str = "bundle.json";

/// A patch names the bundle's directory, so it must be exactly one plain
/// path component: no separators, no `.`/`..`, no root or prefix.
pub fn validate_patch(patch: &str) -> StaticDataResult<()> {
    let mut components = Path::new(patch).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name.to_str() == Some(patch) => Ok(()),
        _ => Err(StaticDataError::InvalidPatch(patch.to_string())),
    }
}

/// A downloaded sprite atlas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpriteFile {
    /// Atlas name as referenced by property sets (e.g. `item0.png`).
    pub name: String,
    pub relative_path: String,
}

/// A downloaded rune icon, keyed by the rune's atlas key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuneImageFile {
    pub key: String,
    pub relative_path: String,
}

/// Ordered collection of downloaded files. Can only be replaced as a whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PathCollection<T>(Vec<T>);

impl<T> Default for PathCollection<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> PathCollection<T> {
    /// Clear the collection and repopulate it from `entries`.
    pub fn replace_all(&mut self, entries: impl IntoIterator<Item = T>) {
        self.0.clear();
        self.0.extend(entries);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> FromIterator<T> for PathCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageFile {
    pub language: String,
    pub relative_path: String,
}

/// Language code → property set file. Keys are unique; the first entry is
/// the default language.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct LanguageFiles(Vec<LanguageFile>);

impl LanguageFiles {
    pub fn get(&self, language: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|f| f.language == language)
            .map(|f| f.relative_path.as_str())
    }

    pub fn default_entry(&self) -> Option<&LanguageFile> {
        self.0.first()
    }

    /// Insert if `language` is not present yet. Returns `false` and leaves
    /// the existing entry untouched otherwise.
    pub fn try_insert(&mut self, language: &str, relative_path: String) -> bool {
        if self.get(language).is_some() {
            return false;
        }
        self.0.push(LanguageFile {
            language: language.to_string(),
            relative_path,
        });
        true
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|f| f.language.as_str())
    }

    pub fn has_duplicates(&self) -> bool {
        self.0
            .iter()
            .enumerate()
            .any(|(i, f)| self.0[..i].iter().any(|prev| prev.language == f.language))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Cached artifacts of one patch. Every path is relative to the cache root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    patch: String,
    /// Set only on placeholders synthesized for an unknown patch.
    #[serde(skip)]
    just_created: bool,
    #[serde(default)]
    pub last_download_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub item_image_paths: PathCollection<SpriteFile>,
    #[serde(default)]
    pub champion_image_paths: PathCollection<SpriteFile>,
    #[serde(default)]
    pub rune_image_files: PathCollection<RuneImageFile>,

    #[serde(default)]
    pub item_data_files: LanguageFiles,
    #[serde(default)]
    pub champion_data_files: LanguageFiles,
    #[serde(default)]
    pub rune_data_files: LanguageFiles,
}

impl Bundle {
    pub fn new(patch: impl Into<String>) -> Self {
        Self {
            patch: patch.into(),
            just_created: false,
            last_download_date: None,
            item_image_paths: PathCollection::default(),
            champion_image_paths: PathCollection::default(),
            rune_image_files: PathCollection::default(),
            item_data_files: LanguageFiles::default(),
            champion_data_files: LanguageFiles::default(),
            rune_data_files: LanguageFiles::default(),
        }
    }

    /// Empty stand-in for a patch with no cached bundle.
    pub fn placeholder(patch: impl Into<String>) -> Self {
        Self {
            just_created: true,
            ..Self::new(patch)
        }
    }

    pub fn patch(&self) -> &str {
        &self.patch
    }

    pub fn is_just_created(&self) -> bool {
        self.just_created
    }

    pub fn mark_downloaded(&mut self) {
        self.last_download_date = Some(Utc::now());
    }

    pub fn data_files(&self, definition: DataDefinition) -> &LanguageFiles {
        match definition {
            DataDefinition::Item => &self.item_data_files,
            DataDefinition::Champion => &self.champion_data_files,
            DataDefinition::Rune => &self.rune_data_files,
        }
    }

    pub fn data_files_mut(&mut self, definition: DataDefinition) -> &mut LanguageFiles {
        match definition {
            DataDefinition::Item => &mut self.item_data_files,
            DataDefinition::Champion => &mut self.champion_data_files,
            DataDefinition::Rune => &mut self.rune_data_files,
        }
    }

    pub fn directory(&self, data_path: &Path) -> PathBuf {
        data_path.join(&self.patch)
    }

    pub fn manifest_path(&self, data_path: &Path) -> PathBuf {
        self.directory(data_path).join(BUNDLE_MANIFEST_NAME)
    }

    /// Rebuild a bundle from its `bundle.json` manifest.
    pub async fn from_manifest(path: &Path) -> StaticDataResult<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(StaticDataError::io(path))?;
        let bundle: Bundle = serde_json::from_str(&json).map_err(StaticDataError::malformed(path))?;
        bundle.validate()?;
        Ok(bundle)
    }

    pub async fn save_manifest(&self, data_path: &Path) -> StaticDataResult<()> {
        write_json_atomic(&self.manifest_path(data_path), self).await
    }

    pub(crate) fn validate(&self) -> StaticDataResult<()> {
        validate_patch(&self.patch)?;
        for definition in DataDefinition::ALL {
            if self.data_files(definition).has_duplicates() {
                return Err(StaticDataError::CorruptBundle {
                    patch: self.patch.clone(),
                    reason: format!("{} language listed more than once", definition),
                });
            }
        }
        Ok(())
    }

    /// Load the whole property set of type `T`. `None` selects the default
    /// (first recorded) language.
    pub async fn load_property_set<T: StaticProperties>(
        &self,
        data_path: &Path,
        language: Option<&str>,
    ) -> StaticDataResult<Vec<T>> {
        let files = self.data_files(T::DEFINITION);
        let relative = match language {
            Some(language) => files.get(language).ok_or_else(|| {
                StaticDataError::LanguageNotFound {
                    patch: self.patch.clone(),
                    data_type: T::DEFINITION.to_string(),
                    language: language.to_string(),
                }
            })?,
            None => files
                .default_entry()
                .map(|f| f.relative_path.as_str())
                .ok_or_else(|| StaticDataError::NoLanguageData {
                    patch: self.patch.clone(),
                    data_type: T::DEFINITION.to_string(),
                })?,
        };

        let path = data_path.join(relative);
        let json = tokio::fs::read_to_string(&path)
            .await
            .map_err(StaticDataError::io(&path))?;
        serde_json::from_str(&json).map_err(StaticDataError::malformed(path))
    }

    /// Find a single entry of type `T` by id.
    pub async fn get_properties<T: StaticProperties>(
        &self,
        id: &str,
        data_path: &Path,
        language: Option<&str>,
    ) -> StaticDataResult<T> {
        self.load_property_set::<T>(data_path, language)
            .await?
            .into_iter()
            .find(|entry| entry.id() == id)
            .ok_or_else(|| StaticDataError::PropertyNotFound {
                id: id.to_string(),
                data_type: T::DEFINITION.to_string(),
            })
    }

    /// Absolute path of the sprite atlas named `source`.
    pub fn atlas_image_path(&self, source: &str, data_path: &Path) -> Option<PathBuf> {
        self.item_image_paths
            .iter()
            .chain(self.champion_image_paths.iter())
            .find(|sprite| sprite.name == source)
            .map(|sprite| data_path.join(&sprite.relative_path))
    }

    pub fn rune_image_path(&self, key: &str, data_path: &Path) -> Option<PathBuf> {
        self.rune_image_files
            .iter()
            .find(|file| file.key == key)
            .map(|file| data_path.join(&file.relative_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(name: &str) -> SpriteFile {
        SpriteFile {
            name: name.into(),
            relative_path: format!("13.1.1/item/sprite/{}", name),
        }
    }

    #[test]
    fn try_insert_keeps_first_entry() {
        let mut files = LanguageFiles::default();
        assert!(files.try_insert("en_US", "a".into()));
        assert!(!files.try_insert("en_US", "b".into()));
        assert!(files.try_insert("de_DE", "c".into()));

        assert_eq!(files.get("en_US"), Some("a"));
        assert_eq!(files.default_entry().unwrap().language, "en_US");
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn replace_all_discards_previous_entries() {
        let mut paths: PathCollection<SpriteFile> =
            vec![sprite("item0.png"), sprite("item1.png")].into_iter().collect();
        paths.replace_all(vec![sprite("item2.png")]);

        assert_eq!(paths.len(), 1);
        assert_eq!(paths.iter().next().unwrap().name, "item2.png");
    }

    #[test]
    fn placeholder_flag_is_not_persisted() {
        let placeholder = Bundle::placeholder("14.1.1");
        assert!(placeholder.is_just_created());

        let json = serde_json::to_string(&placeholder).unwrap();
        assert!(!json.contains("justCreated"));
        let restored: Bundle = serde_json::from_str(&json).unwrap();
        assert!(!restored.is_just_created());
        assert_eq!(restored.patch(), "14.1.1");
    }

    #[test]
    fn image_lookups_join_the_cache_root() {
        let mut bundle = Bundle::new("13.1.1");
        bundle.item_image_paths.replace_all(vec![sprite("item0.png")]);
        bundle.rune_image_files.replace_all(vec![RuneImageFile {
            key: "Conqueror".into(),
            relative_path: "13.1.1/rune/img/Conqueror.png".into(),
        }]);

        let root = Path::new("/cache");
        assert_eq!(
            bundle.atlas_image_path("item0.png", root),
            Some(root.join("13.1.1/item/sprite/item0.png"))
        );
        assert_eq!(bundle.atlas_image_path("champion0.png", root), None);
        assert_eq!(
            bundle.rune_image_path("Conqueror", root),
            Some(root.join("13.1.1/rune/img/Conqueror.png"))
        );
        assert_eq!(bundle.rune_image_path("Electrocute", root), None);
    }

    #[test]
    fn duplicate_languages_fail_validation() {
        let json = r#"{
            "patch": "13.1.1",
            "itemDataFiles": [
                { "language": "en_US", "relativePath": "13.1.1/item/en_US.data.json" },
                { "language": "en_US", "relativePath": "13.1.1/item/other.data.json" }
            ]
        }"#;
        let bundle: Bundle = serde_json::from_str(json).unwrap();
        assert!(matches!(
            bundle.validate(),
            Err(StaticDataError::CorruptBundle { .. })
        ));
    }

    #[test]
    fn patch_must_be_a_single_directory_name() {
        for patch in ["13.1.1", "7.22.1", "14.1"] {
            assert!(validate_patch(patch).is_ok(), "{}", patch);
        }
        for patch in ["", ".", "..", "../x", "13.1.1/..", "a/b", "/tmp", "13.1.1/"] {
            assert!(
                matches!(validate_patch(patch), Err(StaticDataError::InvalidPatch(_))),
                "{:?}",
                patch
            );
        }
        assert!(Bundle::new("../precious").validate().is_err());
    }
}
