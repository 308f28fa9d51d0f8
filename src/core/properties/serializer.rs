use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::model::PropertySet;
use crate::core::error::{StaticDataError, StaticDataResult};

/// Relative location of a property set file: `<patch>/<type>/<language>.data.json`.
pub fn property_set_relative_path(patch: &str, dir_name: &str, language: &str) -> String {
    format!("{}/{}/{}.data.json", patch, dir_name, language)
}

/// Write a property set to its canonical location, overwriting any previous
/// file, and return the path relative to `data_path`.
pub async fn save_property_set(
    data_path: &Path,
    set: &PropertySet,
    patch: &str,
    language: &str,
) -> StaticDataResult<String> {
    let relative = property_set_relative_path(patch, set.definition().dir_name(), language);
    let destination = data_path.join(&relative);

    match set {
        PropertySet::Items(items) => write_json_atomic(&destination, items).await?,
        PropertySet::Champions(champions) => write_json_atomic(&destination, champions).await?,
        PropertySet::Runes(runes) => write_json_atomic(&destination, runes).await?,
    }

    debug!("Saved {} {} entries to {:?}", set.len(), set.definition(), destination);
    Ok(relative)
}

/// Pretty-print `value` to `path` through a sibling temp file and a rename,
/// creating parent directories as needed.
pub async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StaticDataResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(StaticDataError::io(parent))?;
    }

    let json = serde_json::to_vec_pretty(value)?;
    let tmp = tmp_path(path);

    tokio::fs::write(&tmp, json)
        .await
        .map_err(StaticDataError::io(&tmp))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(StaticDataError::io(path))?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
