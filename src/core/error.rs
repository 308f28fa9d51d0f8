use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the static data cache.
/// Every module returns `Result<T, StaticDataError>`.
#[derive(Debug, Error)]
pub enum StaticDataError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Persisted cache state that cannot be decoded. Never swallowed.
    #[error("Malformed cache file {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    // ── Index ───────────────────────────────────────────
    #[error("Bundle for patch {0} is listed more than once")]
    DuplicateBundle(String),

    #[error("Patch {0} is not in the known patch list")]
    UnknownPatch(String),

    /// A patch that is not a single plain directory name under the cache root.
    #[error("Invalid patch name {0:?}")]
    InvalidPatch(String),

    #[error("Bundle {patch} is corrupt: {reason}")]
    CorruptBundle { patch: String, reason: String },

    // ── Property sets ───────────────────────────────────
    #[error("No {data_type} data for language {language} in patch {patch}")]
    LanguageNotFound {
        patch: String,
        data_type: String,
        language: String,
    },

    #[error("No {data_type} data in any language for patch {patch}")]
    NoLanguageData { patch: String, data_type: String },

    #[error("{data_type} property not found: {id}")]
    PropertyNotFound { id: String, data_type: String },

    #[error("Rune data for {language} in patch {patch} is empty")]
    EmptyPropertySet { patch: String, language: String },

    // ── Runtime ─────────────────────────────────────────
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type StaticDataResult<T> = Result<T, StaticDataError>;

impl From<std::io::Error> for StaticDataError {
    fn from(source: std::io::Error) -> Self {
        StaticDataError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl StaticDataError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| StaticDataError::Io { path, source }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>) -> impl FnOnce(serde_json::Error) -> Self {
        let path = path.into();
        move |source| StaticDataError::Malformed { path, source }
    }
}

// Command results are printed as JSON, errors go out as plain strings.
impl serde::Serialize for StaticDataError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
