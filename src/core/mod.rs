// ─── Static Data Core ───
// Patch-versioned bundle cache with layered fallback resolution.
//
// Architecture:
//   core/
//     bundle/    : Bundle model + on-disk index (load, re-index, save, delete)
//     properties/: Property set types, data type flags, serializer
//     fetch/     : Remote sources (Data Dragon, Community Dragon)
//     downloader/: Concurrent file downloads
//     manager/   : Resolution with fallback + download orchestration
//     state/     : Settings and application state

pub mod bundle;
pub mod disk;
pub mod downloader;
pub mod error;
pub mod fetch;
pub mod http;
pub mod language;
pub mod manager;
pub mod properties;
pub mod state;
