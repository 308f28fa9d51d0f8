pub mod commands;
pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::error::{StaticDataError, StaticDataResult};
pub use crate::core::manager::StaticDataManager;
pub use crate::core::state::{AppState, SharedState};

/// Install the structured logging subscriber. `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,static_data_lib=debug")),
        )
        .with_writer(std::io::stderr)
        .init();
}
