//! Command-line front end for the static data cache.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use static_data_lib::commands;
use static_data_lib::core::language::Language;
use static_data_lib::core::properties::{ChampionProperties, ItemProperties, RuneProperties};
use static_data_lib::{AppState, StaticDataResult};

#[derive(Parser)]
#[command(name = "static-data", about = "Manage the patch-versioned static data cache")]
struct Cli {
    /// Application directory (defaults to $STATIC_DATA_DIR or the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List known patches, newest first
    Patches {
        /// Fetch the list again even if one is cached
        #[arg(long, default_value_t = false)]
        refresh: bool,
    },
    /// List cached bundles
    List,
    /// Download all data for a patch
    Download {
        patch: String,
        /// Language (short name like `de` or region code like `de_DE`)
        #[arg(long)]
        language: Option<Language>,
    },
    /// Delete a cached bundle
    Delete { patch: String },
    /// Disk usage in bytes, for the whole cache or a single patch
    Usage { patch: Option<String> },
    /// Look up a single entry, falling back to other patches and languages
    Lookup {
        #[arg(value_enum)]
        kind: LookupKind,
        id: String,
        patch: String,
        #[arg(long)]
        language: Option<Language>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LookupKind {
    Item,
    Champion,
    Rune,
}

fn print_json<T: Serialize>(value: &T) -> StaticDataResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> StaticDataResult<()> {
    let state = AppState::new(cli.data_dir).await?.into_shared();

    match cli.command {
        Command::Patches { refresh } => print_json(&commands::list_patches(&state, refresh).await?),
        Command::List => print_json(&commands::list_bundles(&state).await?),
        Command::Download { patch, language } => {
            print_json(&commands::download_bundle(&state, patch, language).await?)
        }
        Command::Delete { patch } => commands::delete_bundle(&state, patch).await,
        Command::Usage { patch } => print_json(&commands::get_disk_usage(&state, patch).await),
        Command::Lookup {
            kind,
            id,
            patch,
            language,
        } => match kind {
            LookupKind::Item => print_json(
                &commands::lookup_properties::<ItemProperties>(&state, id, patch, language).await,
            ),
            LookupKind::Champion => print_json(
                &commands::lookup_properties::<ChampionProperties>(&state, id, patch, language)
                    .await,
            ),
            LookupKind::Rune => print_json(
                &commands::lookup_properties::<RuneProperties>(&state, id, patch, language).await,
            ),
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    static_data_lib::init_tracing();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
