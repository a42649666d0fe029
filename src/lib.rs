pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::converter::Converter;
use crate::providers::currency_api::CurrencyApiProvider;
use crate::store::Store;
use crate::store::disk::DiskStore;
use crate::store::memory::MemoryStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Convert,
    Rates { base: String },
    History,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = open_store(&config);
    let provider = CurrencyApiProvider::new(
        &config.provider.base_url,
        Arc::clone(&store),
        config.cache_ttl(),
    );

    match command {
        AppCommand::Convert => {
            let converter = Converter::new(&config.source, &config.target, Arc::clone(&store));
            cli::session::run(converter, &provider).await
        }
        AppCommand::Rates { base } => cli::rates::show_rates(&provider, &base).await,
        AppCommand::History => {
            cli::history::show_history(store.as_ref());
            Ok(())
        }
    }
}

/// Opens the durable store; degrades to an in-memory store when the data
/// directory is unusable so the session still works (without persistence).
fn open_store(config: &AppConfig) -> Arc<dyn Store> {
    let disk = config
        .default_data_path()
        .and_then(|path| DiskStore::open(&path));
    match disk {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Falling back to in-memory store: {e}");
            Arc::new(MemoryStore::new())
        }
    }
}
