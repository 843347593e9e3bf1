//! itemforge - item consumption engine
//!
//! Loads the item catalog, builds the consume handlers, and runs a scripted
//! session against an in-memory world.

mod demo;
mod settings;

use std::sync::Arc;

use anyhow::{Context, Result};
use itemforge_consume::{ConsumeEngine, TracingObserver};
use itemforge_core::ItemCatalog;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use settings::EngineSettings;

const DEFAULT_CATALOG: &str = include_str!("../data/items.toml");

fn load_catalog(settings: &EngineSettings) -> Result<ItemCatalog> {
    match &settings.catalog.path {
        Some(path) => ItemCatalog::load(path)
            .with_context(|| format!("Failed to load item catalog from {:?}", path)),
        None => ItemCatalog::from_toml_str(DEFAULT_CATALOG)
            .context("Built-in item catalog is invalid"),
    }
}

fn main() -> Result<()> {
    let settings = EngineSettings::load();

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting itemforge...");

    if std::env::args().any(|arg| arg == "--write-settings") {
        settings.save()?;
    }

    let catalog = Arc::new(load_catalog(&settings)?);
    info!("Catalog holds {} items", catalog.len());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(settings.runtime.worker_threads.max(1))
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let engine = ConsumeEngine::new(
        Arc::clone(&catalog),
        runtime.handle().clone(),
        Arc::new(TracingObserver),
    );
    engine
        .initialize()
        .context("Consume handlers could not be built")?;

    let summary = runtime.block_on(demo::run(catalog, &engine, &settings.demo))?;
    let report = serde_json::to_string_pretty(&summary)?;
    info!("Session summary:\n{}", report);

    Ok(())
}
