use anyhow::Result;
use log::info;
use std::time::Instant;

use crate::{
    config::Config,
    extractor::{Extraction, Extractor},
    page::SourceKind,
    storage::DataStore,
};

/// Parses every saved page and replaces the cache.
pub fn extract(config: &Config) -> Result<Extraction> {
    let extractor = Extractor::new(config);
    let store = DataStore::new(&config.output_dir, &config.cache_file);

    eprintln!("Extracting pages from {}...", config.data_dir.display());
    let start = Instant::now();

    let extraction = extractor.extract_all(&config.data_dir)?;
    store.write_cache(&extraction)?;

    eprintln!(
        "Extracted {} catalogue and {} purchase records from {} pages",
        extraction.catalogue.len(),
        extraction.purchases.len(),
        extraction.count(SourceKind::Catalogue) + extraction.count(SourceKind::Purchase)
    );
    info!("extract took: {:?}", start.elapsed());
    Ok(extraction)
}

pub fn run_extract(config: &Config) -> Result<()> {
    let extraction = extract(config)?;
    eprintln!("Cache written to {}", config.cache_file.display());
    extraction.diagnostics.print_summary();
    Ok(())
}
