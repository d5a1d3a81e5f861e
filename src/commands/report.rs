use anyhow::{bail, Result};
use log::warn;
use yansi::Paint;

use crate::{
    config::Config,
    diagnostics::Diagnostic,
    extractor::Extraction,
    reconcile::reconcile,
    report::{write_reports, Convert, Converter},
    storage::DataStore,
};

/// Reconciles a cached extraction and writes every report.
pub fn generate(config: &Config, extraction: &Extraction) -> Result<()> {
    let mut diagnostics = extraction.diagnostics.clone();
    let collection = reconcile(&extraction.catalogue, &extraction.purchases, &mut diagnostics);

    let converter = if config.converter.enabled {
        match Converter::new(&config.converter) {
            Ok(converter) => Some(converter),
            Err(e) => {
                warn!("want list conversion unavailable: {:#}", e);
                diagnostics.report(Diagnostic::ExternalConversionFailure {
                    reason: format!("{e:#}"),
                });
                None
            }
        }
    } else {
        None
    };

    let store = DataStore::new(&config.output_dir, &config.cache_file);
    let summary = write_reports(
        &store,
        &collection,
        converter.as_ref().map(|c| c as &dyn Convert),
        &mut diagnostics,
    )?;

    eprintln!(
        "{} {} cards in {} sets, {} wanted, {} files written to {}",
        "Reports ready:".green().bold(),
        collection.len(),
        summary.sets,
        summary.wanted,
        summary.files.len(),
        config.output_dir.display()
    );
    diagnostics.print_summary();
    Ok(())
}

pub fn run_report(config: &Config) -> Result<()> {
    let store = DataStore::new(&config.output_dir, &config.cache_file);
    let Some(extraction) = store.read_cache()? else {
        bail!(
            "no cache at `{}`, run `binder extract` first",
            store.cache_path().display()
        );
    };

    eprintln!("Loaded data extracted on: {}", extraction.extracted_at.format("%Y-%m-%d %H:%M:%S"));
    generate(config, &extraction)
}
