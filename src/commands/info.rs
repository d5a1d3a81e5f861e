use anyhow::{bail, Result};
use yansi::Paint;

use crate::{
    config::Config,
    diagnostics::Diagnostics,
    metrics::{format_percent, Metrics},
    page::SourceKind,
    reconcile::reconcile,
    storage::DataStore,
};

pub fn show_info(config: &Config) -> Result<()> {
    let store = DataStore::new(&config.output_dir, &config.cache_file);
    let Some(extraction) = store.read_cache()? else {
        bail!("no cache at `{}`", store.cache_path().display());
    };

    println!("{} {}", "cache:".bold(), store.cache_path().display());
    println!(
        "{} {}",
        "extracted at:".bold(),
        extraction.extracted_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "{} {} catalogue, {} purchase",
        "pages:".bold(),
        extraction.count(SourceKind::Catalogue),
        extraction.count(SourceKind::Purchase)
    );
    println!(
        "{} {} catalogue, {} purchase",
        "records:".bold(),
        extraction.catalogue.len(),
        extraction.purchases.len()
    );

    let collection = reconcile(
        &extraction.catalogue,
        &extraction.purchases,
        &mut Diagnostics::new(),
    );
    let metrics = Metrics::compute(&collection);

    println!("{}", "sets:".bold());
    for set in &metrics.sets {
        println!(
            "- {} {}: {}/{} ({}%)",
            set.set_code.cyan(),
            set.display_name(),
            set.cards.collected(),
            set.total_count,
            format_percent(set.completion_ratio())
        );
    }

    if !collection.unmatched().is_empty() {
        println!(
            "{} {}",
            "unmatched purchases:".yellow().bold(),
            collection.unmatched().len()
        );
    }

    if !extraction.diagnostics.is_empty() {
        println!(
            "{} {} pages with 0 cards, {} dropped sightings",
            "warnings:".yellow().bold(),
            extraction.diagnostics.empty_pages(),
            extraction.diagnostics.malformed()
        );
    }

    Ok(())
}
