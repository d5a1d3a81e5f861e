use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use crate::{
    card::CardRecord,
    config::Config,
    diagnostics::{Diagnostic, Diagnostics},
    normalize::normalize_page,
    page::{parse_page, SourceKind},
};

/// A saved page and the facts used to tell whether it changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

impl SourceFile {
    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Everything besides the pages themselves that shapes the parsed records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSettings {
    pub version: String,
    pub catalogue_pattern: String,
    pub purchase_pattern: String,
    pub variant_markers: Vec<String>,
}

/// Normalized records of every saved page, before reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub extracted_at: DateTime<Local>,
    #[serde(default)]
    pub settings: ExtractionSettings,
    pub sources: Vec<SourceFile>,
    pub catalogue: Vec<CardRecord>,
    pub purchases: Vec<CardRecord>,
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl Extraction {
    pub fn count(&self, kind: SourceKind) -> usize {
        self.sources.iter().filter(|s| s.kind == kind).count()
    }
}

struct PageResult {
    records: Vec<CardRecord>,
    diagnostics: Diagnostics,
}

pub struct Extractor {
    catalogue_pattern: String,
    purchase_pattern: String,
    variant_markers: Vec<String>,
}

impl Extractor {
    pub fn new(config: &Config) -> Extractor {
        Extractor {
            catalogue_pattern: config.catalogue_pattern.clone(),
            purchase_pattern: config.purchase_pattern.clone(),
            variant_markers: config.variant_markers.clone(),
        }
    }

    pub fn settings(&self) -> ExtractionSettings {
        ExtractionSettings {
            version: env!("CARGO_PKG_VERSION").to_string(),
            catalogue_pattern: self.catalogue_pattern.clone(),
            purchase_pattern: self.purchase_pattern.clone(),
            variant_markers: self.variant_markers.clone(),
        }
    }

    pub fn classify(&self, file_name: &str) -> Option<SourceKind> {
        if file_name.contains(&self.catalogue_pattern) {
            Some(SourceKind::Catalogue)
        } else if file_name.contains(&self.purchase_pattern) {
            Some(SourceKind::Purchase)
        } else {
            None
        }
    }

    /// Lists the saved pages in `data_dir`, catalogue pages first, each group
    /// sorted by file name.
    pub fn discover(&self, data_dir: &Path) -> Result<Vec<SourceFile>> {
        let entries = fs::read_dir(data_dir)
            .with_context(|| format!("cannot read data directory `{}`", data_dir.display()))?;

        let mut sources = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();

            let is_html = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
                .unwrap_or(false);
            if !is_html {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some(kind) = self.classify(&file_name) else {
                debug!("ignoring unrecognized page `{}`", file_name);
                continue;
            };

            let metadata = entry.metadata()?;
            sources.push(SourceFile {
                path,
                kind,
                size: metadata.len(),
                modified: metadata.modified()?.into(),
            });
        }

        sources.sort_by(|a, b| (a.kind, a.file_name()).cmp(&(b.kind, b.file_name())));
        Ok(sources)
    }

    fn extract_page(&self, source: &SourceFile) -> Result<PageResult> {
        let bytes = fs::read(&source.path)
            .with_context(|| format!("failed to read `{}`", source.path.display()))?;
        let html = String::from_utf8_lossy(&bytes);

        let page = parse_page(source.kind, &html, &self.variant_markers);
        let mut diagnostics = Diagnostics::new();
        let records = normalize_page(&source.path, source.kind, page.sightings(), &mut diagnostics);

        if records.is_empty() {
            diagnostics.report(Diagnostic::ParseYieldedZero {
                file: source.path.clone(),
                grid_view: page.wrong_view(),
            });
        }

        Ok(PageResult {
            records,
            diagnostics,
        })
    }

    /// Parses every page (in parallel) and merges the results in input order.
    pub fn extract_all(&self, data_dir: &Path) -> Result<Extraction> {
        let sources = self.discover(data_dir)?;
        info!(
            "found {} catalogue and {} purchase pages",
            sources.iter().filter(|s| s.kind == SourceKind::Catalogue).count(),
            sources.iter().filter(|s| s.kind == SourceKind::Purchase).count()
        );

        let start = Instant::now();
        let results: Vec<Result<PageResult>> = sources
            .par_iter()
            .map(|source| self.extract_page(source))
            .collect();

        let mut extraction = Extraction {
            extracted_at: Local::now(),
            settings: self.settings(),
            sources: Vec::new(),
            catalogue: Vec::new(),
            purchases: Vec::new(),
            diagnostics: Diagnostics::new(),
        };

        for (source, result) in sources.into_iter().zip(results) {
            match result {
                Ok(page) => {
                    eprintln!(
                        "Reading {} page: {} ({} cards)",
                        source.kind,
                        source.file_name(),
                        page.records.len()
                    );
                    match source.kind {
                        SourceKind::Catalogue => extraction.catalogue.extend(page.records),
                        SourceKind::Purchase => extraction.purchases.extend(page.records),
                    }
                    extraction.diagnostics.extend(page.diagnostics);
                }
                Err(e) => {
                    warn!("skipping `{}`: {:#}", source.path.display(), e);
                    extraction.diagnostics.report(Diagnostic::ParseYieldedZero {
                        file: source.path.clone(),
                        grid_view: false,
                    });
                }
            }
            extraction.sources.push(source);
        }

        info!("extraction took: {:?}", start.elapsed());
        Ok(extraction)
    }
}
