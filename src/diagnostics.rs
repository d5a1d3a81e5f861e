use log::warn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use yansi::Paint;

use crate::card::IdentityKey;

/// Problems that are reported and counted but never abort a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum Diagnostic {
    #[error("0 cards found in `{}`{}", .file.display(), grid_hint(.grid_view))]
    ParseYieldedZero { file: PathBuf, grid_view: bool },

    #[error("purchase of {key} matches no tracked catalogue card (set not tracked?)")]
    UnmatchedPurchase { key: IdentityKey },

    #[error("dropped sighting in `{}`: {detail}", .file.display())]
    MalformedIdentity { file: PathBuf, detail: String },

    #[error("want list conversion failed: {reason}")]
    ExternalConversionFailure { reason: String },
}

fn grid_hint(grid_view: &bool) -> &'static str {
    if *grid_view {
        " (page saved in grid view, switch to list view)"
    } else {
        ""
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn empty_pages(&self) -> usize {
        self.count(|d| matches!(d, Diagnostic::ParseYieldedZero { .. }))
    }

    pub fn unmatched_purchases(&self) -> usize {
        self.count(|d| matches!(d, Diagnostic::UnmatchedPurchase { .. }))
    }

    pub fn malformed(&self) -> usize {
        self.count(|d| matches!(d, Diagnostic::MalformedIdentity { .. }))
    }

    pub fn conversion_failures(&self) -> usize {
        self.count(|d| matches!(d, Diagnostic::ExternalConversionFailure { .. }))
    }

    fn count(&self, predicate: impl Fn(&Diagnostic) -> bool) -> usize {
        self.entries.iter().filter(|d| predicate(d)).count()
    }

    pub fn print_summary(&self) {
        if self.is_empty() {
            eprintln!("{}", "No skipped or unmatched items".green());
            return;
        }

        eprintln!("{}", "End of run report:".yellow().bold());
        eprintln!("  pages with 0 cards:   {}", self.empty_pages());
        eprintln!("  unmatched purchases:  {}", self.unmatched_purchases());
        eprintln!("  dropped sightings:    {}", self.malformed());
        eprintln!("  failed conversions:   {}", self.conversion_failures());
    }
}
