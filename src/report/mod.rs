mod converter;
mod html;
mod want_list;

use anyhow::Result;
use log::{debug, info};
use serde::Serialize;
use std::{path::PathBuf, time::Instant};

use crate::{
    card::CardRecord,
    diagnostics::Diagnostics,
    metrics::{Metrics, OverallSummary, SetSummary},
    reconcile::Collection,
    select::want_entries,
    storage::{DataStore, StoreLocation},
};

pub use self::converter::Converter;
pub use self::want_list::{Convert, WantListFormat};

/// Layout of `collection.json`.
#[derive(Serialize)]
struct CollectionFile<'a> {
    records: Vec<&'a CardRecord>,
    unmatched: &'a [CardRecord],
    sets: &'a [SetSummary],
    overall: &'a OverallSummary,
}

/// Everything written by one report run.
pub struct ReportSummary {
    pub files: Vec<PathBuf>,
    pub sets: usize,
    pub wanted: usize,
}

/// Writes the collection file, the HTML pages and every want list.
///
/// Output depends only on `collection`, so two runs over the same cache
/// produce identical files.
pub fn write_reports(
    store: &DataStore,
    collection: &Collection,
    converter: Option<&dyn Convert>,
    diagnostics: &mut Diagnostics,
) -> Result<ReportSummary> {
    let start = Instant::now();
    let metrics = Metrics::compute(collection);
    let mut files = Vec::new();

    let data = CollectionFile {
        records: collection.records().collect(),
        unmatched: collection.unmatched(),
        sets: &metrics.sets,
        overall: &metrics.overall,
    };
    files.push(store.write_json(StoreLocation::CollectionFile, &data)?);

    files.push(store.write_text(StoreLocation::IndexFile, &html::render_index(&metrics))?);

    let by_set = collection.by_set();
    for summary in &metrics.sets {
        let records = by_set
            .get(&summary.set_code)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let page = html::render_set_page(summary, records);
        files.push(store.write_text(StoreLocation::SetPage(&summary.set_code), &page)?);
        debug!("rendered set page for {}", summary.set_code);
    }
    info!("rendered {} set pages", metrics.sets.len());

    let wanted = want_entries(collection);
    for format in WantListFormat::ALL {
        let content = match format {
            WantListFormat::Simple => want_list::render_simple(&wanted),
            WantListFormat::Marketplace => want_list::render_marketplace(&wanted),
            WantListFormat::Decklist => want_list::render_decklist(&wanted),
            WantListFormat::Converted => {
                want_list::render_converted(&wanted, converter, diagnostics)
            }
        };
        files.push(store.write_text(StoreLocation::WantList(format.file_stem()), &content)?);
    }
    info!("want lists: {} cards", wanted.len());

    info!("report generation took: {:?}", start.elapsed());
    Ok(ReportSummary {
        files,
        sets: metrics.sets.len(),
        wanted: wanted.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{tests::record, Status, Variant};
    use crate::reconcile::reconcile;
    use std::fs;

    fn collection() -> Collection {
        let catalogue = vec![
            record("TWM", "133", Variant::normal(), Status::Owned),
            record("TWM", "133", Variant::reverse_holo(), Status::Needed),
            record("TWM", "049", Variant::normal(), Status::Needed),
            record("PAL", "7", Variant::normal(), Status::Needed),
        ];
        let purchases = vec![record("PAL", "007", Variant::normal(), Status::PendingDelivery)];
        reconcile(&catalogue, &purchases, &mut Diagnostics::new())
    }

    #[test]
    fn writes_every_output() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path(), &dir.path().join("card_data.json"));

        let summary = write_reports(&store, &collection(), None, &mut Diagnostics::new()).unwrap();

        assert_eq!(summary.sets, 2);
        assert_eq!(summary.wanted, 1);
        // collection, index, two set pages, four want lists
        assert_eq!(summary.files.len(), 8);
        for file in &summary.files {
            assert!(file.exists(), "missing {}", file.display());
        }

        let decklist = fs::read_to_string(dir.path().join("want_list_decklist.txt")).unwrap();
        assert!(decklist.contains("1 Card 049 TWM 49\n"));
        assert!(!decklist.contains("PAL"));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let collection = collection();

        for dir in [&first, &second] {
            let store = DataStore::new(dir.path(), &dir.path().join("card_data.json"));
            write_reports(&store, &collection, None, &mut Diagnostics::new()).unwrap();
        }

        for name in ["collection.json", "index.html", "set_twm.html", "want_list_converted.txt"] {
            assert_eq!(
                fs::read(first.path().join(name)).unwrap(),
                fs::read(second.path().join(name)).unwrap(),
                "{name} differs"
            );
        }
    }
}
