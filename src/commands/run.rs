use anyhow::Result;
use log::{info, warn};

use crate::{
    config::Config,
    extractor::Extractor,
    storage::{stale_reasons, DataStore},
};

use super::{extract::extract, report::generate};

pub fn run(config: &Config, force: bool) -> Result<()> {
    let store = DataStore::new(&config.output_dir, &config.cache_file);
    let cached = match store.read_cache() {
        Ok(cached) => cached,
        Err(e) => {
            warn!("ignoring unreadable cache: {:#}", e);
            None
        }
    };

    let extractor = Extractor::new(config);
    let current = extractor.discover(&config.data_dir)?;
    let reasons = stale_reasons(cached.as_ref(), &extractor.settings(), &current);
    for reason in &reasons {
        info!("cache is stale: {:?}", reason);
    }

    let extraction = match cached {
        Some(cached) if !force && reasons.is_empty() => {
            eprintln!("Saved pages unchanged, using cache");
            cached
        }
        _ => extract(config)?,
    };

    generate(config, &extraction)
}
