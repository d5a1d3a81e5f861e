use anyhow::{bail, Context, Result};
use log::{debug, info, trace};
use serde::Serialize;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    card::SetCode,
    extractor::{Extraction, ExtractionSettings, SourceFile},
};

const COLLECTION_FILE: &str = "collection.json";
const INDEX_FILE: &str = "index.html";

pub struct DataStore {
    root_dir: PathBuf,
    cache_file: PathBuf,
}

pub enum StoreLocation<'a> {
    RootDir,
    CollectionFile,
    IndexFile,
    SetPage(&'a SetCode),
    WantList(&'a str),
}

/// Why a cached extraction no longer matches the saved pages.
#[derive(Debug, PartialEq, Eq)]
pub enum StaleReason {
    NoCache,
    SettingsChanged,
    Added(PathBuf),
    Removed(PathBuf),
    Modified(PathBuf),
}

/// File name of a set page, relative to the index page.
pub fn set_page_filename(set_code: &SetCode) -> String {
    format!("set_{}.html", set_code.as_str().to_lowercase())
}

impl DataStore {
    pub fn new(root_dir: &Path, cache_file: &Path) -> Self {
        Self {
            root_dir: root_dir.to_path_buf(),
            cache_file: cache_file.to_path_buf(),
        }
    }

    pub fn get_path(&self, location: StoreLocation) -> PathBuf {
        match location {
            StoreLocation::RootDir => self.root_dir.clone(),
            StoreLocation::CollectionFile => self.root_dir.join(COLLECTION_FILE),
            StoreLocation::IndexFile => self.root_dir.join(INDEX_FILE),
            StoreLocation::SetPage(set_code) => self.root_dir.join(set_page_filename(set_code)),
            StoreLocation::WantList(format) => self.root_dir.join(format!("want_list_{format}.txt")),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_file
    }

    fn ensure_created(&self, location: StoreLocation) -> Result<()> {
        let dir = self.get_path(location);
        if dir.exists() {
            trace!("dir already exists at `{}`", dir.display());
            return Ok(());
        }

        match fs::create_dir_all(&dir) {
            Ok(_) => info!("successfully created `{}`", dir.display()),
            Err(e) => bail!("failed to create `{}`: {}", dir.display(), e),
        }

        Ok(())
    }

    /// `Ok(None)` when no cache has been written yet.
    pub fn read_cache(&self) -> Result<Option<Extraction>> {
        if !self.cache_file.exists() {
            debug!("no cache at `{}`", self.cache_file.display());
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.cache_file)
            .with_context(|| format!("Failed to open file: {}", self.cache_file.display()))?;
        let extraction: Extraction = serde_json::from_str(&raw)
            .with_context(|| format!("corrupt cache: {}", self.cache_file.display()))?;

        debug!(
            "loaded cache with {} sources from `{}`",
            extraction.sources.len(),
            self.cache_file.display()
        );
        Ok(Some(extraction))
    }

    pub fn write_cache(&self, extraction: &Extraction) -> Result<()> {
        if let Some(parent) = self.cache_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(extraction)?;
        fs::write(&self.cache_file, json)?;
        debug!("wrote cache to `{}`", self.cache_file.display());
        Ok(())
    }

    pub fn write_json<T: Serialize>(&self, location: StoreLocation, data: &T) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(data)?;
        self.write_text(location, &json)
    }

    pub fn write_text(&self, location: StoreLocation, content: &str) -> Result<PathBuf> {
        self.ensure_created(StoreLocation::RootDir)?;

        let path = self.get_path(location);
        fs::write(&path, content)
            .with_context(|| format!("failed to write `{}`", path.display()))?;
        debug!("wrote {} bytes to `{}`", content.len(), path.display());
        Ok(path)
    }
}

/// Compares the settings and sources recorded in a cache with the current
/// settings and the pages on disk.
///
/// An empty result means the cache can be used as is.
pub fn stale_reasons(
    cached: Option<&Extraction>,
    settings: &ExtractionSettings,
    current: &[SourceFile],
) -> Vec<StaleReason> {
    let Some(cached) = cached else {
        return vec![StaleReason::NoCache];
    };

    let known: HashMap<&Path, &SourceFile> = cached
        .sources
        .iter()
        .map(|s| (s.path.as_path(), s))
        .collect();

    let mut reasons = Vec::new();
    if &cached.settings != settings {
        reasons.push(StaleReason::SettingsChanged);
    }

    for source in current {
        match known.get(source.path.as_path()) {
            None => reasons.push(StaleReason::Added(source.path.clone())),
            Some(old) if old.size != source.size || old.modified != source.modified => {
                reasons.push(StaleReason::Modified(source.path.clone()))
            }
            Some(_) => {}
        }
    }

    for old in &cached.sources {
        if !current.iter().any(|s| s.path == old.path) {
            reasons.push(StaleReason::Removed(old.path.clone()));
        }
    }

    reasons
}
