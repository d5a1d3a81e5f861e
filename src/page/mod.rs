use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::fmt;

mod catalogue;
pub mod pattern;
mod purchase;

pub use self::catalogue::CataloguePage;
pub use self::purchase::PurchasePage;

#[cfg(test)]
pub(crate) use self::catalogue::tests::LIST_VIEW as CATALOGUE_FIXTURE;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Catalogue,
    Purchase,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Catalogue => write!(f, "catalogue"),
            SourceKind::Purchase => write!(f, "purchase"),
        }
    }
}

/// One card sighting exactly as found in a page, before any validation.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct RawSighting {
    pub name_text: String,
    pub number_text: Option<String>,
    pub set_hint: Option<String>,
    pub set_name_hint: Option<String>,
    pub total_hint: Option<String>,
    pub variant_hint: Option<String>,
    pub owned_hint: bool,
    pub card_id: Option<String>,
}

/// A saved page parsed into a document tree.
///
/// Each source site gets its own adapter so markup changes stay local to one
/// file. `sightings` is lazy and can be called any number of times.
pub trait PageAdapter {
    fn kind(&self) -> SourceKind;

    fn sightings(&self) -> Box<dyn Iterator<Item = RawSighting> + '_>;

    /// Page was saved with a layout the adapter cannot read.
    fn wrong_view(&self) -> bool {
        false
    }
}

pub fn parse_page(kind: SourceKind, html: &str, variant_markers: &[String]) -> Box<dyn PageAdapter> {
    match kind {
        SourceKind::Catalogue => Box::new(CataloguePage::parse(html)),
        SourceKind::Purchase => Box::new(PurchasePage::parse(html, variant_markers)),
    }
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_class(element: ElementRef, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}
