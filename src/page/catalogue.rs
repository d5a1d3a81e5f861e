use log::{debug, trace};
use scraper::{ElementRef, Html, Selector};
use std::{
    collections::{BTreeMap, HashSet},
    sync::LazyLock,
};

use super::{element_text, has_class, pattern, PageAdapter, RawSighting, SourceKind};

mod selectors {
    use super::*;

    fn parse(sel: &str) -> Selector {
        Selector::parse(sel).expect("static selector is valid")
    }

    pub static SET_NAME: LazyLock<Selector> =
        LazyLock::new(|| parse("#card-search-result-title-set-like-name"));

    pub static SET_CODE: LazyLock<Selector> =
        LazyLock::new(|| parse("#card-search-result-title-set-code"));

    pub static PAGE_TITLE: LazyLock<Selector> = LazyLock::new(|| parse("title"));

    pub static EXPANSION_CODE: LazyLock<Selector> =
        LazyLock::new(|| parse(".card-list-item-expansion-code"));

    pub static ENTRY_LINK: LazyLock<Selector> =
        LazyLock::new(|| parse("a.card-list-item-entry-text"));

    pub static CARD_ITEM: LazyLock<Selector> = LazyLock::new(|| parse("[data-card-id]"));

    pub static GRID_ITEM: LazyLock<Selector> = LazyLock::new(|| parse(".card-image-grid-item"));

    pub static INDICATOR: LazyLock<Selector> =
        LazyLock::new(|| parse("[class*=\"card-collection-card-indicator\"]"));
}

const STANDARD_SET: &str = "card-collection-card-indicator-standard-set";
const PARALLEL_SET: &str = "card-collection-card-indicator-parallel-set";
const WITH_DOT: &str = "card-collection-card-indicator-with-dot";
const ACTIVE: &str = "active";

/// Set list page of the catalogue site, saved in list view.
pub struct CataloguePage {
    document: Html,
    set_name: Option<String>,
    set_code: Option<String>,
    header_code: bool,
    grid_view: bool,
}

impl CataloguePage {
    pub fn parse(html: &str) -> CataloguePage {
        let document = Html::parse_document(html);

        let set_name = Self::fetch_set_name(&document);
        let header_code = Self::fetch_header_code(&document);
        let set_code = header_code
            .clone()
            .or_else(|| Self::fetch_common_code(&document));
        trace!("catalogue header: name={:?} code={:?}", set_name, set_code);

        let has_entries = document.select(&selectors::ENTRY_LINK).next().is_some();
        let has_cards = document.select(&selectors::CARD_ITEM).next().is_some()
            || document.select(&selectors::GRID_ITEM).next().is_some();
        let grid_view = !has_entries && has_cards;
        if grid_view {
            debug!("catalogue page has card tiles but no list entries");
        }

        CataloguePage {
            document,
            set_name,
            set_code,
            header_code: header_code.is_some(),
            grid_view,
        }
    }

    pub fn set_name(&self) -> Option<&str> {
        self.set_name.as_deref()
    }

    pub fn set_code(&self) -> Option<&str> {
        self.set_code.as_deref()
    }

    fn fetch_set_name(document: &Html) -> Option<String> {
        let explicit = document
            .select(&selectors::SET_NAME)
            .next()
            .map(element_text)
            .filter(|name| !name.is_empty());
        if explicit.is_some() {
            return explicit;
        }

        trace!("no set name span, trying <title>");
        document
            .select(&selectors::PAGE_TITLE)
            .next()
            .map(element_text)
            .and_then(|title| pattern::parse_list_page_title(&title).map(str::to_owned))
    }

    fn fetch_header_code(document: &Html) -> Option<String> {
        document
            .select(&selectors::SET_CODE)
            .next()
            .map(element_text)
            .filter(|code| !code.is_empty())
    }

    fn fetch_common_code(document: &Html) -> Option<String> {
        trace!("no set code span, using most common expansion code");
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for code in document.select(&selectors::EXPANSION_CODE).map(element_text) {
            if !code.is_empty() {
                *counts.entry(code).or_default() += 1;
            }
        }

        // BTreeMap iteration keeps ties deterministic: first code alphabetically.
        counts
            .into_iter()
            .fold(None, |best: Option<(String, usize)>, (code, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((code, count)),
            })
            .map(|(code, _)| code)
    }

    fn card_container(link: ElementRef) -> Option<ElementRef> {
        link.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().attr("data-card-id").is_some())
    }

    /// The header code when the page has one, else the code printed next to
    /// the card, else the most common code on the page.
    fn card_set_code(&self, container: Option<ElementRef>) -> Option<String> {
        if self.header_code {
            return self.set_code.clone();
        }

        container
            .and_then(|c| c.select(&selectors::EXPANSION_CODE).next())
            .map(element_text)
            .filter(|code| !code.is_empty())
            .or_else(|| self.set_code.clone())
    }

    fn card_sightings(&self, link: ElementRef, container: Option<ElementRef>) -> Vec<RawSighting> {
        let title = link.value().attr("title").unwrap_or_default();
        let parsed = pattern::parse_catalogue_title(title);
        if parsed.is_none() {
            trace!("entry title `{}` does not carry a card number", title);
        }

        let mut name_text = element_text(link);
        if name_text.is_empty() {
            name_text = parsed
                .as_ref()
                .map(|t| t.name.to_string())
                .unwrap_or_default();
        }

        let base = RawSighting {
            name_text,
            number_text: parsed.as_ref().map(|t| t.number.to_string()),
            set_hint: self.card_set_code(container),
            set_name_hint: self
                .set_name
                .clone()
                .or_else(|| parsed.as_ref().map(|t| t.set_name.to_string())),
            total_hint: parsed.as_ref().and_then(|t| t.total.map(str::to_owned)),
            variant_hint: None,
            owned_hint: false,
            card_id: container
                .and_then(|c| c.value().attr("data-card-id"))
                .map(str::to_owned),
        };

        let variants = container.map(Self::indicator_variants).unwrap_or_default();
        if variants.is_empty() {
            return vec![RawSighting {
                variant_hint: Some(String::from("Normal")),
                ..base
            }];
        }

        variants
            .into_iter()
            .map(|(label, owned)| RawSighting {
                variant_hint: Some(label.to_string()),
                owned_hint: owned,
                ..base.clone()
            })
            .collect()
    }

    /// Variants present for one card and whether each one is collected.
    fn indicator_variants(container: ElementRef) -> Vec<(&'static str, bool)> {
        let indicators: Vec<ElementRef> = container.select(&selectors::INDICATOR).collect();
        let mut variants = Vec::new();

        if let Some(span) = indicators.iter().find(|s| has_class(**s, STANDARD_SET)) {
            let active = has_class(*span, ACTIVE);
            if active || has_class(*span, WITH_DOT) {
                variants.push(("Normal", active));
            }
        }

        if let Some(span) = indicators.iter().find(|s| has_class(**s, PARALLEL_SET)) {
            variants.push(("Reverse Holo", has_class(*span, ACTIVE)));
        }

        variants
    }
}

impl PageAdapter for CataloguePage {
    fn kind(&self) -> SourceKind {
        SourceKind::Catalogue
    }

    fn sightings(&self) -> Box<dyn Iterator<Item = RawSighting> + '_> {
        if self.grid_view {
            return Box::new(std::iter::empty());
        }

        let mut seen = HashSet::new();
        Box::new(
            self.document
                .select(&selectors::ENTRY_LINK)
                .map(|link| (link, Self::card_container(link)))
                .filter(move |(_, container)| {
                    match container.and_then(|c| c.value().attr("data-card-id")) {
                        Some(id) => seen.insert(id.to_string()),
                        None => true,
                    }
                })
                .flat_map(move |(link, container)| self.card_sightings(link, container)),
        )
    }

    fn wrong_view(&self) -> bool {
        self.grid_view
    }
}
