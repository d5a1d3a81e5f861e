//! Textual conventions the source sites use to identify cards.
//!
//! These are plain string functions so they can be tested without any markup.

use regex::Regex;
use std::sync::LazyLock;

static IDENTITY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*(.*?)\s*\(([A-Za-z][A-Za-z0-9-]*)\s+(\d+)\)\s*$")
        .expect("identity suffix regex is valid")
});

static CATALOGUE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*(.*?)\s*\(([^()]*?)\s+([A-Za-z]*\d+)(?:/([A-Za-z]*\d+))?\)\s*$")
        .expect("catalogue title regex is valid")
});

static LIST_PAGE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(.+?)\s+card list\b").expect("list page title regex is valid")
});

/// `"<CardName> (<SETCODE> <NUMBER>)"` as printed by the marketplace.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct IdentitySuffix<'a> {
    pub name: &'a str,
    pub set_code: &'a str,
    pub number: &'a str,
}

pub fn parse_identity_suffix(text: &str) -> Option<IdentitySuffix<'_>> {
    let caps = IDENTITY_SUFFIX.captures(text)?;
    let name = caps.get(1)?.as_str().trim();
    if name.is_empty() {
        return None;
    }

    Some(IdentitySuffix {
        name,
        set_code: caps.get(2)?.as_str(),
        number: caps.get(3)?.as_str(),
    })
}

/// `"Bulbasaur (Scarlet & Violet 151 001/165)"` as used in catalogue link titles.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CatalogueTitle<'a> {
    pub name: &'a str,
    pub set_name: &'a str,
    pub number: &'a str,
    pub total: Option<&'a str>,
}

pub fn parse_catalogue_title(text: &str) -> Option<CatalogueTitle<'_>> {
    let caps = CATALOGUE_TITLE.captures(text)?;

    Some(CatalogueTitle {
        name: caps.get(1)?.as_str().trim(),
        set_name: caps.get(2)?.as_str().trim(),
        number: caps.get(3)?.as_str(),
        total: caps.get(4).map(|m| m.as_str()),
    })
}

/// Set name from a document title such as
/// `"Twilight Masquerade card list (International TCG) – TCG Collector"`.
pub fn parse_list_page_title(text: &str) -> Option<&str> {
    LIST_PAGE_TITLE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_suffix_basic() {
        let parsed = parse_identity_suffix("Dreepy (TWM 128)").unwrap();
        assert_eq!(
            parsed,
            IdentitySuffix {
                name: "Dreepy",
                set_code: "TWM",
                number: "128"
            }
        );
    }

    #[test]
    fn identity_suffix_keeps_inner_parentheses_in_name() {
        let parsed = parse_identity_suffix("Pikachu (Illustration) (SVP 27)").unwrap();
        assert_eq!(parsed.name, "Pikachu (Illustration)");
        assert_eq!(parsed.set_code, "SVP");
        assert_eq!(parsed.number, "27");
    }

    #[test]
    fn identity_suffix_keeps_leading_zeros() {
        let parsed = parse_identity_suffix("Ralts (SVI 060)").unwrap();
        assert_eq!(parsed.number, "060");
    }

    #[test]
    fn identity_suffix_rejects_missing_number() {
        assert!(parse_identity_suffix("Booster Box (TWM)").is_none());
        assert!(parse_identity_suffix("Playmat").is_none());
    }

    #[test]
    fn identity_suffix_rejects_empty_name() {
        assert!(parse_identity_suffix("(TWM 12)").is_none());
    }

    #[test]
    fn catalogue_title_with_total() {
        let parsed = parse_catalogue_title("Bulbasaur (Scarlet & Violet 151 001/165)").unwrap();
        assert_eq!(parsed.name, "Bulbasaur");
        assert_eq!(parsed.set_name, "Scarlet & Violet 151");
        assert_eq!(parsed.number, "001");
        assert_eq!(parsed.total, Some("165"));
    }

    #[test]
    fn catalogue_title_without_total() {
        let parsed =
            parse_catalogue_title("Basic Grass Energy (Scarlet & Violet Energies 001)").unwrap();
        assert_eq!(parsed.set_name, "Scarlet & Violet Energies");
        assert_eq!(parsed.number, "001");
        assert_eq!(parsed.total, None);
    }

    #[test]
    fn list_page_title() {
        assert_eq!(
            parse_list_page_title(
                "Twilight Masquerade card list (International TCG) – TCG Collector"
            ),
            Some("Twilight Masquerade")
        );
        assert_eq!(parse_list_page_title("Orders – Cardmarket"), None);
    }
}
