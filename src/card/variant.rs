use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Variant labels this tool knows how to rank.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum KnownVariant {
    Normal,
    ReverseHolo,
    Holo,
}

impl KnownVariant {
    pub fn label(self) -> &'static str {
        match self {
            KnownVariant::Normal => "Normal",
            KnownVariant::ReverseHolo => "Reverse Holo",
            KnownVariant::Holo => "Holo",
        }
    }

    pub fn from_label(value: &str) -> Option<KnownVariant> {
        match value.to_lowercase().as_str() {
            "normal" | "standard" => Some(Self::Normal),
            "reverse holo" | "reverse" | "reverse holofoil" => Some(Self::ReverseHolo),
            "holo" | "holofoil" => Some(Self::Holo),
            _ => None,
        }
    }
}

/// Card variant as observed in source pages.
///
/// The set of labels is open: sites add new printings over time, so anything
/// that is not a [`KnownVariant`] is kept verbatim in the unknown bucket
/// instead of being rejected.
#[derive(Debug, PartialEq, Eq, Clone, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Variant(String);

impl Variant {
    pub fn parse(value: &str) -> Result<Variant> {
        let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            bail!("variant label is empty");
        }

        match KnownVariant::from_label(&collapsed) {
            Some(known) => Ok(Self::from(known)),
            None => Ok(Variant(collapsed)),
        }
    }

    pub fn normal() -> Variant {
        Self::from(KnownVariant::Normal)
    }

    pub fn reverse_holo() -> Variant {
        Self::from(KnownVariant::ReverseHolo)
    }

    pub fn holo() -> Variant {
        Self::from(KnownVariant::Holo)
    }

    pub fn known(&self) -> Option<KnownVariant> {
        KnownVariant::from_label(&self.0)
    }

    pub fn is_unknown(&self) -> bool {
        self.known().is_none()
    }

    pub fn is(&self, known: KnownVariant) -> bool {
        self.known() == Some(known)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Position used when listing variants of the same card.
    pub fn display_rank(&self) -> u8 {
        match self.known() {
            Some(KnownVariant::Normal) => 0,
            Some(KnownVariant::ReverseHolo) => 1,
            Some(KnownVariant::Holo) => 2,
            None => 99,
        }
    }
}

impl From<KnownVariant> for Variant {
    fn from(value: KnownVariant) -> Self {
        Variant(value.label().to_string())
    }
}

impl TryFrom<String> for Variant {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Variant> for String {
    fn from(value: Variant) -> Self {
        value.0
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reverse_holo_canonicalizes_spelling() {
        assert_eq!(
            Variant::parse("  reverse   HOLO ").unwrap(),
            Variant::reverse_holo()
        );
    }

    #[test]
    fn parse_normal_returns_known() {
        let variant = Variant::parse("Normal").unwrap();
        assert_eq!(variant.known(), Some(KnownVariant::Normal));
    }

    #[test]
    fn parse_unknown_label_is_kept() {
        let variant = Variant::parse("Cosmos Holo").unwrap();
        assert!(variant.is_unknown());
        assert_eq!(variant.as_str(), "Cosmos Holo");
    }

    #[test]
    fn parse_empty_returns_err() {
        assert!(Variant::parse("   ").is_err());
    }

    #[test]
    fn holo_is_not_reverse_holo() {
        assert!(Variant::holo().is(KnownVariant::Holo));
        assert!(!Variant::holo().is(KnownVariant::ReverseHolo));
    }

    #[test]
    fn serde_uses_plain_label() {
        let json = serde_json::to_string(&Variant::reverse_holo()).unwrap();
        assert_eq!(json, "\"Reverse Holo\"");

        let back: Variant = serde_json::from_str("\"reverse holo\"").unwrap();
        assert_eq!(back, Variant::reverse_holo());
    }
}
