use anyhow::{bail, ensure, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

mod variant;

pub use self::variant::{KnownVariant, Variant};

/// Short expansion code such as `TWM`, always read from the page itself.
#[derive(Debug, PartialEq, Eq, Clone, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SetCode(String);

impl SetCode {
    pub fn parse(value: &str) -> Result<SetCode> {
        let code = value.trim().to_uppercase();
        ensure!(!code.is_empty(), "set code is empty");
        ensure!(
            code.starts_with(|c: char| c.is_ascii_alphabetic()),
            "set code `{}` must start with a letter",
            code
        );
        if let Some(bad) = code
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-')
        {
            bail!("set code `{}` contains unexpected `{}`", code, bad);
        }
        Ok(SetCode(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SetCode {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SetCode> for String {
    fn from(value: SetCode) -> Self {
        value.0
    }
}

impl fmt::Display for SetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Card number exactly as printed by the source (`"049"`, `"133"`).
#[derive(Debug, PartialEq, Eq, Clone, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardNumber(String);

impl CardNumber {
    pub fn parse(value: &str) -> Result<CardNumber> {
        let raw = value.trim();
        ensure!(!raw.is_empty(), "card number is empty");
        ensure!(
            raw.chars().all(|c| c.is_ascii_alphanumeric()),
            "card number `{}` is not alphanumeric",
            raw
        );
        Ok(CardNumber(raw.to_string()))
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    fn is_numeric(&self) -> bool {
        self.0.chars().all(|c| c.is_ascii_digit())
    }

    /// Numeric value, `None` for numbers such as `TG05`.
    pub fn value(&self) -> Option<u32> {
        if !self.is_numeric() {
            return None;
        }
        self.0.parse().ok()
    }

    /// Zero-stripped form used by the marketplace and by identity keys.
    pub fn export_form(&self) -> String {
        if !self.is_numeric() {
            return self.0.clone();
        }

        let stripped = self.0.trim_start_matches('0');
        if stripped.is_empty() {
            String::from("0")
        } else {
            stripped.to_string()
        }
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Owned,
    PendingDelivery,
    Needed,
}

impl Status {
    /// Higher wins when several signals describe the same card.
    pub fn strength(self) -> u8 {
        match self {
            Status::Owned => 2,
            Status::PendingDelivery => 1,
            Status::Needed => 0,
        }
    }

    pub fn strongest(self, other: Status) -> Status {
        if other.strength() > self.strength() {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Owned => write!(f, "owned"),
            Status::PendingDelivery => write!(f, "pending_delivery"),
            Status::Needed => write!(f, "needed"),
        }
    }
}

/// Exact `(set, number, variant)` identity. Two printings of the same card
/// never share a key.
#[derive(Debug, PartialEq, Eq, Clone, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey {
    pub set_code: SetCode,
    pub number: String,
    pub variant: Variant,
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.set_code, self.number, self.variant)
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct CardRecord {
    pub set_code: SetCode,
    pub set_name: Option<String>,
    pub number: CardNumber,
    pub name: String,
    pub variant: Variant,
    pub total_count: Option<u32>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    #[serde(default)]
    pub purchase_count: u32,
}

impl CardRecord {
    pub fn key(&self) -> IdentityKey {
        IdentityKey {
            set_code: self.set_code.clone(),
            number: self.number.export_form(),
            variant: self.variant.clone(),
        }
    }

    pub fn is_owned(&self) -> bool {
        self.status == Status::Owned
    }

    /// Owned and bought again on the marketplace.
    pub fn is_duplicate_purchase(&self) -> bool {
        self.is_owned() && self.purchase_count > 0
    }

    /// Sort key for listings: numeric number first, then variant rank.
    pub fn listing_order(&self) -> (u32, String, u8, String) {
        (
            self.number.value().unwrap_or(u32::MAX),
            self.number.raw().to_string(),
            self.variant.display_rank(),
            self.variant.to_string(),
        )
    }
}

impl fmt::Display for CardRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({}) [{}]",
            self.set_code, self.number, self.name, self.variant, self.status
        )
    }
}
