use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Which feed a transaction came from. The order here is also the
/// tie-break order when a group's representative date is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Bank,
    Ledger,
    Gateway,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Bank, Source::Ledger, Source::Gateway];
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Bank => write!(f, "bank"),
            Source::Ledger => write!(f, "ledger"),
            Source::Gateway => write!(f, "gateway"),
        }
    }
}

/// Sign orientation of a whole feed. Decided once per feed from the mean
/// signed amount, never per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Credit,
    Debit,
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Credit => write!(f, "credit"),
            Polarity::Debit => write!(f, "debit"),
        }
    }
}

/// One row of an input feed after column-alias resolution, before any
/// parsing. Unknown columns have already been dropped at the ingestion
/// boundary; every field is the raw cell text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub date: Option<String>,
    pub amount: Option<String>,
    pub reference: Option<String>,
    pub currency: Option<String>,
}

/// The canonical transaction the engine matches on. Built once from a
/// [`RawRecord`]; only `match_key`/`fuzzy_key` change afterwards, during
/// key building and fuzzy augmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub source: Source,
    /// `None` when the feed value could not be parsed; the row still
    /// participates in matching.
    pub date: Option<NaiveDate>,
    /// Absolute amount in the original currency.
    pub amount: Decimal,
    pub currency: String,
    /// Amount converted to the base currency via the fixed-rate table.
    pub amount_base: Money,
    /// `round(amount_base * 100)`, the exact-comparison form.
    pub amount_minor: i64,
    pub polarity: Polarity,
    pub reference: String,
    /// Lower-cased reference with all non-alphanumerics stripped.
    pub ref_norm: String,
    pub match_key: String,
    /// True when `match_key` was replaced by a synthetic fuzzy-cluster key.
    pub fuzzy_key: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_display() {
        assert_eq!(Source::Bank.to_string(), "bank");
        assert_eq!(Source::Gateway.to_string(), "gateway");
    }

    #[test]
    fn source_order_is_bank_ledger_gateway() {
        assert!(Source::Bank < Source::Ledger);
        assert!(Source::Ledger < Source::Gateway);
        assert_eq!(Source::ALL[0], Source::Bank);
    }
}
