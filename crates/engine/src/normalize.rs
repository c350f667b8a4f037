use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use trimatch_core::{Money, Polarity, RawRecord, ReconConfig, Source, Transaction};

/// Day-first formats are tried before anything else; feeds in this domain
/// are overwhelmingly UK-style.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%y",
];

/// Strips zero-width spaces, line breaks, and tabs, then trims. Returns
/// `None` for cells that are empty once cleaned.
pub fn clean_cell(value: &str) -> Option<String> {
    let s: String = value
        .chars()
        .filter(|c| !matches!(c, '\u{200b}' | '\n' | '\r' | '\t'))
        .collect();
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

pub fn parse_date_dayfirst(value: &str) -> Option<NaiveDate> {
    let s = clean_cell(value)?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&s, fmt).ok())
}

/// Parses a signed decimal amount, stripping currency symbols, commas,
/// and spaces. Accounting-style parentheses mean negative.
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let s = clean_cell(value)?;
    let (negative, s) = if s.starts_with('(') && s.ends_with(')') && s.len() > 2 {
        (true, s[1..s.len() - 1].to_string())
    } else {
        (false, s)
    };
    let s: String = s
        .chars()
        .filter(|c| !matches!(c, '£' | '$' | '€' | ',' | ' '))
        .collect();
    let dec = Decimal::from_str(&s).ok()?;
    Some(if negative { -dec } else { dec })
}

/// Lower-cases and keeps only letters and digits; missing references
/// normalize to the empty string.
pub fn normalize_reference(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Turns one feed's raw rows into canonical transactions.
///
/// Sign orientation is inspected once for the whole feed: a negative mean
/// signed amount marks the feed debit-oriented. Amounts are then stored
/// absolute with the polarity tag. Rows with unparseable dates or amounts
/// proceed with `None`/zero and are counted as data-quality warnings.
pub fn normalize_feed(records: &[RawRecord], source: Source, cfg: &ReconConfig) -> Vec<Transaction> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut bad_dates = 0usize;
    let mut bad_amounts = 0usize;

    let signed: Vec<Decimal> = records
        .iter()
        .map(|r| {
            match r.amount.as_deref().and_then(parse_amount) {
                Some(a) => a,
                None => {
                    bad_amounts += 1;
                    Decimal::ZERO
                }
            }
        })
        .collect();

    let mean = signed.iter().copied().sum::<Decimal>() / Decimal::from(signed.len() as i64);
    let polarity = if mean < Decimal::ZERO {
        Polarity::Debit
    } else {
        Polarity::Credit
    };

    let txs: Vec<Transaction> = records
        .iter()
        .zip(signed)
        .map(|(record, amount_signed)| {
            let date = match record.date.as_deref() {
                Some(raw) => {
                    let parsed = parse_date_dayfirst(raw);
                    if parsed.is_none() && clean_cell(raw).is_some() {
                        bad_dates += 1;
                    }
                    parsed
                }
                None => None,
            };

            let amount = amount_signed.abs();
            let currency = record
                .currency
                .as_deref()
                .and_then(clean_cell)
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| cfg.base_currency.clone());
            let amount_base = Money::from_decimal(amount * cfg.rate_for(&currency));
            let reference = record
                .reference
                .as_deref()
                .and_then(clean_cell)
                .unwrap_or_default();
            let ref_norm = normalize_reference(&reference);

            Transaction {
                source,
                date,
                amount,
                currency,
                amount_base,
                amount_minor: amount_base.to_minor(),
                polarity,
                reference,
                ref_norm,
                match_key: String::new(),
                fuzzy_key: false,
            }
        })
        .collect();

    if bad_dates > 0 || bad_amounts > 0 {
        tracing::warn!(
            %source,
            rows = records.len(),
            bad_dates,
            bad_amounts,
            "feed rows degraded during normalization"
        );
    }
    tracing::debug!(%source, rows = txs.len(), %polarity, "feed normalized");

    txs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, amount: &str, reference: &str) -> RawRecord {
        RawRecord {
            date: Some(date.to_string()),
            amount: Some(amount.to_string()),
            reference: Some(reference.to_string()),
            currency: None,
        }
    }

    #[test]
    fn clean_cell_strips_invisible_characters() {
        assert_eq!(clean_cell(" INV\u{200b}1001\n ").as_deref(), Some("INV1001"));
        assert_eq!(clean_cell("  \t "), None);
    }

    #[test]
    fn date_parsing_prefers_day_first() {
        // 05/01/2024 is the 5th of January, not May 1st.
        let d = parse_date_dayfirst("05/01/2024").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(
            parse_date_dayfirst("2024-01-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
        assert!(parse_date_dayfirst("not a date").is_none());
    }

    #[test]
    fn amount_parsing_strips_symbols_and_commas() {
        assert_eq!(parse_amount("£1,234.56"), Decimal::from_str("1234.56").ok());
        assert_eq!(parse_amount("$99.99"), Decimal::from_str("99.99").ok());
        assert_eq!(parse_amount("(75.25)"), Decimal::from_str("-75.25").ok());
        assert_eq!(parse_amount("garbage"), None);
    }

    #[test]
    fn reference_normalization() {
        assert_eq!(normalize_reference("INV-1001 / A"), "inv1001a");
        assert_eq!(normalize_reference(""), "");
    }

    #[test]
    fn unparseable_rows_proceed_with_defaults() {
        let cfg = ReconConfig::default();
        let txs = normalize_feed(
            &[raw("junk", "junk", "REF")],
            Source::Bank,
            &cfg,
        );
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].date, None);
        assert_eq!(txs[0].amount, Decimal::ZERO);
        assert_eq!(txs[0].amount_minor, 0);
    }

    #[test]
    fn debit_feed_detected_from_mean_and_stored_absolute() {
        let cfg = ReconConfig::default();
        let txs = normalize_feed(
            &[
                raw("05/01/2024", "-100.00", "A"),
                raw("05/01/2024", "-50.00", "B"),
                raw("05/01/2024", "20.00", "C"),
            ],
            Source::Bank,
            &cfg,
        );
        assert!(txs.iter().all(|t| t.polarity == Polarity::Debit));
        assert!(txs.iter().all(|t| t.amount >= Decimal::ZERO));
        assert_eq!(txs[0].amount_minor, 10000);
    }

    #[test]
    fn currency_converted_to_base_minor_units() {
        let cfg = ReconConfig::default();
        let mut record = raw("05/01/2024", "100.00", "A");
        record.currency = Some("usd".to_string());
        let txs = normalize_feed(&[record], Source::Gateway, &cfg);
        // 100 USD * 0.79 = 79.00 GBP
        assert_eq!(txs[0].amount_minor, 7900);
        assert_eq!(txs[0].currency, "USD");
        assert_eq!(txs[0].amount_base.to_minor(), txs[0].amount_minor);
    }

    #[test]
    fn unknown_currency_treated_as_base() {
        let cfg = ReconConfig::default();
        let mut record = raw("05/01/2024", "10.00", "A");
        record.currency = Some("JPY".to_string());
        let txs = normalize_feed(&[record], Source::Ledger, &cfg);
        assert_eq!(txs[0].amount_minor, 1000);
    }
}
