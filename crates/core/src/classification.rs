use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Matched,
    PartiallyMatched,
    Unmatched,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Matched => write!(f, "Matched"),
            Status::PartiallyMatched => write!(f, "Partially Matched"),
            Status::Unmatched => write!(f, "Unmatched"),
        }
    }
}

/// Operational outcome attached to a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Cleared,
    ClearedWithDifference,
    ExceptionTiming,
    ExceptionUnknown,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Cleared => write!(f, "cleared"),
            Resolution::ClearedWithDifference => write!(f, "cleared_with_difference"),
            Resolution::ExceptionTiming => write!(f, "exception_timing"),
            Resolution::ExceptionUnknown => write!(f, "exception_unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    ExactReference,
    FuzzyReference,
    ReferenceMatchWithVariance,
    GatewayFee,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchType::ExactReference => write!(f, "exact_reference"),
            MatchType::FuzzyReference => write!(f, "fuzzy_reference"),
            MatchType::ReferenceMatchWithVariance => write!(f, "reference_match_with_variance"),
            MatchType::GatewayFee => write!(f, "gateway_fee"),
        }
    }
}

/// The verdict for one group, shared by every transaction in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub status: Status,
    pub match_type: Option<MatchType>,
    pub resolution: Resolution,
    pub variance: Option<Money>,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_is_human_readable() {
        assert_eq!(Status::PartiallyMatched.to_string(), "Partially Matched");
    }

    #[test]
    fn resolution_display_is_snake_case() {
        assert_eq!(
            Resolution::ClearedWithDifference.to_string(),
            "cleared_with_difference"
        );
        assert_eq!(Resolution::ExceptionTiming.to_string(), "exception_timing");
    }

    #[test]
    fn match_type_display() {
        assert_eq!(MatchType::GatewayFee.to_string(), "gateway_fee");
        assert_eq!(
            MatchType::ReferenceMatchWithVariance.to_string(),
            "reference_match_with_variance"
        );
    }
}
