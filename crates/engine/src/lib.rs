//! `trimatch-engine`: three-feed transaction matching engine.
//!
//! Pure crate: receives pre-loaded raw records, returns classified rows.
//! Normalization, exact-key grouping, fuzzy-reference clustering, and
//! group classification; no I/O and no state between runs.

pub mod classify;
pub mod fuzzy;
pub mod key;
pub mod model;
pub mod normalize;
pub mod reconcile;

pub use fuzzy::{RefClusterer, RootAnchoredClusterer};
pub use model::{ReconOutput, ReconRow, ReconSummary};
pub use reconcile::{reconcile, reconcile_with};
