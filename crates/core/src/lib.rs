pub mod classification;
pub mod config;
pub mod money;
pub mod transaction;

pub use classification::{Classification, MatchType, Resolution, Status};
pub use config::{ConfigError, ReconConfig};
pub use money::{currency_symbol, Money};
pub use transaction::{Polarity, RawRecord, Source, Transaction};
