#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod discovery;
pub mod error;
pub mod fingerprint;
pub mod traits;
pub mod types;

pub use config::SorterConfig;
pub use error::{Error, Result};
pub use types::{DocumentRecord, IndexEntry, Outcome, OutcomeKind};
