//! pdfsort-classify
//!
//! Per-document language detection and the corpus-level topic model.

pub mod language;
pub mod topic;

pub use language::WhatlangDetector;
pub use topic::{TopicAssignment, TopicModel, TopicSummary};
