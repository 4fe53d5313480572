//! Job listing analysis.
//!
//! Vocabulary tables, region classification and the aggregation
//! pipeline that turns fetched postings into skill demand figures.

pub mod aggregator;
pub mod regions;
pub mod vocabulary;

pub use aggregator::*;
pub use regions::{RegionClassifier, RegionPattern, UnclassifiedPolicy};
pub use vocabulary::Vocabulary;
