//! Profile scoring: pooled encoder embedding fed to the boosted-tree model.
//!
//! [`ProfileScorer`] owns both models and is shared read-only across requests.
//! Construction checks that the booster expects exactly as many features as the
//! encoder's hidden size, so a width mismatch fails at startup rather than per request.

pub mod error;
pub mod scorer;


pub use error::ScoringError;
pub use scorer::ProfileScorer;
