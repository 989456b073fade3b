//! # paper-reconcile
//!
//! Multi-source bibliographic record reconciliation engine.
//!
//! Citation databases (CrossRef, Semantic Scholar, OpenCitations, Google
//! Scholar, ...) describe the same paper with inconsistent, partial and
//! differently formatted metadata. This crate decides which records refer to
//! the same work and merges them into one canonical record, keeping
//! irreconcilable readings side by side for human review.
//!
//! ## Modules
//!
//! - [`normalize`] - Free-text canonicalization
//! - [`distance`] - Levenshtein distance and spelling tie-breaks
//! - [`similarity`] - Weighted field similarity scores
//! - [`author`] - Author identity resolution and merge
//! - [`equality`] - Record equality decision
//! - [`merge`] - Record and response merge
//! - [`reconcile`] - Batch reconciliation
//! - [`model`] - Paper, author and source response types
//! - [`response`] - Lenient decoding of fetched responses
//! - [`config`] - Comparison weight vector
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use paper_reconcile::{reconcile_responses, ComparisonWeights, Paper, SourceResponse};
//!
//! # fn main() -> paper_reconcile::Result<()> {
//! let responses = vec![
//!     SourceResponse::new(Paper::titled("I am a Great Paper")),
//!     SourceResponse::new(Paper::titled("I am a Great-Paper")),
//! ];
//! let merged = reconcile_responses(responses, &ComparisonWeights::default())?;
//! assert_eq!(merged.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod author;
pub mod config;
pub mod distance;
pub mod equality;
pub mod error;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod response;
pub mod similarity;

pub use config::{ComparisonWeights, WeightsStore};
pub use distance::{distance, pick_less_normalized};
pub use equality::{compare, records_equal, Comparison, Verdict};
pub use error::{ReconcileError, Result};
pub use merge::{merge_records, merge_responses};
pub use model::{Author, IdType, Paper, SourceResponse, UniqueId};
pub use normalize::normalize;
pub use reconcile::{by_title, dedupe_child_list, reconcile, reconcile_responses};
