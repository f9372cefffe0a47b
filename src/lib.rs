//! RfmSeg: a Rust CLI application for customer segmentation using quartile-based
//! RFM (Recency, Frequency, Monetary) scoring.
//!
//! This library buckets each customer into 1-4 scores along the three RFM
//! dimensions against dataset-wide quartile cut points, and maps the resulting
//! three-digit class code to a named customer segment.

pub mod cli;
pub mod data;
pub mod model;
pub mod segment;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{load_table, write_diagnostic, write_segments, CustomerRecord, RfmTable};
pub use model::{score_customers, CutPoints, QuartileTable, ScoredRecord};
pub use segment::{ClassCode, Segment};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;

/// Input rejected before scoring: an empty customer table, a missing required
/// column, or non-numeric metric values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid input: {0}")]
pub struct InvalidInputError(pub String);
