// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod report;
pub mod sources;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{rank, PipelineConfig, Ranking, RunStats};
pub use crate::ingest::types::{Article, FeedProvider, RawEntry};
pub use crate::sources::{SourceDescriptor, SourceRegistry};
