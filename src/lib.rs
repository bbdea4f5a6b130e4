// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod cli;
pub mod config;
pub mod deal;
pub mod extract;
pub mod grading;
pub mod ingest;
pub mod lexicon;
pub mod pipeline;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::deal::{
    BroadcasterDeals, BroadcasterGrade, DealCandidate, DealCategory, DealRecord, Grade,
    UpsertStats,
};
pub use crate::extract::DealExtractor;
pub use crate::lexicon::Lexicon;
pub use crate::pipeline::RunReport;
pub use crate::store::DealStore;
