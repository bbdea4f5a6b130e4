// src/store/mod.rs
//! Storage seam. The pipeline only ever talks to [`DealStore`] and
//! [`snapshot::SnapshotSink`]; the JSON-file-backed [`memory::MemoryStore`]
//! is the reference implementation.

pub mod memory;
pub mod snapshot;

use anyhow::Result;

use crate::deal::{BroadcasterDeals, BroadcasterGrade, DealRecord, UpsertStats};

#[async_trait::async_trait]
pub trait DealStore: Send + Sync {
    /// Upsert a batch keyed on (article_id, broadcaster, show, category).
    /// An existing key gets its mutable fields and `updated_at` refreshed
    /// while `created_at` is preserved. Record-level failures are tallied in
    /// the stats, never raised; only store-level trouble returns `Err`.
    async fn bulk_upsert_deals(&self, records: Vec<DealRecord>) -> Result<UpsertStats>;

    /// Every record carrying both a broadcaster name and a publication date,
    /// grouped by exact name. Inside each group the deals are sorted
    /// publication-date descending, `last_activity_date` is the newest date
    /// and `deal_count` is the group size. Dateless records stay stored but
    /// never appear in a group.
    async fn group_deals_by_broadcaster(&self) -> Result<Vec<BroadcasterDeals>>;

    /// Replace the stored grade for this broadcaster, inserting if absent.
    async fn upsert_grade(&self, grade: &BroadcasterGrade) -> Result<()>;
}
