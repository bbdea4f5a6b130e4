// src/pipeline.rs
//! One full radar run: fetch sources, extract deals, upsert records, grade
//! broadcasters, publish the snapshot. Each stage degrades per item where it
//! can; only store-level failures abort the run.

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::config::GradingConfig;
use crate::deal::{DealCandidate, DealRecord, UpsertStats};
use crate::extract::{dates, DealExtractor};
use crate::grading;
use crate::ingest::{
    self,
    types::{Document, DocumentSource},
};
use crate::store::{snapshot::SnapshotSink, DealStore};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "radar_deals_extracted_total",
            "Deal candidates produced by extraction."
        );
        describe_counter!("radar_deals_inserted_total", "Deal records newly inserted.");
        describe_counter!("radar_deals_updated_total", "Deal records updated in place.");
        describe_counter!("radar_deals_failed_total", "Deal records rejected by the store.");
        describe_counter!(
            "radar_broadcasters_graded_total",
            "Broadcasters graded and persisted."
        );
        describe_counter!(
            "radar_broadcasters_skipped_total",
            "Broadcaster groups skipped for missing activity dates."
        );
        describe_counter!(
            "radar_grading_failures_total",
            "Broadcaster grades that failed to persist."
        );
        describe_gauge!(
            "radar_last_run_ts",
            "Unix ts when the pipeline last completed."
        );
    });
}

/// What one run did. The CLI prints the summary and logs the counts; tests
/// assert on them.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub documents: usize,
    pub candidates: usize,
    pub upserts: UpsertStats,
    pub graded: usize,
    pub summary: String,
}

fn to_record(
    doc: &Document,
    publication_date: Option<DateTime<Utc>>,
    candidate: DealCandidate,
) -> DealRecord {
    // The store overwrites both timestamps on insert and `updated_at` on
    // update; these are placeholders for the wire shape.
    let now = Utc::now();
    DealRecord {
        article_id: doc.id.clone(),
        article_url: doc.url.clone(),
        source: doc.source.clone(),
        broadcaster_name: candidate.broadcaster,
        show_title: candidate.show,
        deal_category: candidate.deal_category,
        deal_date: candidate.deal_date,
        genres: candidate.genres,
        regions: candidate.regions,
        publication_date,
        created_at: now,
        updated_at: now,
    }
}

pub async fn run(
    sources: &[Box<dyn DocumentSource>],
    extractor: &DealExtractor,
    grading_cfg: &GradingConfig,
    store: &dyn DealStore,
    sink: &dyn SnapshotSink,
    limit_per_source: Option<usize>,
) -> Result<RunReport> {
    ensure_metrics_described();

    let documents = ingest::fetch_all(sources, limit_per_source).await;
    info!(documents = documents.len(), "fetch stage done");

    let mut records: Vec<DealRecord> = Vec::new();
    for doc in &documents {
        let candidates = extractor.extract(&doc.body_text, doc.published_at.as_deref());
        if candidates.is_empty() {
            continue;
        }
        debug!(url = %doc.url, candidates = candidates.len(), "extracted deal candidates");
        let publication_date = doc
            .published_at
            .as_deref()
            .and_then(dates::parse_publish_date);
        records.extend(
            candidates
                .into_iter()
                .map(|c| to_record(doc, publication_date, c)),
        );
    }
    let candidates = records.len();
    counter!("radar_deals_extracted_total").increment(candidates as u64);

    let upserts = store.bulk_upsert_deals(records).await?;
    counter!("radar_deals_inserted_total").increment(upserts.inserted as u64);
    counter!("radar_deals_updated_total").increment(upserts.updated as u64);
    counter!("radar_deals_failed_total").increment(upserts.failed as u64);
    info!(
        inserted = upserts.inserted,
        updated = upserts.updated,
        failed = upserts.failed,
        "store stage done"
    );

    // Grading reads the whole store, not just this batch, so history keeps
    // counting even when today's fetch came up empty.
    let grades = grading::grade_all(grading_cfg, store, Utc::now()).await?;
    sink.publish(&grades).await?;
    let summary = grading::render_summary(&grades);

    gauge!("radar_last_run_ts").set(Utc::now().timestamp().max(0) as f64);

    Ok(RunReport {
        documents: documents.len(),
        candidates,
        upserts,
        graded: grades.len(),
        summary,
    })
}
