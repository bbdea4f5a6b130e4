//! deal.rs — Core domain types shared by extraction, storage, and grading:
//! deal candidates/records, the closed category taxonomy, and broadcaster
//! grades with their summary fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Closed deal taxonomy. `Other` is the fallback when no trigger phrase
/// matches; it never appears in `PRIORITY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DealCategory {
    Acquisition,
    Licensing,
    CoProduction,
    Commission,
    Development,
    Renewal,
    Other,
}

impl DealCategory {
    /// Fixed match order for category selection. All categories are tested,
    /// but a candidate stores only the first hit in this order.
    pub const PRIORITY: [DealCategory; 6] = [
        DealCategory::Acquisition,
        DealCategory::Licensing,
        DealCategory::CoProduction,
        DealCategory::Commission,
        DealCategory::Development,
        DealCategory::Renewal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DealCategory::Acquisition => "acquisition",
            DealCategory::Licensing => "licensing",
            DealCategory::CoProduction => "co-production",
            DealCategory::Commission => "commission",
            DealCategory::Development => "development",
            DealCategory::Renewal => "renewal",
            DealCategory::Other => "other",
        }
    }
}

/// Recency bucket for a broadcaster. Derived `Ord` gives A < B < C < D,
/// which is also the ranking order for the summary report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Base points fed into the score formula.
    pub fn base_score(&self) -> f64 {
        match self {
            Grade::A => 100.0,
            Grade::B => 80.0,
            Grade::C => 60.0,
            Grade::D => 20.0,
        }
    }
}

/// One extracted deal, before it is tied to an article. At least one of
/// {broadcaster, show, category != Other, genres, regions} is populated;
/// the extractor emits nothing for fully empty combinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealCandidate {
    pub broadcaster: Option<String>,
    pub show: Option<String>,
    pub deal_category: DealCategory,
    pub deal_date: Option<NaiveDate>,
    pub genres: BTreeSet<String>,
    pub regions: BTreeSet<String>,
}

/// Dedup identity of a persisted deal. Re-extracting the same article
/// updates in place instead of duplicating.
pub type DealKey = (String, Option<String>, Option<String>, DealCategory);

/// A candidate bound to its article, as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRecord {
    pub article_id: String,
    pub article_url: String,
    pub source: String,
    pub broadcaster_name: Option<String>,
    pub show_title: Option<String>,
    pub deal_category: DealCategory,
    pub deal_date: Option<NaiveDate>,
    pub genres: BTreeSet<String>,
    pub regions: BTreeSet<String>,
    /// Parsed publish instant; `None` when the raw date string was
    /// malformed. Such records are excluded from broadcaster grouping.
    pub publication_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DealRecord {
    pub fn key(&self) -> DealKey {
        (
            self.article_id.clone(),
            self.broadcaster_name.clone(),
            self.show_title.clone(),
            self.deal_category,
        )
    }
}

/// Per-record outcome counts of a bulk upsert. A failed record never aborts
/// the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertStats {
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
}

impl UpsertStats {
    pub fn merge(&mut self, other: UpsertStats) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.failed += other.failed;
    }
}

/// One broadcaster's deals as grouped by the store: date-descending, with
/// count and most-recent date precomputed so grading never re-sorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcasterDeals {
    pub broadcaster_name: String,
    pub last_activity_date: Option<DateTime<Utc>>,
    pub deal_count: usize,
    pub deals: Vec<DealRecord>,
}

/// Compact evidence line carried inside a grade (top of the date-descending
/// deal list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentDeal {
    pub show_title: Option<String>,
    pub deal_type: DealCategory,
    pub date: Option<DateTime<Utc>>,
    pub source: String,
    pub article_url: String,
}

/// The persisted grading result, one per broadcaster, fully recomputed and
/// replaced on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcasterGrade {
    pub broadcaster_name: String,
    pub grade: Grade,
    pub score: f64,
    pub last_activity_date: DateTime<Utc>,
    pub deal_count: usize,
    pub recent_deals: Vec<RecentDeal>,
    pub deal_types: Vec<DealCategory>,
    pub shows: Vec<String>,
    pub genres: Vec<String>,
    pub regions: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serde_uses_kebab_case() {
        let j = serde_json::to_string(&DealCategory::CoProduction).unwrap();
        assert_eq!(j, "\"co-production\"");
        let back: DealCategory = serde_json::from_str("\"co-production\"").unwrap();
        assert_eq!(back, DealCategory::CoProduction);
    }

    #[test]
    fn priority_excludes_other_and_starts_with_acquisition() {
        assert_eq!(DealCategory::PRIORITY.len(), 6);
        assert_eq!(DealCategory::PRIORITY[0], DealCategory::Acquisition);
        assert!(!DealCategory::PRIORITY.contains(&DealCategory::Other));
    }

    #[test]
    fn grade_order_is_a_before_d() {
        assert!(Grade::A < Grade::B);
        assert!(Grade::B < Grade::C);
        assert!(Grade::C < Grade::D);
        assert_eq!(serde_json::to_string(&Grade::A).unwrap(), "\"A\"");
    }

    #[test]
    fn record_key_distinguishes_category() {
        let mk = |cat| DealRecord {
            article_id: "a1".into(),
            article_url: "https://example.test/a1".into(),
            source: "kidscreen".into(),
            broadcaster_name: Some("Netflix".into()),
            show_title: Some("Blue Harbor".into()),
            deal_category: cat,
            deal_date: None,
            genres: BTreeSet::new(),
            regions: BTreeSet::new(),
            publication_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let a = mk(DealCategory::Acquisition);
        let b = mk(DealCategory::Renewal);
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), mk(DealCategory::Acquisition).key());
    }
}
