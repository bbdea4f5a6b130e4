// src/grading.rs
//! Grading aggregator: broadcaster-grouped deal records → letter grade,
//! ranking score, and summary fields. Grade and score are pure functions of
//! the group and the grading tables; only persistence is async.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{error, info, warn};

use crate::config::GradingConfig;
use crate::deal::{BroadcasterDeals, BroadcasterGrade, DealCategory, Grade, RecentDeal};
use crate::store::DealStore;

const MAX_RECENT_DEALS: usize = 5;
const MAX_SHOWS: usize = 10;
const SUMMARY_TOP_N: usize = 15;

/// Letter grade from whole days since last activity. Thresholds are
/// inclusive; a negative day count (future-dated deal) lands in A.
pub fn grade_from_days(cfg: &GradingConfig, days: i64) -> Grade {
    if days <= cfg.thresholds.a {
        Grade::A
    } else if days <= cfg.thresholds.b {
        Grade::B
    } else if days <= cfg.thresholds.c {
        Grade::C
    } else {
        Grade::D
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Ranking score: base points for the grade, scaled by the average weight of
/// the distinct observed categories, plus a volume bonus capped at 20.
pub fn score_for(
    cfg: &GradingConfig,
    grade: Grade,
    deal_count: usize,
    deal_types: &[DealCategory],
) -> f64 {
    let weight_sum: f64 = deal_types.iter().map(|c| cfg.weight_for(*c)).sum();
    let type_multiplier = weight_sum / deal_types.len().max(1) as f64;
    let bonus = (deal_count as f64 * 2.0).min(20.0);
    round2(grade.base_score() * type_multiplier + bonus)
}

/// Grade one broadcaster group. Returns `None` (after a warn) when the group
/// carries no usable last-activity date; everything else is total.
pub fn grade_group(
    cfg: &GradingConfig,
    now: DateTime<Utc>,
    group: &BroadcasterDeals,
) -> Option<BroadcasterGrade> {
    let Some(last_activity) = group.last_activity_date else {
        warn!(
            broadcaster = %group.broadcaster_name,
            "skipping broadcaster with missing activity date"
        );
        return None;
    };

    let days = (now - last_activity).num_days();
    let grade = grade_from_days(cfg, days);

    let mut deal_types: Vec<DealCategory> = group
        .deals
        .iter()
        .map(|d| d.deal_category)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    deal_types.sort_by_key(|c| c.as_str());

    let mut shows: Vec<String> = group
        .deals
        .iter()
        .filter_map(|d| d.show_title.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    shows.truncate(MAX_SHOWS);

    let genres: Vec<String> = group
        .deals
        .iter()
        .flat_map(|d| d.genres.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let regions: Vec<String> = group
        .deals
        .iter()
        .flat_map(|d| d.regions.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let score = score_for(cfg, grade, group.deal_count, &deal_types);

    // `deals` is already publication-date descending, so the head of the
    // list is the freshest evidence.
    let recent_deals: Vec<RecentDeal> = group
        .deals
        .iter()
        .take(MAX_RECENT_DEALS)
        .map(|d| RecentDeal {
            show_title: d.show_title.clone(),
            deal_type: d.deal_category,
            date: d.publication_date,
            source: d.source.clone(),
            article_url: d.article_url.clone(),
        })
        .collect();

    Some(BroadcasterGrade {
        broadcaster_name: group.broadcaster_name.clone(),
        grade,
        score,
        last_activity_date: last_activity,
        deal_count: group.deal_count,
        recent_deals,
        deal_types,
        shows,
        genres,
        regions,
        updated_at: now,
    })
}

/// Grade every broadcaster group the store knows about and persist each
/// result. One broadcaster's failure never aborts the batch, and a computed
/// grade stays in the returned map even when its own persist fails, so the
/// end-of-run snapshot always carries the full picture.
pub async fn grade_all(
    cfg: &GradingConfig,
    store: &dyn DealStore,
    now: DateTime<Utc>,
) -> anyhow::Result<BTreeMap<String, BroadcasterGrade>> {
    let groups = store.group_deals_by_broadcaster().await?;

    let mut grades: BTreeMap<String, BroadcasterGrade> = BTreeMap::new();
    for group in &groups {
        let Some(grade) = grade_group(cfg, now, group) else {
            counter!("radar_broadcasters_skipped_total").increment(1);
            continue;
        };
        grades.insert(group.broadcaster_name.clone(), grade.clone());

        if let Err(e) = store.upsert_grade(&grade).await {
            error!(
                error = ?e,
                broadcaster = %group.broadcaster_name,
                "failed to persist broadcaster grade"
            );
            counter!("radar_grading_failures_total").increment(1);
            continue;
        }
        counter!("radar_broadcasters_graded_total").increment(1);
    }

    info!(
        groups = groups.len(),
        graded = grades.len(),
        "grading pass completed"
    );
    Ok(grades)
}

/// Ranked console summary: grade distribution plus the top broadcasters,
/// grade ascending then score descending.
pub fn render_summary(grades: &BTreeMap<String, BroadcasterGrade>) -> String {
    let mut out = String::new();
    if grades.is_empty() {
        return out;
    }

    let mut dist: BTreeMap<Grade, usize> = BTreeMap::new();
    for g in [Grade::A, Grade::B, Grade::C, Grade::D] {
        dist.insert(g, 0);
    }
    for grade in grades.values() {
        *dist.entry(grade.grade).or_insert(0) += 1;
    }

    let mut ranked: Vec<&BroadcasterGrade> = grades.values().collect();
    ranked.sort_by(|a, b| {
        a.grade
            .cmp(&b.grade)
            .then(b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
    });

    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "BROADCASTER DEAL RADAR - SUMMARY");
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out);
    let _ = writeln!(out, "GRADE DISTRIBUTION:");
    for (grade, count) in &dist {
        let _ = writeln!(out, "  Grade {:?}: {} broadcasters", grade, count);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "TOP BROADCASTERS BY GRADE:");
    for bc in ranked.iter().take(SUMMARY_TOP_N) {
        let _ = writeln!(
            out,
            "  - [{:?}] {} (Score: {:.2}, Deals: {})",
            bc.grade, bc.broadcaster_name, bc.score, bc.deal_count
        );
    }
    let _ = writeln!(out, "{}", "=".repeat(60));

    out
}
