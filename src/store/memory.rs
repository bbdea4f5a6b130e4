// src/store/memory.rs
//! In-memory [`DealStore`] with optional JSON persistence. State lives in a
//! mutex-guarded map keyed by [`DealKey`]; when a path is configured, every
//! mutation rewrites the file so a crash between runs loses nothing.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::deal::{BroadcasterDeals, BroadcasterGrade, DealKey, DealRecord, UpsertStats};
use crate::store::DealStore;

#[derive(Debug, Default)]
struct State {
    deals: HashMap<DealKey, DealRecord>,
    grades: HashMap<String, BroadcasterGrade>,
}

/// On-disk shape. Maps with tuple keys do not survive JSON, so the file
/// carries plain lists and the key map is rebuilt on load.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FileState {
    #[serde(default)]
    deals: Vec<DealRecord>,
    #[serde(default)]
    grades: Vec<BroadcasterGrade>,
}

#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<State>,
    path: Option<PathBuf>,
}

impl MemoryStore {
    /// Purely in-memory store, nothing written anywhere.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            path: None,
        }
    }

    /// File-backed store. A missing file is a fresh start; an unreadable or
    /// corrupt one is an error rather than a silent wipe of the dataset.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = match fs::read_to_string(&path).await {
            Ok(raw) => {
                let file: FileState = serde_json::from_str(&raw)
                    .with_context(|| format!("parse deal store {}", path.display()))?;
                let mut state = State::default();
                for record in file.deals {
                    state.deals.insert(record.key(), record);
                }
                for grade in file.grades {
                    state.grades.insert(grade.broadcaster_name.clone(), grade);
                }
                debug!(
                    deals = state.deals.len(),
                    grades = state.grades.len(),
                    path = %path.display(),
                    "loaded deal store"
                );
                state
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => State::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("read deal store {}", path.display()))
            }
        };
        Ok(Self {
            state: Mutex::new(state),
            path: Some(path),
        })
    }

    pub fn deal_count(&self) -> usize {
        self.state.lock().expect("store mutex poisoned").deals.len()
    }

    pub fn grade_for(&self, broadcaster: &str) -> Option<BroadcasterGrade> {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .grades
            .get(broadcaster)
            .cloned()
    }

    /// Serialize under the lock, write after dropping it.
    async fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let body = {
            let state = self.state.lock().expect("store mutex poisoned");
            let mut file = FileState {
                deals: state.deals.values().cloned().collect(),
                grades: state.grades.values().cloned().collect(),
            };
            // Stable file ordering keeps diffs between runs readable.
            file.deals.sort_by_key(|d| d.key());
            file.grades
                .sort_by(|a, b| a.broadcaster_name.cmp(&b.broadcaster_name));
            serde_json::to_vec_pretty(&file).context("serialize deal store")?
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("create store dir {}", parent.display()))?;
            }
        }
        fs::write(path, body)
            .await
            .with_context(|| format!("write deal store {}", path.display()))?;
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DealStore for MemoryStore {
    async fn bulk_upsert_deals(&self, records: Vec<DealRecord>) -> Result<UpsertStats> {
        let mut stats = UpsertStats::default();
        {
            let mut state = self.state.lock().expect("store mutex poisoned");
            let now = Utc::now();
            for record in records {
                if record.article_id.is_empty() {
                    warn!(url = %record.article_url, "rejecting deal record without article id");
                    stats.failed += 1;
                    continue;
                }
                match state.deals.get_mut(&record.key()) {
                    Some(existing) => {
                        existing.article_url = record.article_url;
                        existing.source = record.source;
                        existing.deal_date = record.deal_date;
                        existing.genres = record.genres;
                        existing.regions = record.regions;
                        existing.publication_date = record.publication_date;
                        existing.updated_at = now;
                        stats.updated += 1;
                    }
                    None => {
                        let mut fresh = record;
                        fresh.created_at = now;
                        fresh.updated_at = now;
                        state.deals.insert(fresh.key(), fresh);
                        stats.inserted += 1;
                    }
                }
            }
        }
        self.persist().await?;
        Ok(stats)
    }

    async fn group_deals_by_broadcaster(&self) -> Result<Vec<BroadcasterDeals>> {
        let mut buckets: HashMap<String, Vec<DealRecord>> = HashMap::new();
        {
            let state = self.state.lock().expect("store mutex poisoned");
            // Grouping only sees records carrying both a broadcaster and a
            // publication date; dateless rows stay stored but ungrouped.
            for record in state.deals.values() {
                if record.publication_date.is_none() {
                    continue;
                }
                if let Some(name) = &record.broadcaster_name {
                    buckets.entry(name.clone()).or_default().push(record.clone());
                }
            }
        }

        let mut groups: Vec<BroadcasterDeals> = buckets
            .into_iter()
            .map(|(broadcaster_name, mut deals)| {
                deals.sort_by(|a, b| b.publication_date.cmp(&a.publication_date));
                let last_activity_date = deals.iter().filter_map(|d| d.publication_date).max();
                BroadcasterDeals {
                    broadcaster_name,
                    last_activity_date,
                    deal_count: deals.len(),
                    deals,
                }
            })
            .collect();
        groups.sort_by(|a, b| a.broadcaster_name.cmp(&b.broadcaster_name));
        Ok(groups)
    }

    async fn upsert_grade(&self, grade: &BroadcasterGrade) -> Result<()> {
        {
            let mut state = self.state.lock().expect("store mutex poisoned");
            state
                .grades
                .insert(grade.broadcaster_name.clone(), grade.clone());
        }
        self.persist().await
    }
}
