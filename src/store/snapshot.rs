// src/store/snapshot.rs
//! End-of-run publication of the full grade map. The pipeline writes one
//! snapshot per run regardless of how persistence went, so downstream
//! consumers always see the complete picture.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::info;

use crate::deal::BroadcasterGrade;

#[async_trait::async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn publish(&self, grades: &BTreeMap<String, BroadcasterGrade>) -> Result<()>;
}

/// Pretty-printed JSON file, keyed by broadcaster name.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl SnapshotSink for JsonFileSink {
    async fn publish(&self, grades: &BTreeMap<String, BroadcasterGrade>) -> Result<()> {
        let body = serde_json::to_vec_pretty(grades).context("serialize grade snapshot")?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("create snapshot dir {}", parent.display()))?;
            }
        }
        fs::write(&self.path, body)
            .await
            .with_context(|| format!("write snapshot {}", self.path.display()))?;
        info!(broadcasters = grades.len(), path = %self.path.display(), "published grade snapshot");
        Ok(())
    }
}

// --- Test helper ---
pub struct MockSink {
    pub published: std::sync::Mutex<Vec<BTreeMap<String, BroadcasterGrade>>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            published: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl SnapshotSink for MockSink {
    async fn publish(&self, grades: &BTreeMap<String, BroadcasterGrade>) -> Result<()> {
        self.published.lock().unwrap().push(grades.clone());
        Ok(())
    }
}
