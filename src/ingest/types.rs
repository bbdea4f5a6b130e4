// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// One fetched article, body already normalized. `published_at` stays the
/// raw feed string; parsing happens downstream so a malformed date can fail
/// per-article instead of per-feed.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub source: String, // configured source name, e.g. "kidscreen"
    pub url: String,
    pub title: String,
    pub body_text: String,
    pub published_at: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Stable article identity: hex SHA-256 of the URL.
pub fn article_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Document>>;
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_id_is_stable_hex() {
        let a = article_id("https://kidscreen.com/2025/08/01/deal");
        let b = article_id("https://kidscreen.com/2025/08/01/deal");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn article_id_changes_with_url() {
        assert_ne!(article_id("https://a.test/1"), article_id("https://a.test/2"));
    }
}
