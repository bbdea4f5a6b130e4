// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::debug;

use crate::ingest::normalize_text;
use crate::ingest::types::{article_id, Document, DocumentSource};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// One configured RSS feed. Every trade source speaks the same RSS dialect,
/// so a single provider parameterized by (name, feed_url) covers them all.
pub struct RssSource {
    name: String,
    feed_url: String,
    client: reqwest::Client,
    fixture: Option<String>,
}

impl RssSource {
    pub fn new(name: impl Into<String>, feed_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            feed_url: feed_url.into(),
            client,
            fixture: None,
        }
    }

    /// Parse canned XML instead of fetching. Test-only wiring, but kept in
    /// the public surface so integration tests can drive the full pipeline.
    pub fn from_fixture(name: impl Into<String>, content: &str) -> Self {
        Self {
            name: name.into(),
            feed_url: String::new(),
            client: reqwest::Client::new(),
            fixture: Some(content.to_string()),
        }
    }

    fn parse(&self, xml: &str) -> Result<Vec<Document>> {
        let rss: Rss = from_str(xml).with_context(|| format!("parsing {} rss xml", self.name))?;
        let fetched_at = Utc::now();
        let mut out = Vec::with_capacity(rss.channel.item.len());

        for it in rss.channel.item {
            let Some(url) = it.link.as_deref().map(str::trim).filter(|l| !l.is_empty()) else {
                debug!(source = %self.name, "skipping feed item without link");
                continue;
            };

            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            let description = normalize_text(it.description.as_deref().unwrap_or_default());
            let body_text = match (title.is_empty(), description.is_empty()) {
                (true, true) => continue,
                (false, true) => title.clone(),
                (true, false) => description,
                (false, false) => format!("{title}. {description}"),
            };

            out.push(Document {
                id: article_id(url),
                source: self.name.clone(),
                url: url.to_string(),
                title,
                body_text,
                published_at: it.pub_date,
                fetched_at,
            });
        }

        Ok(out)
    }
}

#[async_trait]
impl DocumentSource for RssSource {
    async fn fetch_latest(&self) -> Result<Vec<Document>> {
        let t0 = std::time::Instant::now();

        let xml = match &self.fixture {
            Some(content) => content.clone(),
            None => {
                let resp = self
                    .client
                    .get(&self.feed_url)
                    .send()
                    .await
                    .with_context(|| format!("fetching {} feed", self.name))?
                    .error_for_status()
                    .with_context(|| format!("{} feed returned error status", self.name))?;
                resp.text()
                    .await
                    .with_context(|| format!("reading {} feed body", self.name))?
            }
        };

        let docs = self.parse(&xml)?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("radar_fetch_ms").record(ms);
        counter!("radar_documents_fetched_total").increment(docs.len() as u64);

        Ok(docs)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
