// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{Document, DocumentSource};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// One-time metrics registration for the fetch side.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "radar_documents_fetched_total",
            "Documents parsed out of source feeds."
        );
        describe_counter!(
            "radar_documents_kept_total",
            "Documents kept after URL deduplication."
        );
        describe_counter!(
            "radar_documents_deduped_total",
            "Documents dropped as duplicate URLs."
        );
        describe_counter!(
            "radar_source_errors_total",
            "Source fetch/parse errors."
        );
        describe_histogram!("radar_fetch_ms", "Source fetch+parse time in milliseconds.");
        describe_gauge!(
            "radar_last_fetch_ts",
            "Unix ts when the fetch stage last ran."
        );
    });
}

/// Normalize feed text: decode entities, strip markup, unify quotes,
/// collapse whitespace. Phrase matching downstream relies on plain words
/// separated by single spaces.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” « » ‘ ’ to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Drop repeated URLs, first occurrence wins. Trade feeds syndicate each
/// other, so the same article can arrive from two sources.
pub fn dedup_by_url(docs: Vec<Document>) -> (Vec<Document>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(docs.len());
    let mut dropped = 0usize;
    for doc in docs {
        if seen.insert(doc.url.clone()) {
            kept.push(doc);
        } else {
            dropped += 1;
        }
    }
    (kept, dropped)
}

/// Fetch every source once and return the deduplicated document batch.
/// A failing source is logged and skipped; the batch carries on without it.
/// `limit_per_source` caps each feed to its first N items (limited mode).
pub async fn fetch_all(
    sources: &[Box<dyn DocumentSource>],
    limit_per_source: Option<usize>,
) -> Vec<Document> {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for source in sources {
        match source.fetch_latest().await {
            Ok(mut batch) => {
                if let Some(cap) = limit_per_source {
                    if batch.len() > cap {
                        tracing::info!(
                            source = source.name(),
                            kept = cap,
                            fetched = batch.len(),
                            "limited mode: capping source batch"
                        );
                        batch.truncate(cap);
                    }
                }
                raw.append(&mut batch);
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = source.name(), "source error");
                counter!("radar_source_errors_total").increment(1);
            }
        }
    }

    let (kept, dropped) = dedup_by_url(raw);

    counter!("radar_documents_kept_total").increment(kept.len() as u64);
    counter!("radar_documents_deduped_total").increment(dropped as u64);
    gauge!("radar_last_fetch_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::Utc;

    #[test]
    fn normalize_text_strips_markup_and_entities() {
        let s = "  <p>Netflix &amp; BBC&nbsp;split the&#8220;package&#8221;</p>  ";
        assert_eq!(
            normalize_text(s),
            "Netflix & BBC split the\"package\""
        );
    }

    #[test]
    fn normalize_text_keeps_sentence_punctuation() {
        assert_eq!(normalize_text("Deal closed."), "Deal closed.");
    }

    #[test]
    fn tags_become_word_boundaries() {
        assert_eq!(normalize_text("<b>acquires</b><i>rights</i>"), "acquires rights");
    }

    fn doc(url: &str) -> Document {
        Document {
            id: types::article_id(url),
            source: "kidscreen".into(),
            url: url.into(),
            title: "t".into(),
            body_text: "b".into(),
            published_at: None,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let docs = vec![doc("https://a.test/1"), doc("https://a.test/2"), doc("https://a.test/1")];
        let (kept, dropped) = dedup_by_url(docs);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 1);
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl DocumentSource for FailingSource {
        async fn fetch_latest(&self) -> Result<Vec<Document>> {
            anyhow::bail!("boom")
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    struct FixedSource(Vec<Document>);

    #[async_trait::async_trait]
    impl DocumentSource for FixedSource {
        async fn fetch_latest(&self) -> Result<Vec<Document>> {
            Ok(self.0.clone())
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn failing_source_does_not_poison_the_batch() {
        let sources: Vec<Box<dyn DocumentSource>> = vec![
            Box::new(FailingSource),
            Box::new(FixedSource(vec![doc("https://a.test/1")])),
        ];
        let docs = fetch_all(&sources, None).await;
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn limited_mode_caps_each_source() {
        let batch = vec![
            doc("https://a.test/1"),
            doc("https://a.test/2"),
            doc("https://a.test/3"),
        ];
        let sources: Vec<Box<dyn DocumentSource>> = vec![
            Box::new(FixedSource(batch)),
            Box::new(FixedSource(vec![doc("https://b.test/1"), doc("https://b.test/2")])),
        ];
        let docs = fetch_all(&sources, Some(2)).await;
        assert_eq!(docs.len(), 4);
        assert_eq!(docs[0].url, "https://a.test/1");
        assert_eq!(docs[1].url, "https://a.test/2");
    }
}
