// src/extract/mod.rs
//! Deal extraction: document text + lexicon + tagged entity spans →
//! structured deal candidates. Pure and synchronous; the orchestrator owns
//! all I/O around it.

pub mod dates;
pub mod entities;

use std::collections::HashSet;

use crate::deal::{DealCandidate, DealCategory};
use crate::lexicon::Lexicon;
use entities::{EntityLabel, EntityTagger, LexiconTagger};

/// Turns one document's body text into zero or more deal candidates.
/// Owns the immutable lexicon and the injected tagger for the whole run.
pub struct DealExtractor {
    lexicon: Lexicon,
    tagger: Box<dyn EntityTagger>,
}

/// Exact-string dedup that keeps first-seen order.
fn dedup_keep_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|s| seen.insert(s.clone())).collect()
}

impl DealExtractor {
    pub fn new(lexicon: Lexicon, tagger: Box<dyn EntityTagger>) -> Self {
        Self { lexicon, tagger }
    }

    /// Gazetteer-backed tagger built from the same lexicon.
    pub fn with_default_tagger(lexicon: Lexicon) -> Self {
        let tagger = Box::new(LexiconTagger::new(&lexicon));
        Self::new(lexicon, tagger)
    }

    /// Organization spans survive when no denylist substring matches, the
    /// trimmed text has at least 3 chars, and the raw span has no internal
    /// line break.
    fn keep_organization(&self, raw: &str) -> bool {
        !self.lexicon.is_denied_org(raw)
            && raw.trim().chars().count() > 2
            && !raw.contains('\n')
    }

    pub fn extract(&self, body_text: &str, raw_publish_date: Option<&str>) -> Vec<DealCandidate> {
        if body_text.trim().is_empty() {
            return Vec::new();
        }

        let spans = self.tagger.tag(body_text);

        // Identical surface text may appear in both lists; there is no
        // cross-filtering between organizations and titles.
        let mut broadcasters = Vec::new();
        let mut shows = Vec::new();
        for span in &spans {
            match span.label {
                EntityLabel::Organization => {
                    if self.keep_organization(&span.text) {
                        broadcasters.push(span.text.trim().to_string());
                    }
                }
                EntityLabel::Title => {
                    let t = span.text.trim();
                    if !t.is_empty() {
                        shows.push(t.to_string());
                    }
                }
            }
        }
        let broadcasters = dedup_keep_order(broadcasters);
        let shows = dedup_keep_order(shows);

        // Every category is tested, but only the first match in priority
        // order is stored; genre/region tagging keeps all matches.
        let matched = self.lexicon.matched_categories(body_text);
        let category = matched.first().copied().unwrap_or(DealCategory::Other);
        let genres = self.lexicon.genre_tags(body_text);
        let regions = self.lexicon.region_tags(body_text);

        let deal_date = raw_publish_date
            .and_then(dates::parse_publish_date)
            .map(|dt| dt.date_naive());

        let make = |broadcaster: Option<String>, show: Option<String>| DealCandidate {
            broadcaster,
            show,
            deal_category: category,
            deal_date,
            genres: genres.clone(),
            regions: regions.clone(),
        };

        let mut out = Vec::new();
        if !broadcasters.is_empty() && !shows.is_empty() {
            for b in &broadcasters {
                for s in &shows {
                    out.push(make(Some(b.clone()), Some(s.clone())));
                }
            }
        } else if !broadcasters.is_empty() {
            for b in &broadcasters {
                out.push(make(Some(b.clone()), None));
            }
        } else if !shows.is_empty() {
            for s in &shows {
                out.push(make(None, Some(s.clone())));
            }
        } else if category != DealCategory::Other || !genres.is_empty() || !regions.is_empty() {
            // No entities at all still carries signal, but an entirely empty
            // combination yields nothing.
            out.push(make(None, None));
        }

        out
    }
}
