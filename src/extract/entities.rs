// src/extract/entities.rs
//! Entity tagging seam. Extraction only needs "spans tagged organization-like
//! or title-like", so the tagger is a narrow trait; the built-in
//! implementation is gazetteer + quoted-phrase driven, and a statistical NER
//! can be swapped in without touching the extractor.

use regex::Regex;

use crate::lexicon::Lexicon;

/// Span classification the extractor distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    /// Organization-like span, a candidate broadcaster.
    Organization,
    /// Title-like span, a candidate show.
    Title,
}

/// One tagged span with byte offsets into the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

/// Synchronous, CPU-bound tagging capability.
pub trait EntityTagger: Send + Sync {
    fn tag(&self, text: &str) -> Vec<EntitySpan>;
}

/// Default tagger: organizations from the broadcaster gazetteer (longest
/// name wins at a position), titles from double-quoted phrases.
pub struct LexiconTagger {
    org_re: Option<Regex>,
    title_re: Regex,
}

/// Word-boundary assertions only make sense next to word characters; names
/// like "Disney+" or "Warner Bros." end on punctuation and would never match
/// with a blanket `\b` suffix.
fn bounded_alternative(name: &str) -> String {
    let escaped = regex::escape(name);
    let lb = if name.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_') {
        r"\b"
    } else {
        ""
    };
    let rb = if name.chars().last().is_some_and(|c| c.is_alphanumeric() || c == '_') {
        r"\b"
    } else {
        ""
    };
    format!("{lb}{escaped}{rb}")
}

impl LexiconTagger {
    pub fn new(lexicon: &Lexicon) -> Self {
        // Longer names first: the regex alternation is preference-ordered, so
        // "Nickelodeon Movies" must be tried before "Nickelodeon".
        let mut names: Vec<&String> = lexicon.gazetteer().iter().collect();
        names.sort_by_key(|n| std::cmp::Reverse(n.chars().count()));

        let org_re = if names.is_empty() {
            None
        } else {
            let alts: Vec<String> = names.iter().map(|n| bounded_alternative(n)).collect();
            Some(
                Regex::new(&format!("(?i)(?:{})", alts.join("|")))
                    .expect("gazetteer alternation regex"),
            )
        };

        let title_re = Regex::new(r#""([^"\n]{2,80})"|\u{201C}([^\u{201D}\n]{2,80})\u{201D}"#)
            .expect("quoted title regex");

        Self { org_re, title_re }
    }
}

impl EntityTagger for LexiconTagger {
    fn tag(&self, text: &str) -> Vec<EntitySpan> {
        let mut out = Vec::new();

        if let Some(re) = &self.org_re {
            for m in re.find_iter(text) {
                out.push(EntitySpan {
                    text: text[m.start()..m.end()].to_string(),
                    label: EntityLabel::Organization,
                    start: m.start(),
                    end: m.end(),
                });
            }
        }

        for caps in self.title_re.captures_iter(text) {
            if let Some(m) = caps.get(1).or_else(|| caps.get(2)) {
                out.push(EntitySpan {
                    text: text[m.start()..m.end()].to_string(),
                    label: EntityLabel::Title,
                    start: m.start(),
                    end: m.end(),
                });
            }
        }

        out
    }
}

// --- Test helper ---
/// Replays a fixed span list regardless of input; keeps extractor tests
/// independent of any concrete tagger.
pub struct ScriptedTagger {
    spans: Vec<EntitySpan>,
}

impl ScriptedTagger {
    pub fn new(spans: Vec<EntitySpan>) -> Self {
        Self { spans }
    }

    /// Convenience constructor from plain org/title strings.
    pub fn of(orgs: &[&str], titles: &[&str]) -> Self {
        let mut spans = Vec::new();
        for o in orgs {
            spans.push(EntitySpan {
                text: (*o).to_string(),
                label: EntityLabel::Organization,
                start: 0,
                end: o.len(),
            });
        }
        for t in titles {
            spans.push(EntitySpan {
                text: (*t).to_string(),
                label: EntityLabel::Title,
                start: 0,
                end: t.len(),
            });
        }
        Self { spans }
    }
}

impl EntityTagger for ScriptedTagger {
    fn tag(&self, _text: &str) -> Vec<EntitySpan> {
        self.spans.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagger() -> LexiconTagger {
        LexiconTagger::new(&Lexicon::load(None).unwrap())
    }

    fn orgs(spans: &[EntitySpan]) -> Vec<&str> {
        spans
            .iter()
            .filter(|s| s.label == EntityLabel::Organization)
            .map(|s| s.text.as_str())
            .collect()
    }

    fn titles(spans: &[EntitySpan]) -> Vec<&str> {
        spans
            .iter()
            .filter(|s| s.label == EntityLabel::Title)
            .map(|s| s.text.as_str())
            .collect()
    }

    #[test]
    fn gazetteer_names_match_case_insensitively() {
        let spans = tagger().tag("NETFLIX and gkids split the rights.");
        assert_eq!(orgs(&spans), vec!["NETFLIX", "gkids"]);
    }

    #[test]
    fn names_with_trailing_punctuation_are_found() {
        let spans = tagger().tag("Disney+ has ordered a special from Warner Bros. today.");
        let o = orgs(&spans);
        assert!(o.contains(&"Disney+"));
        assert!(o.contains(&"Warner Bros."));
    }

    #[test]
    fn longest_gazetteer_name_wins_at_a_position() {
        let spans = tagger().tag("Nickelodeon Movies will handle the feature.");
        assert_eq!(orgs(&spans), vec!["Nickelodeon Movies"]);
    }

    #[test]
    fn quoted_phrases_become_title_spans() {
        let spans = tagger().tag(r#"The studio shopped "Blue Harbor" and “Night Garden” widely."#);
        assert_eq!(titles(&spans), vec!["Blue Harbor", "Night Garden"]);
    }

    #[test]
    fn repeated_mentions_yield_repeated_spans() {
        // Dedup is the extractor's job, not the tagger's.
        let spans = tagger().tag("Netflix said Netflix would not comment.");
        assert_eq!(orgs(&spans).len(), 2);
    }

    #[test]
    fn span_offsets_point_into_the_input() {
        let text = r#"BBC buys "Blue Harbor"."#;
        let spans = tagger().tag(text);
        for s in &spans {
            assert_eq!(&text[s.start..s.end], s.text);
        }
    }
}
