// src/lexicon.rs
//! Lexicon primitives: trigger-phrase tables compiled into case-insensitive
//! whole-word matchers, the organization denylist, and the broadcaster
//! gazetteer backing the default entity tagger.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::deal::DealCategory;

const DEFAULT_LEXICON_JSON: &str = include_str!("../config/lexicon.json");

/* ----------------------------
Config schema (from JSON)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct LexiconConfig {
    pub deal_phrases: HashMap<DealCategory, Vec<String>>,
    pub genre_phrases: HashMap<String, Vec<String>>,
    pub region_phrases: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub org_denylist: Vec<String>,
    #[serde(default)]
    pub broadcaster_gazetteer: Vec<String>,
}

/* ----------------------------
Compiled engine
---------------------------- */

/// The lexicon with all phrase tables compiled to regexes at construction.
/// Immutable after build; shared by reference into extraction.
#[derive(Debug)]
pub struct Lexicon {
    deal_matchers: Vec<(DealCategory, Regex)>,
    genre_matchers: Vec<(String, Regex)>,
    region_matchers: Vec<(String, Regex)>,
    denylist_lower: Vec<String>,
    gazetteer: Vec<String>,
}

/// Whole-word alternation over escaped phrases, e.g. `(?i)\b(?:a|b c)\b`.
/// Empty phrase lists compile to nothing (a tag with no phrases never fires).
fn phrase_pattern(phrases: &[String]) -> Option<String> {
    let escaped: Vec<String> = phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        return None;
    }
    Some(format!(r"(?i)\b(?:{})\b", escaped.join("|")))
}

fn compile_tag_matchers(table: &HashMap<String, Vec<String>>) -> Result<Vec<(String, Regex)>> {
    let mut out = Vec::with_capacity(table.len());
    let mut tags: Vec<&String> = table.keys().collect();
    tags.sort();
    for tag in tags {
        if let Some(pat) = phrase_pattern(&table[tag]) {
            let re = Regex::new(&pat)
                .map_err(|e| anyhow!("lexicon tag `{}` regex error: {}", tag, e))?;
            out.push((tag.clone(), re));
        }
    }
    Ok(out)
}

impl Lexicon {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: LexiconConfig = serde_json::from_str(s).context("parsing lexicon json")?;
        Self::compile(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading lexicon from {}", path.display()))?;
        Self::from_json_str(&content)
    }

    /// Explicit path or the embedded default tables.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(p) => Self::from_path(p),
            None => Self::from_json_str(DEFAULT_LEXICON_JSON),
        }
    }

    fn compile(cfg: LexiconConfig) -> Result<Self> {
        // Deal matchers keep the fixed priority order; tag matchers are
        // order-insensitive (results land in sorted sets).
        let mut deal_matchers = Vec::with_capacity(DealCategory::PRIORITY.len());
        for cat in DealCategory::PRIORITY {
            let Some(phrases) = cfg.deal_phrases.get(&cat) else {
                continue;
            };
            if let Some(pat) = phrase_pattern(phrases) {
                let re = Regex::new(&pat)
                    .map_err(|e| anyhow!("deal category `{}` regex error: {}", cat.as_str(), e))?;
                deal_matchers.push((cat, re));
            }
        }

        let genre_matchers = compile_tag_matchers(&cfg.genre_phrases)?;
        let region_matchers = compile_tag_matchers(&cfg.region_phrases)?;

        let denylist_lower = cfg
            .org_denylist
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            deal_matchers,
            genre_matchers,
            region_matchers,
            denylist_lower,
            gazetteer: cfg.broadcaster_gazetteer,
        })
    }

    /// All matching categories, in priority order. Callers that need the
    /// stored category take the first entry; the full list still feeds
    /// diagnostics and tests.
    pub fn matched_categories(&self, text: &str) -> Vec<DealCategory> {
        self.deal_matchers
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(cat, _)| *cat)
            .collect()
    }

    /// All matching genre tags, deduplicated and lexicographically sorted.
    pub fn genre_tags(&self, text: &str) -> std::collections::BTreeSet<String> {
        self.genre_matchers
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    /// All matching region tags, deduplicated and lexicographically sorted.
    pub fn region_tags(&self, text: &str) -> std::collections::BTreeSet<String> {
        self.region_matchers
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    /// True when the lowercased name contains any denylist substring.
    /// Plain substring containment, so short entries cast a wide net.
    pub fn is_denied_org(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.denylist_lower.iter().any(|sub| lower.contains(sub))
    }

    pub fn gazetteer(&self) -> &[String] {
        &self.gazetteer
    }
}

/* ----------------------------
Tests
---------------------------- */
