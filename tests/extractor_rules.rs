// tests/extractor_rules.rs
//
// Extraction behavior through the public surface: embedded lexicon plus the
// gazetteer-backed default tagger, no scripted entities.

use deal_radar::deal::DealCategory;
use deal_radar::extract::DealExtractor;
use deal_radar::lexicon::Lexicon;

fn extractor() -> DealExtractor {
    let lexicon = Lexicon::load(None).expect("embedded lexicon");
    DealExtractor::with_default_tagger(lexicon)
}

#[test]
fn prose_with_org_title_and_trigger_yields_a_full_candidate() {
    let ex = extractor();
    let text = "Netflix acquires the animated series \"Juniper Lane\" for the UK and France.";
    let out = ex.extract(text, Some("Mon, 15 Jul 2024 09:00:00 +0000"));

    assert_eq!(out.len(), 1);
    let c = &out[0];
    assert_eq!(c.broadcaster.as_deref(), Some("Netflix"));
    assert_eq!(c.show.as_deref(), Some("Juniper Lane"));
    assert_eq!(c.deal_category, DealCategory::Acquisition);
    assert!(c.genres.contains("animation"));
    assert_eq!(c.regions.iter().collect::<Vec<_>>(), vec!["europe"]);
    assert_eq!(c.deal_date.map(|d| d.to_string()).as_deref(), Some("2024-07-15"));
}

#[test]
fn category_priority_prefers_licensing_over_renewal() {
    let ex = extractor();
    // Both "rights deal" and "second season" appear; the earlier category in
    // priority order wins regardless of text position.
    let out = ex.extract("The second season rides on a wider rights deal for BBC.", None);
    assert!(!out.is_empty());
    assert!(out.iter().all(|c| c.deal_category == DealCategory::Licensing));
}

#[test]
fn trigger_inside_a_longer_word_does_not_fire() {
    let ex = extractor();
    let out = ex.extract("The reacquisition dispute rumbles on in court.", None);
    assert!(out.is_empty());
}

#[test]
fn longest_gazetteer_name_wins_overlaps() {
    let ex = extractor();
    let out = ex.extract("Nickelodeon Movies boards \"Star Ferry\" next spring.", None);
    let brands: Vec<_> = out.iter().filter_map(|c| c.broadcaster.as_deref()).collect();
    assert_eq!(brands, vec!["Nickelodeon Movies"]);
}

#[test]
fn punctuation_edged_brand_names_still_match() {
    let ex = extractor();
    let out = ex.extract("Disney+ orders a new docuseries about reef life.", None);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].broadcaster.as_deref(), Some("Disney+"));
    assert_eq!(out[0].deal_category, DealCategory::Commission);
    assert!(out[0].genres.contains("documentary"));
}

#[test]
fn denylisted_gazetteer_entries_fall_back_to_show_only() {
    let ex = extractor();
    // "Spin Master Entertainment" is in the gazetteer but trips the
    // organization denylist, so only the quoted title survives.
    let out = ex.extract("Spin Master Entertainment buys \"Gear Gang\" outright.", None);
    assert_eq!(out.len(), 1);
    assert!(out[0].broadcaster.is_none());
    assert_eq!(out[0].show.as_deref(), Some("Gear Gang"));
    assert_eq!(out[0].deal_category, DealCategory::Acquisition);
}

#[test]
fn quoted_titles_use_curly_or_straight_quotes() {
    let ex = extractor();
    let straight = ex.extract("ITV commissions \"Harbor Tales\" today.", None);
    let curly = ex.extract("ITV commissions \u{201C}Harbor Tales\u{201D} today.", None);
    assert_eq!(straight.len(), 1);
    assert_eq!(curly.len(), 1);
    assert_eq!(
        straight[0].show.as_deref(),
        curly[0].show.as_deref(),
    );
}

#[test]
fn bare_region_mention_without_entities_still_registers() {
    let ex = extractor();
    let out = ex.extract("A renewal is close for the drama, sources in Japan say.", None);
    assert_eq!(out.len(), 1);
    assert!(out[0].broadcaster.is_none());
    assert!(out[0].show.is_none());
    assert_eq!(out[0].deal_category, DealCategory::Renewal);
    assert!(out[0].genres.contains("drama"));
    assert!(out[0].regions.contains("asia"));
}
