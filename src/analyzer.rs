//! Deck analysis: category counts against a template, plus bracket checks.
//!
//! Analysis is recomputed from scratch per request. Every recoverable
//! problem (unknown template, missing bracket data, unresolvable card
//! names) degrades into a human-readable note instead of an error; only a
//! broken data source is fatal.

use chrono::Utc;

use crate::models::roles;
use crate::models::{
    AnalyzeInput, CategoryDeficit, CategoryStatus, CategorySummary, DeckAnalysis, ParsedDeck,
    Template, NONCOMMANDER_DECK_SIZE,
};
use crate::{DataContext, Result};

/// Categories that get a note when their count falls outside the
/// recommended range. The remaining categories still get summaries, just
/// not notes.
pub const KEY_CATEGORIES: &[&str] = &[
    "lands",
    "ramp",
    "target_removal",
    "board_wipes",
    "card_draw",
];

/// The fixed deck-size note: exactly one of three phrasings.
pub fn deck_size_note(total: u32) -> String {
    match total.cmp(&NONCOMMANDER_DECK_SIZE) {
        std::cmp::Ordering::Less => format!(
            "Deck has {} cards; a Commander deck runs {} cards excluding the commander.",
            total, NONCOMMANDER_DECK_SIZE
        ),
        std::cmp::Ordering::Greater => format!(
            "Deck has {} cards, which is more than the {} allowed excluding the commander.",
            total, NONCOMMANDER_DECK_SIZE
        ),
        std::cmp::Ordering::Equal => format!(
            "Deck size is correct: {} cards (excluding commander).",
            NONCOMMANDER_DECK_SIZE
        ),
    }
}

/// Analyze a parsed deck against a template and (when available) a bracket.
pub fn analyze(ctx: &DataContext, input: &AnalyzeInput, deck: &ParsedDeck) -> Result<DeckAnalysis> {
    let mut notes = Vec::new();

    let template_id = input
        .template
        .clone()
        .unwrap_or_else(|| ctx.config.default_template().to_string());
    let resolved = ctx.templates.template(&template_id)?;
    if resolved.fallback {
        notes.push(format!(
            "Template '{}' not found; using the '{}' template instead.",
            template_id, resolved.template.id
        ));
    }
    let template = &resolved.template;

    let total_cards = deck.total_cards();
    let unique_cards = deck.unique_cards();
    notes.push(deck_size_note(total_cards));

    // Count each entry toward every category its roles map to.
    let mut counts: Vec<(String, u32)> = template
        .categories
        .iter()
        .map(|c| (c.name.clone(), 0))
        .collect();
    for entry in &deck.entries {
        let card = ctx.cards.lookup(&entry.name);
        for role in roles::classify(card) {
            let Some(category) = role.category() else {
                continue;
            };
            if let Some(slot) = counts.iter_mut().find(|(name, _)| name == category) {
                slot.1 += entry.quantity;
            }
        }
    }

    let categories: Vec<CategorySummary> = template
        .categories
        .iter()
        .map(|category| {
            let count = counts
                .iter()
                .find(|(name, _)| *name == category.name)
                .map(|(_, n)| *n)
                .unwrap_or(0);
            CategorySummary {
                name: category.name.clone(),
                count,
                min: category.min,
                max: category.max,
                status: derive_status(count, category.min, category.max),
            }
        })
        .collect();

    for summary in &categories {
        if !KEY_CATEGORIES.contains(&summary.name.as_str()) {
            continue;
        }
        match summary.status {
            CategoryStatus::Below => notes.push(format!(
                "{}: {} is below the recommended minimum of {}.",
                summary.name,
                summary.count,
                summary.min.unwrap_or(0)
            )),
            CategoryStatus::Above => notes.push(format!(
                "{}: {} is above the recommended maximum of {}.",
                summary.name,
                summary.count,
                summary.max.unwrap_or(0)
            )),
            CategoryStatus::Within | CategoryStatus::Unknown => {}
        }
    }

    // Bracket checks only run when the bracket resolves; a missing bracket
    // simply yields no bracket fields or warnings. Precedence: request >
    // configured default > template id.
    let bracket_id = input
        .bracket
        .clone()
        .or_else(|| ctx.config.default_bracket().map(String::from))
        .unwrap_or_else(|| template_id.clone());
    let mut bracket = None;
    let mut bracket_label = None;
    let mut bracket_warnings = Vec::new();
    if let Some(rules) = ctx.templates.bracket_rules(&bracket_id) {
        let lists = ctx
            .templates
            .bracket_card_lists(&bracket_id)
            .unwrap_or_default();

        let mut game_changers = 0u32;
        let mut extra_turns = 0u32;
        let mut has_mass_land_denial = false;
        for entry in &deck.entries {
            if lists.is_game_changer(&entry.name) {
                game_changers += entry.quantity;
            }
            if lists.is_extra_turn(&entry.name) {
                extra_turns += entry.quantity;
            }
            if lists.is_mass_land_denial(&entry.name) {
                has_mass_land_denial = true;
            }
        }

        if game_changers > 0 {
            if game_changers > rules.max_game_changers {
                bracket_warnings.push(format!(
                    "Deck contains {} Game Changers, which exceeds the {} maximum of {}.",
                    game_changers, rules.label, rules.max_game_changers
                ));
            } else {
                bracket_warnings.push(format!(
                    "Deck contains {} Game Changer card(s) (maximum for {}: {}).",
                    game_changers, rules.label, rules.max_game_changers
                ));
            }
        }

        if has_mass_land_denial && !rules.allow_mass_land_denial {
            bracket_warnings.push(format!(
                "Deck contains mass land denial, which is not allowed in {}.",
                rules.label
            ));
        }

        if extra_turns > 0 {
            match rules.max_extra_turn_cards {
                Some(max) if extra_turns > max => bracket_warnings.push(format!(
                    "Deck contains {} extra-turn cards, which exceeds the {} maximum of {}.",
                    extra_turns, rules.label, max
                )),
                Some(max) => bracket_warnings.push(format!(
                    "Deck contains {} extra-turn card(s) (maximum for {}: {}).",
                    extra_turns, rules.label, max
                )),
                None => bracket_warnings.push(format!(
                    "Deck contains {} extra-turn card(s); {} sets no limit, but chaining extra turns is discouraged.",
                    extra_turns, rules.label
                )),
            }
        }

        bracket = Some(rules.id.clone());
        bracket_label = Some(rules.label.clone());
    }

    Ok(DeckAnalysis {
        commander: input.commander.clone(),
        template: template.id.clone(),
        bracket,
        bracket_label,
        total_cards,
        unique_cards,
        categories,
        notes,
        bracket_warnings,
        deck: deck.clone(),
        generated_at: Utc::now(),
    })
}

fn derive_status(count: u32, min: Option<u32>, max: Option<u32>) -> CategoryStatus {
    if min.is_none() && max.is_none() {
        return CategoryStatus::Unknown;
    }
    if let Some(min) = min {
        if count < min {
            return CategoryStatus::Below;
        }
    }
    if let Some(max) = max {
        if count > max {
            return CategoryStatus::Above;
        }
    }
    CategoryStatus::Within
}

/// Compute how far short of its recommended minimum each requested category
/// is. One result per requested name, in request order; a name missing from
/// the analysis or template yields current=0, no bounds, deficit=0.
pub fn category_deficits(
    analysis: &DeckAnalysis,
    template: &Template,
    category_names: &[&str],
) -> Vec<CategoryDeficit> {
    category_names
        .iter()
        .map(|&name| {
            let current = analysis
                .categories
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.count)
                .unwrap_or(0);
            let (min, max) = template
                .category(name)
                .map(|c| (c.min, c.max))
                .unwrap_or((None, None));
            let deficit = min.map(|m| m.saturating_sub(current)).unwrap_or(0);
            CategoryDeficit {
                name: name.to_string(),
                current,
                min,
                max,
                deficit,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decklist;
    use crate::test_utils::embedded_context;

    fn analyze_text(text: &str, input: &AnalyzeInput) -> DeckAnalysis {
        let (_dir, ctx) = embedded_context();
        let deck = decklist::parse(text);
        analyze(&ctx, input, &deck).unwrap()
    }

    fn bracket3_input() -> AnalyzeInput {
        AnalyzeInput {
            template: Some("bracket3".to_string()),
            ..Default::default()
        }
    }

    fn category<'a>(analysis: &'a DeckAnalysis, name: &str) -> &'a CategorySummary {
        analysis
            .categories
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("no category {}", name))
    }

    #[test]
    fn test_small_deck_counts_roles_into_categories() {
        let analysis = analyze_text(
            "1 Sol Ring\n1 Island\n1 Swords to Plowshares",
            &bracket3_input(),
        );
        assert_eq!(analysis.total_cards, 3);
        assert_eq!(analysis.unique_cards, 3);
        assert_eq!(category(&analysis, "lands").count, 1);
        assert_eq!(category(&analysis, "ramp").count, 1);
        assert_eq!(category(&analysis, "target_removal").count, 1);
        assert_eq!(category(&analysis, "board_wipes").count, 0);
    }

    #[test]
    fn test_deck_size_note_variants() {
        assert_eq!(
            deck_size_note(99),
            "Deck size is correct: 99 cards (excluding commander)."
        );
        assert!(deck_size_note(80).contains("80"));
        assert!(deck_size_note(80).contains("99"));
        assert!(deck_size_note(104).contains("more than"));
    }

    #[test]
    fn test_exact_size_deck_gets_correct_note() {
        let analysis = analyze_text("99 Island", &bracket3_input());
        assert!(analysis
            .notes
            .iter()
            .any(|n| n == "Deck size is correct: 99 cards (excluding commander)."));
    }

    #[test]
    fn test_below_minimum_emits_key_category_note() {
        let analysis = analyze_text("1 Island", &bracket3_input());
        let lands = category(&analysis, "lands");
        assert_eq!(lands.status, CategoryStatus::Below);
        assert!(analysis
            .notes
            .iter()
            .any(|n| n.contains("lands") && n.contains("below") && n.contains("35")));
    }

    #[test]
    fn test_category_without_bounds_is_unknown() {
        // The default template's tutor category has neither min nor max.
        let input = AnalyzeInput {
            template: Some("default".to_string()),
            ..Default::default()
        };
        let analysis = analyze_text("1 Island", &input);
        assert_eq!(category(&analysis, "tutor").status, CategoryStatus::Unknown);
    }

    #[test]
    fn test_unknown_card_counts_toward_nothing() {
        let analysis = analyze_text("1 Completely Made Up Card", &bracket3_input());
        for summary in &analysis.categories {
            assert_eq!(summary.count, 0, "category {}", summary.name);
        }
        assert_eq!(analysis.total_cards, 1);
    }

    #[test]
    fn test_multi_role_card_counts_toward_multiple_categories() {
        // Solemn Simulacrum is ramp and card draw.
        let analysis = analyze_text("1 Solemn Simulacrum", &bracket3_input());
        assert_eq!(category(&analysis, "ramp").count, 1);
        assert_eq!(category(&analysis, "card_draw").count, 1);
    }

    #[test]
    fn test_unknown_template_falls_back_with_note() {
        let input = AnalyzeInput {
            template: Some("tournament".to_string()),
            ..Default::default()
        };
        let analysis = analyze_text("1 Island", &input);
        assert_eq!(analysis.template, "default");
        assert!(analysis
            .notes
            .iter()
            .any(|n| n.contains("tournament") && n.contains("not found")));
    }

    #[test]
    fn test_missing_bracket_disables_bracket_checks() {
        let input = AnalyzeInput {
            template: Some("bracket3".to_string()),
            bracket: Some("bracket9".to_string()),
            ..Default::default()
        };
        let analysis = analyze_text("1 Rhystic Study", &input);
        assert!(analysis.bracket.is_none());
        assert!(analysis.bracket_label.is_none());
        assert!(analysis.bracket_warnings.is_empty());
    }

    #[test]
    fn test_game_changers_over_maximum_uses_exceeds_phrasing() {
        let analysis = analyze_text(
            "1 Rhystic Study\n1 Demonic Tutor\n1 Vampiric Tutor\n1 Mystical Tutor",
            &bracket3_input(),
        );
        assert_eq!(analysis.bracket.as_deref(), Some("bracket3"));
        assert_eq!(analysis.bracket_warnings.len(), 1);
        let warning = &analysis.bracket_warnings[0];
        assert!(warning.contains("4 Game Changers"));
        assert!(warning.contains("exceeds"));
        assert!(warning.contains("3"));
    }

    #[test]
    fn test_game_changers_within_maximum_uses_soft_phrasing() {
        let analysis = analyze_text("1 Rhystic Study\n1 Demonic Tutor", &bracket3_input());
        assert_eq!(analysis.bracket_warnings.len(), 1);
        let warning = &analysis.bracket_warnings[0];
        assert!(warning.contains("2 Game Changer"));
        assert!(!warning.contains("exceeds"));
    }

    #[test]
    fn test_mass_land_denial_warning() {
        let analysis = analyze_text("1 Armageddon", &bracket3_input());
        assert!(analysis
            .bracket_warnings
            .iter()
            .any(|w| w.contains("mass land denial")));
    }

    #[test]
    fn test_extra_turn_warning_without_configured_limit() {
        let analysis = analyze_text("1 Time Warp", &bracket3_input());
        assert!(analysis
            .bracket_warnings
            .iter()
            .any(|w| w.contains("extra-turn") && w.contains("no limit")));
    }

    #[test]
    fn test_extra_turn_warning_exceeding_configured_limit() {
        let input = AnalyzeInput {
            template: Some("bracket3".to_string()),
            bracket: Some("bracket1".to_string()),
            ..Default::default()
        };
        let analysis = analyze_text("1 Time Warp\n1 Temporal Manipulation", &input);
        assert!(analysis
            .bracket_warnings
            .iter()
            .any(|w| w.contains("extra-turn") && w.contains("exceeds")));
    }

    #[test]
    fn test_configured_default_bracket_used_when_request_names_none() {
        let (_dir, mut ctx) = embedded_context();
        ctx.config.default_bracket = Some("bracket1".to_string());
        let deck = decklist::parse("1 Time Warp");

        let analysis = analyze(&ctx, &bracket3_input(), &deck).unwrap();
        assert_eq!(analysis.bracket.as_deref(), Some("bracket1"));
        // bracket1 caps extra turns at 0, so a single copy already exceeds it.
        assert!(analysis
            .bracket_warnings
            .iter()
            .any(|w| w.contains("extra-turn") && w.contains("exceeds")));

        // An explicit bracket on the request still wins.
        let input = AnalyzeInput {
            template: Some("bracket3".to_string()),
            bracket: Some("bracket3".to_string()),
            ..Default::default()
        };
        let analysis = analyze(&ctx, &input, &deck).unwrap();
        assert_eq!(analysis.bracket.as_deref(), Some("bracket3"));
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let text = "1 Sol Ring\n1 Island\n1 Rhystic Study\n1 Armageddon";
        let a = analyze_text(text, &bracket3_input());
        let b = analyze_text(text, &bracket3_input());
        assert_eq!(a.categories, b.categories);
        assert_eq!(a.notes, b.notes);
        assert_eq!(a.bracket_warnings, b.bracket_warnings);
        assert_eq!(a.total_cards, b.total_cards);
    }

    #[test]
    fn test_quantity_weighted_counts() {
        let analysis = analyze_text("30 Island\n2 Sol Ring", &bracket3_input());
        assert_eq!(category(&analysis, "lands").count, 30);
        assert_eq!(category(&analysis, "ramp").count, 2);
    }

    #[test]
    fn test_deficits_follow_request_order_and_floor_at_zero() {
        let (_dir, ctx) = embedded_context();
        let deck = decklist::parse("1 Sol Ring\n1 Cultivate");
        let input = bracket3_input();
        let analysis = analyze(&ctx, &input, &deck).unwrap();
        let template = ctx.templates.template("bracket3").unwrap().template;

        let deficits = category_deficits(
            &analysis,
            &template,
            &["ramp", "card_draw", "nonexistent"],
        );
        assert_eq!(deficits.len(), 3);
        assert_eq!(deficits[0].name, "ramp");
        assert_eq!(deficits[0].current, 2);
        assert_eq!(deficits[0].deficit, 8);
        assert_eq!(deficits[1].name, "card_draw");
        assert_eq!(deficits[1].deficit, 10);
        assert_eq!(deficits[2].current, 0);
        assert_eq!(deficits[2].deficit, 0);
        assert!(deficits[2].min.is_none());
    }

    #[test]
    fn test_deficit_zero_when_minimum_met() {
        let (_dir, ctx) = embedded_context();
        let deck = decklist::parse("40 Island");
        let input = bracket3_input();
        let analysis = analyze(&ctx, &input, &deck).unwrap();
        let template = ctx.templates.template("bracket3").unwrap().template;

        let deficits = category_deficits(&analysis, &template, &["lands"]);
        assert_eq!(deficits[0].current, 40);
        assert_eq!(deficits[0].deficit, 0);
    }
}
