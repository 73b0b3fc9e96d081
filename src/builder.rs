//! Skeleton deck building.
//!
//! A build starts from a commander, lays down seed cards and a basic land
//! base sized to the template, then optionally autofills category deficits
//! from ranked recommendations. The result always carries a full analysis
//! of the finished list, so a build response is also an analyze response.
//!
//! Recommendation fetches come through a [`RecommendationSource`] handle;
//! the two source lists are fetched on parallel threads since either one is
//! enough to make progress and both are independent network calls. Any
//! fetch failure degrades to a note.

use std::collections::HashSet;

use chrono::Utc;

use crate::analyzer::{self, category_deficits};
use crate::decklist;
use crate::edhrec::{merge_suggestions, RecommendationSource};
use crate::models::roles;
use crate::models::{
    AnalyzeInput, BuildInput, BuildResult, BuiltDeck, ColorIdentity, RecommendationContext,
    Suggestion, NONCOMMANDER_DECK_SIZE,
};
use crate::{DataContext, Error, Result};

/// Categories autofill tries to satisfy, in priority order.
const AUTOFILL_PRIORITY: &[&str] = &["ramp", "card_draw", "target_removal", "board_wipes"];

/// Land count used when the template has no lands category.
const DEFAULT_TARGET_LANDS: u32 = 37;

/// Game Changer ceiling applied when no bracket rules resolve.
const FALLBACK_MAX_GAME_CHANGERS: u32 = 3;

/// Build a skeleton deck for a commander.
///
/// The only fatal errors are an unknown commander and broken data files;
/// everything else (unknown template, failed fetches, unfillable deficits)
/// degrades to notes on the result.
pub fn build(
    ctx: &DataContext,
    source: &dyn RecommendationSource,
    input: &BuildInput,
) -> Result<BuildResult> {
    let mut notes = Vec::new();

    let commander = ctx
        .cards
        .lookup(&input.commander)
        .ok_or_else(|| Error::CommanderNotFound(input.commander.clone()))?;
    let colors = commander.color_identity.clone();

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

    let bracket_id = input
        .bracket
        .clone()
        .or_else(|| ctx.config.default_bracket().map(String::from))
        .unwrap_or_else(|| template_id.clone());
    let bracket_rules = ctx.templates.bracket_rules(&bracket_id);
    let bracket_lists = ctx
        .templates
        .bracket_card_lists(&bracket_id)
        .unwrap_or_default();
    let max_game_changers = bracket_rules
        .as_ref()
        .map(|r| r.max_game_changers)
        .unwrap_or(FALLBACK_MAX_GAME_CHANGERS);

    let mut deck = BuiltDeck::new(&commander.name);
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(commander.name.trim().to_lowercase());

    // Seed cards go in first, one copy each, duplicates collapsed.
    for seed in &input.seed_cards {
        let key = seed.trim().to_lowercase();
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        match ctx.cards.lookup(seed) {
            Some(card) => deck.push(&card.name, 1, Some(roles::classify(Some(card)))),
            None => {
                notes.push(format!(
                    "Seed card '{}' was not found in the card database.",
                    seed
                ));
                deck.push(seed.trim(), 1, None);
            }
        }
    }

    add_land_base(ctx, template, &colors, &mut deck, &mut seen);

    notes.push(analyzer::deck_size_note(deck.total_cards()));

    let analyze_input = AnalyzeInput {
        commander: Some(commander.name.clone()),
        template: Some(template_id.clone()),
        bracket: Some(bracket_id.clone()),
        ..Default::default()
    };
    let baseline = analyzer::analyze(ctx, &analyze_input, &decklist::parse(&decklist::flatten(&deck)))?;

    // Recommendations.
    let mut recommendations = None;
    let mut suggestions = Vec::new();
    if input.fetch_recommendations || input.autofill {
        let limit = ctx.config.request_limit();
        let (cards_result, lands_result) = std::thread::scope(|s| {
            let cards = s.spawn(|| source.top_cards(&colors, limit));
            let lands = s.spawn(|| source.top_lands(&colors, limit));
            (cards.join(), lands.join())
        });

        let mut lists = Vec::new();
        let mut failures = 0;
        for (tag, result) in [("top_cards", cards_result), ("top_lands", lands_result)] {
            match result {
                Ok(Ok(list)) => lists.push(list),
                Ok(Err(e)) => {
                    failures += 1;
                    notes.push(format!("Failed to fetch {} recommendations: {}", tag, e));
                }
                Err(_) => {
                    failures += 1;
                    notes.push(format!("Failed to fetch {} recommendations: worker panicked", tag));
                }
            }
        }
        suggestions = merge_suggestions(lists);
        // When every fetch failed the context is absent, not empty.
        if failures < 2 {
            recommendations = Some(RecommendationContext {
                sources: vec!["top_cards".to_string(), "top_lands".to_string()],
                fetched: suggestions.len(),
            });
        }
    }

    if input.autofill {
        if suggestions.is_empty() {
            notes.push("No recommendations available; autofill skipped.".to_string());
        } else {
            autofill(
                ctx,
                &baseline,
                template,
                &colors,
                &bracket_lists,
                max_game_changers,
                &suggestions,
                &mut deck,
                &mut seen,
                &mut notes,
            );
            notes.push(analyzer::deck_size_note(deck.total_cards()));
        }
    }

    // Final analysis reflects whatever the deck ended up as.
    let analysis = analyzer::analyze(ctx, &analyze_input, &decklist::parse(&decklist::flatten(&deck)))?;

    notes.push(
        "This is a skeleton list; review the curve and synergies before play.".to_string(),
    );

    Ok(BuildResult {
        commander: commander.name.clone(),
        color_identity: colors,
        template: analysis.template.clone(),
        bracket: analysis.bracket.clone(),
        bracket_label: analysis.bracket_label.clone(),
        deck,
        analysis,
        notes,
        recommendations,
        generated_at: Utc::now(),
    })
}

/// Target land count: the rounded midpoint of the template's lands bounds.
fn target_lands(template: &crate::models::Template) -> u32 {
    match template.category("lands") {
        Some(cat) => match (cat.min, cat.max) {
            (Some(min), Some(max)) => ((min + max) as f64 / 2.0).round() as u32,
            (Some(min), None) => min,
            (None, Some(max)) => max,
            (None, None) => DEFAULT_TARGET_LANDS,
        },
        None => DEFAULT_TARGET_LANDS,
    }
}

/// Add the template's full target of basic lands, split evenly across the
/// commander's colors with the remainder going to the earlier colors in
/// WUBRG order. Colorless commanders get Wastes. Seed cards never shrink
/// the land base; the deck-size note flags any overshoot.
fn add_land_base(
    ctx: &DataContext,
    template: &crate::models::Template,
    colors: &ColorIdentity,
    deck: &mut BuiltDeck,
    seen: &mut HashSet<String>,
) {
    let target = target_lands(template);
    if target == 0 {
        return;
    }

    let mut allotments: Vec<(&str, u32)> = Vec::new();
    if colors.is_colorless() {
        allotments.push(("Wastes", target));
    } else {
        let n = colors.len() as u32;
        let per = target / n;
        let remainder = target % n;
        for (i, color) in colors.colors().iter().enumerate() {
            let mut count = per;
            if (i as u32) < remainder {
                count += 1;
            }
            if count > 0 {
                allotments.push((color.basic_land(), count));
            }
        }
    }

    for (name, count) in allotments {
        seen.insert(name.to_lowercase());
        let roles = ctx.cards.lookup(name).map(|c| roles::classify(Some(c)));
        deck.push(name, count, roles);
    }
}

/// Fill category deficits from merged suggestions, priority order, one copy
/// per card.
#[allow(clippy::too_many_arguments)]
fn autofill(
    ctx: &DataContext,
    baseline: &crate::models::DeckAnalysis,
    template: &crate::models::Template,
    colors: &ColorIdentity,
    bracket_lists: &std::sync::Arc<crate::models::BracketCardLists>,
    max_game_changers: u32,
    suggestions: &[Suggestion],
    deck: &mut BuiltDeck,
    seen: &mut HashSet<String>,
    notes: &mut Vec<String>,
) {
    let mut game_changers: u32 = deck
        .entries
        .iter()
        .filter(|e| bracket_lists.is_game_changer(&e.name))
        .map(|e| e.quantity)
        .sum();

    let deficits = category_deficits(baseline, template, AUTOFILL_PRIORITY);
    let mut added: Vec<(String, u32)> = Vec::new();
    let mut unfilled: Vec<(String, u32)> = Vec::new();

    for deficit in deficits {
        let mut remaining = deficit.deficit;
        if remaining == 0 {
            continue;
        }

        for suggestion in suggestions {
            if remaining == 0 || deck.total_cards() >= NONCOMMANDER_DECK_SIZE {
                break;
            }
            let key = suggestion.name.trim().to_lowercase();
            if seen.contains(&key) {
                continue;
            }
            // Only cards we can verify get autofilled.
            let Some(card) = ctx.cards.lookup(&suggestion.name) else {
                continue;
            };
            if !card.color_identity.is_subset_of(colors) {
                continue;
            }
            if bracket_lists.is_mass_land_denial(&card.name)
                || bracket_lists.is_extra_turn(&card.name)
            {
                continue;
            }
            let is_game_changer = bracket_lists.is_game_changer(&card.name);
            if is_game_changer && game_changers >= max_game_changers {
                continue;
            }
            let card_roles = roles::classify(Some(card));
            if !card_roles
                .iter()
                .any(|r| r.category() == Some(deficit.name.as_str()))
            {
                continue;
            }

            seen.insert(key);
            deck.push(&card.name, 1, Some(card_roles));
            if is_game_changer {
                game_changers += 1;
            }
            remaining -= 1;
            match added.iter_mut().find(|(name, _)| *name == deficit.name) {
                Some(slot) => slot.1 += 1,
                None => added.push((deficit.name.clone(), 1)),
            }
        }

        if remaining > 0 {
            unfilled.push((deficit.name.clone(), remaining));
        }
    }

    if !added.is_empty() {
        let total: u32 = added.iter().map(|(_, n)| n).sum();
        let detail = added
            .iter()
            .map(|(name, n)| format!("{} +{}", name, n))
            .collect::<Vec<_>>()
            .join(", ");
        notes.push(format!("Autofill added {} card(s): {}.", total, detail));
    }
    for (name, remaining) in unfilled {
        notes.push(format!(
            "Unable to fill {} to its minimum; {} more needed.",
            name, remaining
        ));
    }
}
