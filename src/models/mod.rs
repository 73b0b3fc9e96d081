//! Data models for Deckhand entities.
//!
//! This module defines the core data structures:
//! - `Card` - A card record from the bundled database
//! - `ColorIdentity` - Ordered set of color letters bounding a deck
//! - `ParsedDeck` - Quantity/name entries parsed from decklist text
//! - `Template` / `Category` - Recommended per-category count ranges
//! - `BracketRules` / `BracketCardLists` - Power-level bracket data
//! - `CategorySummary` / `CategoryDeficit` - Derived analysis output
//! - `BuiltDeck` - Output of the deck builder
//! - `Suggestion` - A ranked recommendation candidate

pub mod roles;

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::roles::Role;

/// Number of non-commander cards in a legal Commander deck.
pub const NONCOMMANDER_DECK_SIZE: u32 = 99;

/// One of the five colors, in canonical WUBRG order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Color {
    W,
    U,
    B,
    R,
    G,
}

impl Color {
    /// Parse a one-letter color code, case-insensitive.
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'W' => Some(Color::W),
            'U' => Some(Color::U),
            'B' => Some(Color::B),
            'R' => Some(Color::R),
            'G' => Some(Color::G),
            _ => None,
        }
    }

    /// The one-letter code for this color.
    pub fn letter(&self) -> char {
        match self {
            Color::W => 'W',
            Color::U => 'U',
            Color::B => 'B',
            Color::R => 'R',
            Color::G => 'G',
        }
    }

    /// The basic land that produces this color.
    pub fn basic_land(&self) -> &'static str {
        match self {
            Color::W => "Plains",
            Color::U => "Island",
            Color::B => "Swamp",
            Color::R => "Mountain",
            Color::G => "Forest",
        }
    }
}

/// A color identity: a subset of {W, U, B, R, G} kept in WUBRG order.
///
/// An empty identity means colorless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorIdentity(Vec<Color>);

impl ColorIdentity {
    /// Build an identity from colors, normalizing to sorted unique WUBRG order.
    pub fn new(mut colors: Vec<Color>) -> Self {
        colors.sort();
        colors.dedup();
        Self(colors)
    }

    /// Parse from one-letter codes, ignoring anything that is not a color.
    pub fn from_letters<S: AsRef<str>>(letters: &[S]) -> Self {
        let colors = letters
            .iter()
            .filter_map(|s| s.as_ref().chars().next())
            .filter_map(Color::from_letter)
            .collect();
        Self::new(colors)
    }

    pub fn colors(&self) -> &[Color] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_colorless(&self) -> bool {
        self.0.is_empty()
    }

    /// True if every color in `self` also appears in `other`.
    pub fn is_subset_of(&self, other: &ColorIdentity) -> bool {
        self.0.iter().all(|c| other.0.contains(c))
    }
}

impl fmt::Display for ColorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "C");
        }
        for c in &self.0 {
            write!(f, "{}", c.letter())?;
        }
        Ok(())
    }
}

/// A card record from the card database.
///
/// Immutable per request; the analyzer and builder never mutate cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    /// Card name (canonical English printing)
    pub name: String,

    /// Type line, e.g. "Legendary Creature — Elf Druid"
    pub type_line: String,

    /// Oracle rules text; empty for vanilla cards and most basics
    #[serde(default)]
    pub oracle_text: String,

    /// Color identity letters
    #[serde(default)]
    pub color_identity: ColorIdentity,
}

/// One parsed decklist entry: a positive quantity and an unresolved name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDeckEntry {
    pub quantity: u32,
    pub name: String,
}

/// An ordered sequence of parsed entries. Order is irrelevant to analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDeck {
    pub entries: Vec<ParsedDeckEntry>,
}

impl ParsedDeck {
    /// Sum of quantities across all entries.
    pub fn total_cards(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Number of distinct entries.
    pub fn unique_cards(&self) -> u32 {
        self.entries.len() as u32
    }
}

/// A named category with optional recommended minimum and maximum counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

/// A named set of category recommendations representing a target deck shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub categories: Vec<Category>,
}

impl Template {
    /// Look up a category by exact name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// Per-bracket limits on powerful cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketRules {
    pub id: String,

    pub label: String,

    pub max_game_changers: u32,

    pub allow_mass_land_denial: bool,

    /// Informational only; not enforced by any check.
    pub allow_early_infinite_combo: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_extra_turn_cards: Option<u32>,
}

/// Named card lists for a bracket. Membership checks are case-insensitive
/// and whitespace-trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketCardLists {
    #[serde(default)]
    pub game_changers: Vec<String>,

    #[serde(default)]
    pub mass_land_denial: Vec<String>,

    #[serde(default)]
    pub extra_turns: Vec<String>,
}

fn list_contains(list: &[String], name: &str) -> bool {
    let name = name.trim();
    list.iter().any(|c| c.trim().eq_ignore_ascii_case(name))
}

impl BracketCardLists {
    pub fn is_game_changer(&self, name: &str) -> bool {
        list_contains(&self.game_changers, name)
    }

    pub fn is_mass_land_denial(&self, name: &str) -> bool {
        list_contains(&self.mass_land_denial, name)
    }

    pub fn is_extra_turn(&self, name: &str) -> bool {
        list_contains(&self.extra_turns, name)
    }
}

/// Whether a category count sits below, within, or above its recommended
/// range. `Unknown` when the category has neither bound configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    Below,
    Within,
    Above,
    Unknown,
}

impl fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CategoryStatus::Below => "below",
            CategoryStatus::Within => "within",
            CategoryStatus::Above => "above",
            CategoryStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Derived per-category analysis row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,

    pub count: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,

    pub status: CategoryStatus,
}

/// How many cards short of its recommended minimum a category is.
///
/// `deficit` is never negative: it is zero when the count meets the minimum
/// or when no minimum is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDeficit {
    pub name: String,

    pub current: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,

    pub deficit: u32,
}

/// One entry in a built deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltDeckEntry {
    pub name: String,

    pub quantity: u32,

    /// Roles classified at add time, when the card resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeSet<Role>>,
}

/// A deck under construction: commander plus entries. Entries are only ever
/// appended, never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltDeck {
    pub commander: String,

    pub entries: Vec<BuiltDeckEntry>,
}

impl BuiltDeck {
    pub fn new(commander: impl Into<String>) -> Self {
        Self {
            commander: commander.into(),
            entries: Vec::new(),
        }
    }

    /// Sum of quantities across all entries (commander excluded).
    pub fn total_cards(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    pub fn push(&mut self, name: impl Into<String>, quantity: u32, roles: Option<BTreeSet<Role>>) {
        self.entries.push(BuiltDeckEntry {
            name: name.into(),
            quantity,
            roles,
        });
    }
}

/// A ranked recommendation candidate from an external source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,

    /// Rank within its source list; lower is more recommended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub synergy: Option<f64>,

    /// Which source list this came from (e.g. "top_cards", "top_lands").
    pub source: String,
}

/// Input to the analyze operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeInput {
    /// Commander name, passed through to the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commander: Option<String>,

    /// Template id; defaults to "bracket3".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Bracket id; defaults to the resolved template id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket: Option<String>,

    /// Accepted but currently inert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banlist: Option<String>,

    /// Accepted but currently inert.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub infer_commander: bool,

    /// Accepted but currently inert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Output of the analyze operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commander: Option<String>,

    /// Resolved template id (after any fallback).
    pub template: String,

    /// Resolved bracket id, when bracket rules loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_label: Option<String>,

    pub total_cards: u32,

    pub unique_cards: u32,

    pub categories: Vec<CategorySummary>,

    pub notes: Vec<String>,

    pub bracket_warnings: Vec<String>,

    /// Echo of the parsed deck the analysis was computed from.
    pub deck: ParsedDeck,

    pub generated_at: DateTime<Utc>,
}

/// Input to the build operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInput {
    /// Commander name; the only required field.
    pub commander: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket: Option<String>,

    /// Accepted but currently inert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banlist: Option<String>,

    /// Accepted but currently inert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,

    /// Cards to include at quantity 1 before the land base.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seed_cards: Vec<String>,

    /// Fetch ranked recommendations for the color identity.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fetch_recommendations: bool,

    /// Autofill category deficits from recommendations (implies fetch).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub autofill: bool,
}

/// Which recommendation sources were consulted during a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationContext {
    /// Source tags consulted (e.g. "top_cards", "top_lands").
    pub sources: Vec<String>,

    /// Number of deduplicated suggestions fetched.
    pub fetched: usize,
}

/// Output of the build operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    pub commander: String,

    pub color_identity: ColorIdentity,

    /// Resolved template id.
    pub template: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_label: Option<String>,

    pub deck: BuiltDeck,

    pub analysis: DeckAnalysis,

    pub notes: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<RecommendationContext>,

    pub generated_at: DateTime<Utc>,
}
