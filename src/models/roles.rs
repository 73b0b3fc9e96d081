//! Functional role classification for cards.
//!
//! Roles are assigned by fixed keyword heuristics over a card's type line
//! and oracle text. The rules live in an ordered table of (role, predicate)
//! pairs so each rule can be unit-tested on its own; a card may satisfy
//! several rules and carry several roles.
//!
//! Two cases bypass the table entirely:
//! - a card whose type line contains "land" is exactly `{land}`
//! - a card that failed to resolve is exactly `{other}`

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Card;

/// Functional role of a card in a Commander deck.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Land,
    Ramp,
    TargetRemoval,
    BoardWipe,
    CardDraw,
    Protection,
    Tutor,
    Wincon,
    Other,
}

impl Role {
    /// Map a role to the template category it counts toward.
    ///
    /// `Other` counts toward nothing. Category names are the integration
    /// point between roles and templates, so board wipes pluralize.
    pub fn category(&self) -> Option<&'static str> {
        match self {
            Role::Land => Some("lands"),
            Role::Ramp => Some("ramp"),
            Role::TargetRemoval => Some("target_removal"),
            Role::BoardWipe => Some("board_wipes"),
            Role::CardDraw => Some("card_draw"),
            Role::Protection => Some("protection"),
            Role::Tutor => Some("tutor"),
            Role::Wincon => Some("wincon"),
            Role::Other => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Land => "land",
            Role::Ramp => "ramp",
            Role::TargetRemoval => "target_removal",
            Role::BoardWipe => "board_wipe",
            Role::CardDraw => "card_draw",
            Role::Protection => "protection",
            Role::Tutor => "tutor",
            Role::Wincon => "wincon",
            Role::Other => "other",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A set of roles. Always non-empty when produced by [`classify`].
pub type RoleSet = BTreeSet<Role>;

/// Lower-cased card text the rule predicates run against.
struct CardText {
    type_line: String,
    oracle: String,
}

impl CardText {
    fn new(card: &Card) -> Self {
        Self {
            type_line: card.type_line.to_lowercase(),
            oracle: card.oracle_text.to_lowercase(),
        }
    }

    fn type_has(&self, needle: &str) -> bool {
        self.type_line.contains(needle)
    }

    fn oracle_has(&self, needle: &str) -> bool {
        self.oracle.contains(needle)
    }

    fn oracle_has_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.oracle.contains(n))
    }
}

/// The ordered rule table. Order only affects the order roles are tested,
/// not the outcome; every rule is evaluated independently.
const ROLE_RULES: &[(Role, fn(&CardText) -> bool)] = &[
    (Role::Ramp, is_ramp),
    (Role::TargetRemoval, is_target_removal),
    (Role::BoardWipe, is_board_wipe),
    (Role::CardDraw, is_card_draw),
    (Role::Protection, is_protection),
    (Role::Tutor, is_tutor),
    (Role::Wincon, is_wincon),
];

/// Classify a resolved card, or `None` for a name the database couldn't
/// resolve. Always returns a non-empty set.
pub fn classify(card: Option<&Card>) -> RoleSet {
    let Some(card) = card else {
        return RoleSet::from([Role::Other]);
    };

    let text = CardText::new(card);

    // A land is a land and nothing else, regardless of its rules text.
    if text.type_has("land") {
        return RoleSet::from([Role::Land]);
    }

    let mut roles = RoleSet::new();
    for (role, rule) in ROLE_RULES {
        if rule(&text) {
            roles.insert(*role);
        }
    }

    if roles.is_empty() {
        roles.insert(Role::Other);
    }
    roles
}

/// Mana acceleration: mana rocks, mana dorks, and land fetch/put effects.
fn is_ramp(text: &CardText) -> bool {
    (text.type_has("artifact") && text.oracle_has("add {"))
        || text.oracle_has("search your library for a land")
        || text.oracle_has("search your library for a basic land")
        || (text.oracle_has("search your library for up to") && text.oracle_has("land"))
        || (text.type_has("creature") && text.oracle_has("{t}: add"))
        || text.oracle_has("put a land card from your hand onto the battlefield")
        || text.oracle_has("you may put a land card")
}

/// Single-target removal. The trailing exclusion guards against
/// mass-removal phrasing sneaking in through the "target" checks.
fn is_target_removal(text: &CardText) -> bool {
    let targeted = (text.oracle_has("destroy target") && !text.oracle_has("destroy all"))
        || (text.oracle_has("exile target") && !text.oracle_has("exile all"))
        || text.oracle_has("damage to target")
        || text.oracle_has("damage to any target")
        || (text.oracle_has("return target") && text.oracle_has("to its owner"))
        || (text.oracle_has("target") && text.oracle_has("gets -"));

    targeted && !(text.oracle_has("destroy all") || text.oracle_has("each creature"))
}

fn is_board_wipe(text: &CardText) -> bool {
    text.oracle_has_any(&[
        "destroy all creatures",
        "destroy all nonland permanents",
        "destroy all permanents",
        "each creature gets -",
        "all creatures get -",
        "exile all creatures",
    ]) || (text.oracle_has("each creature") && text.oracle_has("destroy"))
}

fn is_card_draw(text: &CardText) -> bool {
    text.oracle_has_any(&[
        "draw a card",
        "draw two cards",
        "draw three cards",
        "draw cards equal to",
        "draw that many cards",
    ]) || (text.oracle_has("draw") && text.oracle_has("card"))
}

fn is_protection(text: &CardText) -> bool {
    text.oracle_has_any(&[
        "hexproof",
        "indestructible",
        "protection from",
        "shroud",
        "ward",
        "prevent all damage",
    ]) || (text.oracle_has("counter target") && text.oracle_has("spell"))
}

fn is_tutor(text: &CardText) -> bool {
    text.oracle_has("search your library for a card")
        || (text.oracle_has("search your library for an") && !text.oracle_has("land"))
        || (text.oracle_has("search your library")
            && text.oracle_has_any(&[
                "creature",
                "artifact",
                "enchantment",
                "instant",
                "sorcery",
            ]))
}

fn is_wincon(text: &CardText) -> bool {
    text.oracle_has("you win the game")
        || (text.oracle_has("deals damage to any target") && text.oracle_has("50"))
        || text.oracle_has("infinite")
        || (text.type_has("planeswalker") && text.oracle_has("emblem"))
}
