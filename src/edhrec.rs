//! EDHREC recommendation fetching.
//!
//! Deck building consults two EDHREC JSON endpoints: the top cards for a
//! color combination and the top lands for the same combination. The
//! endpoints serve two different document shapes depending on page age, so
//! the response type is an untagged enum covering both.
//!
//! Everything network-facing hides behind [`RecommendationSource`] so the
//! builder (and its tests) never depend on a live endpoint.

use serde::Deserialize;
use thiserror::Error;

use crate::models::{ColorIdentity, Suggestion};

/// User-Agent header sent with every request.
const USER_AGENT: &str = "deckhand-cli";

/// Errors that can occur while fetching recommendations.
///
/// All of these are non-fatal to a build; the builder degrades to a note
/// and continues without suggestions.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Endpoint returned a non-success status.
    #[error("EDHREC returned HTTP {0} for {1}")]
    Status(u16, String),

    /// Network or transport failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Response body did not match either known document shape.
    #[error("Failed to parse EDHREC response: {0}")]
    Parse(String),
}

/// A source of card suggestions for a color combination.
///
/// The production implementation is [`EdhrecClient`]; tests substitute a
/// scripted source.
pub trait RecommendationSource: Sync {
    /// Top cards played in decks of this color combination, best first.
    fn top_cards(&self, colors: &ColorIdentity, limit: u32) -> Result<Vec<Suggestion>, FetchError>;

    /// Top nonbasic lands for this color combination, best first.
    fn top_lands(&self, colors: &ColorIdentity, limit: u32) -> Result<Vec<Suggestion>, FetchError>;
}

/// Blocking EDHREC client over the JSON page endpoints.
pub struct EdhrecClient {
    base_url: String,
}

impl EdhrecClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn fetch_page(&self, path: &str, source: &str, limit: u32) -> Result<Vec<Suggestion>, FetchError> {
        let url = format!("{}/pages/{}.json", self.base_url, path);

        let response = ureq::get(&url).set("User-Agent", USER_AGENT).call();
        let doc: RecommendationDoc = match response {
            Ok(resp) => resp
                .into_json()
                .map_err(|e| FetchError::Parse(e.to_string()))?,
            Err(ureq::Error::Status(code, _)) => return Err(FetchError::Status(code, url)),
            Err(e) => return Err(FetchError::Http(e.to_string())),
        };

        Ok(doc.into_suggestions(source, limit))
    }
}

impl RecommendationSource for EdhrecClient {
    fn top_cards(&self, colors: &ColorIdentity, limit: u32) -> Result<Vec<Suggestion>, FetchError> {
        let path = format!("commanders/{}", colors_page_id(colors));
        self.fetch_page(&path, "top_cards", limit)
    }

    fn top_lands(&self, colors: &ColorIdentity, limit: u32) -> Result<Vec<Suggestion>, FetchError> {
        let path = format!("lands/{}", colors_page_id(colors));
        self.fetch_page(&path, "top_lands", limit)
    }
}

/// EDHREC page id for a color combination: lowercase letters in WUBRG
/// order, or "colorless".
pub fn colors_page_id(colors: &ColorIdentity) -> String {
    if colors.is_colorless() {
        return "colorless".to_string();
    }
    colors
        .colors()
        .iter()
        .map(|c| c.letter().to_ascii_lowercase())
        .collect()
}

/// An EDHREC page document. Newer pages nest card lists inside a
/// `container`; older ones carry a flat `cardlist`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecommendationDoc {
    Paged { container: Container },
    Flat { cardlist: Vec<CardView> },
}

#[derive(Debug, Deserialize)]
pub struct Container {
    pub json_dict: JsonDict,
}

#[derive(Debug, Deserialize)]
pub struct JsonDict {
    pub cardlists: Vec<CardList>,
}

#[derive(Debug, Deserialize)]
pub struct CardList {
    #[serde(default)]
    pub header: String,
    pub cardviews: Vec<CardView>,
}

/// One recommended card as it appears on an EDHREC page.
#[derive(Debug, Deserialize)]
pub struct CardView {
    pub name: String,
    #[serde(default)]
    pub salt: Option<f64>,
    #[serde(default)]
    pub synergy: Option<f64>,
}

impl RecommendationDoc {
    /// Flatten into ranked suggestions, list order preserved, truncated to
    /// `limit`.
    fn into_suggestions(self, source: &str, limit: u32) -> Vec<Suggestion> {
        let views: Vec<CardView> = match self {
            RecommendationDoc::Paged { container } => container
                .json_dict
                .cardlists
                .into_iter()
                .flat_map(|list| list.cardviews)
                .collect(),
            RecommendationDoc::Flat { cardlist } => cardlist,
        };

        views
            .into_iter()
            .take(limit as usize)
            .enumerate()
            .map(|(i, view)| Suggestion {
                name: view.name,
                rank: Some(i as u32 + 1),
                salt: view.salt,
                synergy: view.synergy,
                source: source.to_string(),
            })
            .collect()
    }
}

/// Merge suggestion lists, first occurrence of a name (case-insensitive)
/// wins, order preserved.
pub fn merge_suggestions(lists: Vec<Vec<Suggestion>>) -> Vec<Suggestion> {
    let mut seen = std::collections::HashSet::new();
    let mut merged = Vec::new();
    for list in lists {
        for suggestion in list {
            if seen.insert(suggestion.name.trim().to_lowercase()) {
                merged.push(suggestion);
            }
        }
    }
    merged
}
