//! The bundled card database.
//!
//! A curated set of Commander staples is compiled into the binary as JSON.
//! Users can layer their own `cards.json` in the data directory on top;
//! override records win by case-insensitive name. Lookup is exact-name,
//! case-insensitive, via a pre-built lowercase index. When duplicate names
//! survive a merge, the first (canonical) record wins.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::models::Card;
use crate::{Error, Result};

/// Card records compiled into the binary.
const EMBEDDED_CARDS: &str = include_str!("embedded/cards.json");

/// Read-only card database, built once per process and shared.
pub struct CardDb {
    cards: Vec<Card>,
    /// lowercase name -> index into `cards`; first-seen wins
    index: HashMap<String, usize>,
}

impl CardDb {
    /// Load the embedded database, then merge `<data_dir>/cards.json` over
    /// it if present. A missing override file is fine; a malformed one is a
    /// fatal data-load error.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let mut cards: Vec<Card> =
            serde_json::from_str(EMBEDDED_CARDS).map_err(|e| Error::DataLoad {
                kind: "card database",
                id: "embedded".to_string(),
                reason: e.to_string(),
            })?;

        let override_path = data_dir.join("cards.json");
        if override_path.exists() {
            let text = fs::read_to_string(&override_path)?;
            let overrides: Vec<Card> = serde_json::from_str(&text).map_err(|e| Error::DataLoad {
                kind: "card database",
                id: override_path.display().to_string(),
                reason: e.to_string(),
            })?;
            for card in overrides {
                let key = card.name.trim().to_lowercase();
                match cards
                    .iter_mut()
                    .find(|c| c.name.trim().to_lowercase() == key)
                {
                    Some(existing) => *existing = card,
                    None => cards.push(card),
                }
            }
        }

        Ok(Self::from_cards(cards))
    }

    /// Build a database from in-memory records (used by tests).
    pub fn from_cards(cards: Vec<Card>) -> Self {
        let mut index = HashMap::with_capacity(cards.len());
        for (i, card) in cards.iter().enumerate() {
            index
                .entry(card.name.trim().to_lowercase())
                .or_insert(i);
        }
        Self { cards, index }
    }

    /// Case-insensitive exact-name lookup.
    pub fn lookup(&self, name: &str) -> Option<&Card> {
        self.index
            .get(&name.trim().to_lowercase())
            .map(|&i| &self.cards[i])
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_database_parses() {
        let dir = TempDir::new().unwrap();
        let db = CardDb::open(dir.path()).unwrap();
        assert!(db.len() > 100);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let db = CardDb::open(dir.path()).unwrap();
        let card = db.lookup("sol ring").expect("Sol Ring in embedded set");
        assert_eq!(card.name, "Sol Ring");
        assert!(db.lookup("  SOL RING  ").is_some());
    }

    #[test]
    fn test_lookup_unknown_is_none() {
        let dir = TempDir::new().unwrap();
        let db = CardDb::open(dir.path()).unwrap();
        assert!(db.lookup("Definitely Not A Card").is_none());
    }

    #[test]
    fn test_override_file_wins_by_name() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("cards.json"),
            r#"[
                {"name": "Sol Ring", "type_line": "Artifact", "oracle_text": "House-modified text.", "color_identity": []},
                {"name": "Homebrew Dragon", "type_line": "Creature — Dragon", "oracle_text": "Flying", "color_identity": ["R"]}
            ]"#,
        )
        .unwrap();

        let db = CardDb::open(dir.path()).unwrap();
        assert_eq!(db.lookup("Sol Ring").unwrap().oracle_text, "House-modified text.");
        assert!(db.lookup("Homebrew Dragon").is_some());
    }

    #[test]
    fn test_malformed_override_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("cards.json"), "not json").unwrap();
        assert!(CardDb::open(dir.path()).is_err());
    }

    #[test]
    fn test_duplicate_names_first_record_wins() {
        let cards = vec![
            Card {
                name: "Twin".to_string(),
                type_line: "Instant".to_string(),
                oracle_text: "First printing.".to_string(),
                color_identity: Default::default(),
            },
            Card {
                name: "twin".to_string(),
                type_line: "Sorcery".to_string(),
                oracle_text: "Second printing.".to_string(),
                color_identity: Default::default(),
            },
        ];
        let db = CardDb::from_cards(cards);
        assert_eq!(db.lookup("TWIN").unwrap().oracle_text, "First printing.");
    }
}
