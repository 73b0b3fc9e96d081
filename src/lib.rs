//! Deckhand - a Commander decklist analysis and building library.
//!
//! This library provides the core functionality for the `dh` CLI tool:
//! role classification of cards, template-based deck analysis, bracket
//! rule checks, and skeleton deck building with recommendation autofill.

pub mod analyzer;
pub mod builder;
pub mod carddb;
pub mod cli;
pub mod commands;
pub mod config;
pub mod decklist;
pub mod edhrec;
pub mod mcp;
pub mod models;
pub mod templates;

use std::path::{Path, PathBuf};

use crate::carddb::CardDb;
use crate::config::DeckhandConfig;
use crate::templates::TemplateStore;

/// Library-level error type for Deckhand operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Commander not found: {0}")]
    CommanderNotFound(String),

    #[error("Failed to load {kind} '{id}': {reason}")]
    DataLoad {
        kind: &'static str,
        id: String,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Deckhand operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Shared read-only data context for a process.
///
/// Owns the user config, the card database, and the template/bracket store.
/// Built once per process (or per test) and passed by reference into the
/// analyzer and builder, so tests can inject fixture data instead of the
/// bundled files.
pub struct DataContext {
    pub config: DeckhandConfig,
    pub cards: CardDb,
    pub templates: TemplateStore,
}

impl DataContext {
    /// Build a context rooted at the given data directory.
    ///
    /// The card database and template store layer user files in `data_dir`
    /// over the embedded defaults. A missing or empty data directory is
    /// fine; the embedded data alone is a complete working set.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let config = DeckhandConfig::load(data_dir)?;
        let cards = CardDb::open(data_dir)?;
        let templates = TemplateStore::open(data_dir);
        Ok(Self {
            config,
            cards,
            templates,
        })
    }

    /// Resolve the data directory: explicit flag > DH_DATA_DIR env >
    /// `~/.local/share/deckhand`.
    pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
        if let Some(dir) = explicit {
            return dir;
        }
        if let Ok(dir) = std::env::var("DH_DATA_DIR") {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("deckhand")
    }
}
