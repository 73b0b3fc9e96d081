//! Template and bracket data store.
//!
//! Category templates, bracket rules, and bracket card lists ship embedded
//! in the binary. Users can override any of them with files in the data
//! directory:
//!
//! - `<data-dir>/templates/<id>.json` - a single template
//! - `<data-dir>/brackets/<id>.json` - a single bracket's rules
//! - `<data-dir>/brackets/<id>.lists.json` - a single bracket's card lists
//!
//! Loaded data is cached for the process lifetime. The caches are explicit
//! members of the store (injected via `DataContext`), never module-level
//! globals, so tests can point a store at fixture files. Cache population
//! is idempotent, so concurrent first-access races are benign.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::models::{BracketCardLists, BracketRules, Template};
use crate::{Error, Result};

const EMBEDDED_TEMPLATES: &str = include_str!("embedded/templates.json");
const EMBEDDED_BRACKETS: &str = include_str!("embedded/brackets.json");
const EMBEDDED_BRACKET_LISTS: &str = include_str!("embedded/bracket_lists.json");

/// The template id every unknown-template request falls back to.
pub const FALLBACK_TEMPLATE_ID: &str = "default";

/// A resolved template, flagged when it is the fallback rather than the
/// requested one so the caller can emit a warning note.
#[derive(Debug, Clone)]
pub struct TemplateResolution {
    pub template: Arc<Template>,
    /// True when the requested id was unknown and `default` was substituted.
    pub fallback: bool,
}

/// Process-lifetime store for templates, bracket rules, and bracket card
/// lists, with lazy per-id caching.
pub struct TemplateStore {
    data_dir: PathBuf,
    templates: Mutex<HashMap<String, Arc<Template>>>,
    brackets: Mutex<HashMap<String, Option<Arc<BracketRules>>>>,
    lists: Mutex<HashMap<String, Option<Arc<BracketCardLists>>>>,
}

impl TemplateStore {
    pub fn open(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            templates: Mutex::new(HashMap::new()),
            brackets: Mutex::new(HashMap::new()),
            lists: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a template by id.
    ///
    /// Lookup order: cache, user override file, embedded set. An unknown id
    /// resolves to the `default` template with the `fallback` flag set; a
    /// malformed override or a missing `default` template is a fatal
    /// data-load error.
    pub fn template(&self, id: &str) -> Result<TemplateResolution> {
        if let Some(template) = self.cached_template(id) {
            return Ok(TemplateResolution {
                template,
                fallback: false,
            });
        }

        if let Some(template) = self.load_template(id)? {
            let template = Arc::new(template);
            self.templates
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(id.to_string(), Arc::clone(&template));
            return Ok(TemplateResolution {
                template,
                fallback: false,
            });
        }

        if id == FALLBACK_TEMPLATE_ID {
            return Err(Error::DataLoad {
                kind: "template",
                id: id.to_string(),
                reason: "fallback template missing from embedded data".to_string(),
            });
        }

        let fallback = self.template(FALLBACK_TEMPLATE_ID)?;
        Ok(TemplateResolution {
            template: fallback.template,
            fallback: true,
        })
    }

    /// Bracket rules by id; `None` when the bracket is unknown. A malformed
    /// override file is reported to stderr and skipped in favor of the
    /// embedded data, since missing bracket data only disables bracket
    /// checks.
    pub fn bracket_rules(&self, id: &str) -> Option<Arc<BracketRules>> {
        if let Some(cached) = self
            .brackets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
        {
            return cached.clone();
        }

        let loaded = self
            .load_override::<BracketRules>(&self.bracket_path(id))
            .or_else(|| self.embedded_bracket(id))
            .map(Arc::new);
        self.brackets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.to_string(), loaded.clone());
        loaded
    }

    /// Bracket card lists by id; `None` when the bracket has no lists.
    pub fn bracket_card_lists(&self, id: &str) -> Option<Arc<BracketCardLists>> {
        if let Some(cached) = self
            .lists
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
        {
            return cached.clone();
        }

        let path = self.data_dir.join("brackets").join(format!("{}.lists.json", id));
        let loaded = self
            .load_override::<BracketCardLists>(&path)
            .or_else(|| self.embedded_lists(id))
            .map(Arc::new);
        self.lists
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.to_string(), loaded.clone());
        loaded
    }

    fn cached_template(&self, id: &str) -> Option<Arc<Template>> {
        self.templates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    /// Load a template from override file or embedded data; `Ok(None)` means
    /// the id is simply unknown.
    fn load_template(&self, id: &str) -> Result<Option<Template>> {
        let path = self.data_dir.join("templates").join(format!("{}.json", id));
        if path.exists() {
            let text = fs::read_to_string(&path)?;
            let template: Template =
                serde_json::from_str(&text).map_err(|e| Error::DataLoad {
                    kind: "template",
                    id: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            return Ok(Some(template));
        }

        let embedded: Vec<Template> =
            serde_json::from_str(EMBEDDED_TEMPLATES).map_err(|e| Error::DataLoad {
                kind: "template",
                id: "embedded".to_string(),
                reason: e.to_string(),
            })?;
        Ok(embedded.into_iter().find(|t| t.id == id))
    }

    fn bracket_path(&self, id: &str) -> PathBuf {
        self.data_dir.join("brackets").join(format!("{}.json", id))
    }

    fn load_override<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Option<T> {
        if !path.exists() {
            return None;
        }
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Warning: failed to read {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                eprintln!("Warning: ignoring malformed {}: {}", path.display(), e);
                None
            }
        }
    }

    fn embedded_bracket(&self, id: &str) -> Option<BracketRules> {
        let brackets: Vec<BracketRules> = serde_json::from_str(EMBEDDED_BRACKETS).ok()?;
        brackets.into_iter().find(|b| b.id == id)
    }

    fn embedded_lists(&self, id: &str) -> Option<BracketCardLists> {
        let mut all: HashMap<String, BracketCardLists> =
            serde_json::from_str(EMBEDDED_BRACKET_LISTS).ok()?;
        all.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store() -> (TempDir, TemplateStore) {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::open(dir.path());
        (dir, store)
    }

    #[test]
    fn test_embedded_bracket3_template_resolves() {
        let (_dir, store) = store();
        let resolved = store.template("bracket3").unwrap();
        assert!(!resolved.fallback);
        assert_eq!(resolved.template.id, "bracket3");
        let lands = resolved.template.category("lands").unwrap();
        assert_eq!(lands.min, Some(35));
        assert_eq!(lands.max, Some(38));
    }

    #[test]
    fn test_unknown_template_falls_back_to_default() {
        let (_dir, store) = store();
        let resolved = store.template("no-such-template").unwrap();
        assert!(resolved.fallback);
        assert_eq!(resolved.template.id, "default");
    }

    #[test]
    fn test_template_override_file_wins() {
        let (dir, store) = store();
        let templates_dir = dir.path().join("templates");
        fs::create_dir_all(&templates_dir).unwrap();
        fs::write(
            templates_dir.join("bracket3.json"),
            r#"{"id": "bracket3", "categories": [{"name": "lands", "min": 30, "max": 33}]}"#,
        )
        .unwrap();

        let resolved = store.template("bracket3").unwrap();
        assert_eq!(resolved.template.category("lands").unwrap().min, Some(30));
    }

    #[test]
    fn test_malformed_template_override_is_fatal() {
        let (dir, store) = store();
        let templates_dir = dir.path().join("templates");
        fs::create_dir_all(&templates_dir).unwrap();
        fs::write(templates_dir.join("bracket3.json"), "not json").unwrap();
        assert!(store.template("bracket3").is_err());
    }

    #[test]
    fn test_bracket_rules_resolve_and_cache() {
        let (_dir, store) = store();
        let rules = store.bracket_rules("bracket3").unwrap();
        assert_eq!(rules.max_game_changers, 3);
        assert!(!rules.allow_mass_land_denial);
        assert!(rules.max_extra_turn_cards.is_none());

        // Second call hits the cache and yields the same data.
        let again = store.bracket_rules("bracket3").unwrap();
        assert_eq!(again.id, rules.id);
    }

    #[test]
    fn test_unknown_bracket_is_none() {
        let (_dir, store) = store();
        assert!(store.bracket_rules("bracket9").is_none());
        assert!(store.bracket_card_lists("bracket9").is_none());
    }

    #[test]
    fn test_bracket_card_lists_membership() {
        let (_dir, store) = store();
        let lists = store.bracket_card_lists("bracket3").unwrap();
        assert!(lists.is_game_changer("Rhystic Study"));
        assert!(lists.is_mass_land_denial("armageddon"));
        assert!(lists.is_extra_turn("Time Warp"));
        assert!(!lists.is_game_changer("Sol Ring"));
    }

    #[test]
    fn test_malformed_bracket_override_degrades_to_embedded() {
        let (dir, store) = store();
        let brackets_dir = dir.path().join("brackets");
        fs::create_dir_all(&brackets_dir).unwrap();
        fs::write(brackets_dir.join("bracket3.json"), "not json").unwrap();

        // Malformed bracket data only disables the override, not the bracket.
        let rules = store.bracket_rules("bracket3").unwrap();
        assert_eq!(rules.max_game_changers, 3);
    }
}
