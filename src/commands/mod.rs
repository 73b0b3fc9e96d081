//! Command implementations for the Deckhand CLI.
//!
//! Each command returns a value implementing [`CommandResult`]; main picks
//! JSON or human formatting based on the -H flag. The business logic lives
//! in the library modules; this layer only wires inputs and renders output.

use std::io::Read;
use std::path::Path;

use crate::builder;
use crate::decklist;
use crate::edhrec::EdhrecClient;
use crate::models::roles::{self, RoleSet};
use crate::models::{
    AnalyzeInput, BuildInput, BuildResult, CategorySummary, ColorIdentity, DeckAnalysis,
};
use crate::{DataContext, Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json_or_error<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "serialization failed: {}"}}"#, e))
}

/// Run the analyze command. Reads the decklist from `file`, or stdin when
/// no file is given.
pub fn analyze(
    ctx: &DataContext,
    file: Option<&Path>,
    template: Option<String>,
    bracket: Option<String>,
    commander: Option<String>,
) -> Result<DeckAnalysis> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let deck = decklist::parse(&text);
    let input = AnalyzeInput {
        commander,
        template,
        bracket,
        ..Default::default()
    };
    crate::analyzer::analyze(ctx, &input, &deck)
}

/// Run the build command against the configured EDHREC endpoint.
pub fn build(ctx: &DataContext, input: &BuildInput) -> Result<BuildResult> {
    let client = EdhrecClient::new(ctx.config.edhrec_base_url());
    builder::build(ctx, &client, input)
}

/// A card record plus its classified roles, for `dh card`.
#[derive(Debug, serde::Serialize)]
pub struct CardReport {
    pub name: String,
    pub type_line: String,
    pub oracle_text: String,
    pub color_identity: ColorIdentity,
    pub roles: RoleSet,
}

/// Run the card command.
pub fn card(ctx: &DataContext, name: &str) -> Result<CardReport> {
    let card = ctx
        .cards
        .lookup(name)
        .ok_or_else(|| Error::InvalidInput(format!("card not found: {}", name)))?;
    Ok(CardReport {
        name: card.name.clone(),
        type_line: card.type_line.clone(),
        oracle_text: card.oracle_text.clone(),
        color_identity: card.color_identity.clone(),
        roles: roles::classify(Some(card)),
    })
}

fn format_category_line(summary: &CategorySummary) -> String {
    let range = match (summary.min, summary.max) {
        (Some(min), Some(max)) => format!("[{}-{}]", min, max),
        (Some(min), None) => format!("[{}+]", min),
        (None, Some(max)) => format!("[-{}]", max),
        (None, None) => "[-]".to_string(),
    };
    format!(
        "  {:<16} {:>3}  {:<8} {}",
        summary.name, summary.count, range, summary.status
    )
}

fn format_analysis(analysis: &DeckAnalysis, out: &mut String) {
    if let Some(commander) = &analysis.commander {
        out.push_str(&format!("Commander: {}\n", commander));
    }
    out.push_str(&format!("Template: {}\n", analysis.template));
    if let Some(label) = &analysis.bracket_label {
        out.push_str(&format!("Bracket: {}\n", label));
    }
    out.push_str(&format!(
        "Cards: {} total, {} unique\n",
        analysis.total_cards, analysis.unique_cards
    ));
    out.push_str("\nCategories:\n");
    for summary in &analysis.categories {
        out.push_str(&format_category_line(summary));
        out.push('\n');
    }
    if !analysis.notes.is_empty() {
        out.push_str("\nNotes:\n");
        for note in &analysis.notes {
            out.push_str(&format!("  - {}\n", note));
        }
    }
    if !analysis.bracket_warnings.is_empty() {
        out.push_str("\nBracket warnings:\n");
        for warning in &analysis.bracket_warnings {
            out.push_str(&format!("  - {}\n", warning));
        }
    }
}

impl CommandResult for DeckAnalysis {
    fn to_json(&self) -> String {
        json_or_error(self)
    }

    fn to_human(&self) -> String {
        let mut out = String::new();
        format_analysis(self, &mut out);
        out
    }
}

impl CommandResult for BuildResult {
    fn to_json(&self) -> String {
        json_or_error(self)
    }

    fn to_human(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Commander: {}\n", self.commander));
        out.push_str(&format!("Colors: {}\n", self.color_identity));
        out.push_str(&format!(
            "Deck: {} cards\n\n",
            self.deck.total_cards()
        ));
        for entry in &self.deck.entries {
            out.push_str(&format!("{} {}\n", entry.quantity, entry.name));
        }
        if !self.notes.is_empty() {
            out.push_str("\nNotes:\n");
            for note in &self.notes {
                out.push_str(&format!("  - {}\n", note));
            }
        }
        out.push('\n');
        format_analysis(&self.analysis, &mut out);
        out
    }
}

impl CommandResult for CardReport {
    fn to_json(&self) -> String {
        json_or_error(self)
    }

    fn to_human(&self) -> String {
        let roles = self
            .roles
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{}\n{}\nColors: {}\nRoles: {}\n\n{}\n",
            self.name, self.type_line, self.color_identity, roles, self.oracle_text
        )
    }
}
