//! Decklist text parsing and rendering.
//!
//! The accepted line format is `<quantity> <name>`, with an optional `x`
//! suffix on the quantity (`3x Island`). A line that is blank, a comment
//! (`//` or `#`), or otherwise unparseable is ignored rather than rejected;
//! a bare card name counts as quantity 1.

use crate::models::{BuiltDeck, ParsedDeck, ParsedDeckEntry};

/// Parse decklist text into entries, one per recognized line.
pub fn parse(text: &str) -> ParsedDeck {
    let mut entries = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
            continue;
        }

        if let Some(entry) = parse_line(line) {
            entries.push(entry);
        }
    }

    ParsedDeck { entries }
}

/// Parse a single trimmed, non-comment line.
fn parse_line(line: &str) -> Option<ParsedDeckEntry> {
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        // A bare name with no quantity prefix counts as one copy.
        None => {
            return Some(ParsedDeckEntry {
                quantity: 1,
                name: line.to_string(),
            });
        }
    };

    let qty_str = head.strip_suffix(['x', 'X']).unwrap_or(head);
    match qty_str.parse::<u32>() {
        Ok(qty) if qty > 0 && !rest.is_empty() => Some(ParsedDeckEntry {
            quantity: qty,
            name: rest.to_string(),
        }),
        // Zero quantities and empty names are dropped.
        Ok(_) => None,
        // Head wasn't a quantity; treat the whole line as one copy of a name.
        Err(_) => Some(ParsedDeckEntry {
            quantity: 1,
            name: line.to_string(),
        }),
    }
}

/// Render a built deck as decklist text, one `<quantity> <name>` line per
/// entry, so re-parsing yields the same totals.
pub fn flatten(deck: &BuiltDeck) -> String {
    let mut out = String::new();
    for entry in &deck.entries {
        out.push_str(&format!("{} {}\n", entry.quantity, entry.name));
    }
    out
}
