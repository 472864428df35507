//! CSS heuristics.
//!
//! A lexical guess at unterminated declarations. The line pass only runs
//! when some line break follows a character other than `}` or `;`, so a
//! single-line file is never touched. A line with a `:` is never touched
//! either, so a genuinely unclosed rule such as `b{color:blue` slips
//! through, while selector continuation lines (`h1,`) pick up a stray `;`.

use super::{FixOutcome, SyntaxHeuristic};
use crate::models::{kind, Finding};
use regex::Regex;

pub struct CssHeuristic {
    open_line_end: Regex,
}

impl Default for CssHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl CssHeuristic {
    pub fn new() -> Self {
        CssHeuristic {
            open_line_end: Regex::new(r"[^};]\s*\n\s*\S").expect("valid css pattern"),
        }
    }
}

fn looks_unterminated(trimmed: &str) -> bool {
    !trimmed.is_empty()
        && !trimmed.ends_with(';')
        && !trimmed.ends_with('{')
        && !trimmed.ends_with('}')
        && !trimmed.contains(':')
        && !trimmed.starts_with("/*")
        && !trimmed.ends_with("*/")
}

impl SyntaxHeuristic for CssHeuristic {
    fn language(&self) -> &'static str {
        "CSS"
    }

    fn apply(&self, content: &str) -> FixOutcome {
        if !self.open_line_end.is_match(content) {
            return FixOutcome::unchanged(content);
        }
        let mut touched = 0usize;
        let lines: Vec<String> = content
            .split('\n')
            .map(|line| {
                let trimmed = line.trim();
                if looks_unterminated(trimmed) {
                    touched += 1;
                    format!("{};", trimmed)
                } else {
                    line.to_string()
                }
            })
            .collect();

        if touched == 0 {
            return FixOutcome::unchanged(content);
        }
        FixOutcome {
            content: reindent(&lines.join("\n")),
            findings: vec![Finding::fixed(
                kind::MISSING_SEMICOLON,
                format!("added semicolons to {} unterminated line(s)", touched),
            )],
        }
    }
}

/// Brace-driven re-indent, two spaces per level.
pub fn reindent(content: &str) -> String {
    let mut level = 0usize;
    content
        .split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.ends_with('}') {
                level = level.saturating_sub(1);
            }
            let indented = format!("{}{}", "  ".repeat(level), trimmed);
            if trimmed.ends_with('{') {
                level += 1;
            }
            indented
        })
        .collect::<Vec<_>>()
        .join("\n")
}
