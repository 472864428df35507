//! HTML heuristics.
//!
//! Applied in a fixed order; each step is independent and may or may not
//! fire. None of this parses markup: tag balance is a count, and the final
//! re-indent is a running counter that misindents inline elements or
//! several tags per line.

use super::{FixOutcome, SyntaxHeuristic};
use crate::models::{kind, Finding};
use regex::Regex;
use std::collections::HashSet;

const VOID_PREFIXES: [&str; 6] = ["<br", "<hr", "<img", "<input", "<link", "<meta"];

pub struct HtmlHeuristic {
    charset: Regex,
    head: Regex,
    div_open: Regex,
    div_close: Regex,
    script_open: Regex,
    script_close: Regex,
    unquoted_attr: Regex,
    id_attr: Regex,
    stray_char: Regex,
}

impl Default for HtmlHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlHeuristic {
    pub fn new() -> Self {
        let re = |p: &str| Regex::new(p).expect("valid html pattern");
        HtmlHeuristic {
            charset: re(r#"(?i)<meta[^>]*charset="UTF-8""#),
            head: re(r"(?i)<head>"),
            div_open: re(r"(?i)<div[^>]*>"),
            div_close: re(r"(?i)</div>"),
            script_open: re(r"(?i)<script[^>]*>"),
            script_close: re(r"(?i)</script>"),
            unquoted_attr: re(r#"(?i)(src|href)=([A-Za-z0-9_][^\s>"']+)"#),
            id_attr: re(r#"id="([^"]+)""#),
            stray_char: re(r"\n\s*[A-Za-z0-9_]\s*\n"),
        }
    }

    /// Append closing tags when openers outnumber closers.
    fn balance(
        content: &mut String,
        open: &Regex,
        close: &Regex,
        tag: &str,
        findings: &mut Vec<Finding>,
    ) {
        let opens = open.find_iter(content).count();
        let closes = close.find_iter(content).count();
        if opens > closes {
            let missing = opens - closes;
            let closer = format!("</{}>", tag);
            content.push_str(&closer.repeat(missing));
            findings.push(Finding::fixed(
                kind::UNCLOSED_TAG,
                format!("added {} missing {} tag(s)", missing, closer),
            ));
        }
    }
}

impl SyntaxHeuristic for HtmlHeuristic {
    fn language(&self) -> &'static str {
        "HTML"
    }

    fn apply(&self, content: &str) -> FixOutcome {
        let mut out = content.to_string();
        let mut findings = Vec::new();

        if !self.charset.is_match(&out) && self.head.is_match(&out) {
            out = self
                .head
                .replace(&out, "<head>\n  <meta charset=\"UTF-8\">")
                .into_owned();
            findings.push(Finding::fixed(
                kind::MISSING_CHARSET,
                "added charset=\"UTF-8\" meta tag",
            ));
        }

        Self::balance(&mut out, &self.div_open, &self.div_close, "div", &mut findings);
        Self::balance(
            &mut out,
            &self.script_open,
            &self.script_close,
            "script",
            &mut findings,
        );

        if self.unquoted_attr.is_match(&out) {
            out = self
                .unquoted_attr
                .replace_all(&out, r#"${1}="${2}""#)
                .into_owned();
            findings.push(Finding::fixed(
                kind::UNQUOTED_ATTRIBUTE,
                "quoted unquoted src/href attribute values",
            ));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for cap in self.id_attr.captures_iter(&out) {
            let id = cap.get(1).map_or("", |m| m.as_str());
            if !seen.insert(id) {
                findings.push(Finding::detected(
                    kind::DUPLICATE_ID,
                    format!("duplicate id: {}", id),
                ));
            }
        }

        if self.stray_char.is_match(&out) {
            out = self.stray_char.replacen(&out, 1, "\n").into_owned();
            findings.push(Finding::fixed(
                kind::STRAY_CHARACTER,
                "removed stray character",
            ));
        }

        if out.contains("</html>``") {
            out = out.replacen("</html>``", "</html>", 1);
            findings.push(Finding::fixed(
                kind::EXTRA_BACKTICKS,
                "removed extra backticks after </html>",
            ));
        }

        let outcome = FixOutcome {
            content: out,
            findings,
        };
        if outcome.changed() {
            FixOutcome {
                content: reindent(&outcome.content),
                findings: outcome.findings,
            }
        } else {
            outcome
        }
    }
}

fn opens_level(trimmed: &str) -> bool {
    trimmed.starts_with('<')
        && !trimmed.starts_with("</")
        && !trimmed.ends_with("/>")
        && !VOID_PREFIXES.iter().any(|p| trimmed.starts_with(p))
}

/// Flat re-indent: two spaces per level from a single running counter.
pub fn reindent(content: &str) -> String {
    let mut level = 0usize;
    content
        .split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with("</") {
                level = level.saturating_sub(1);
            }
            let indented = format!("{}{}", "  ".repeat(level), trimmed);
            if opens_level(trimmed) {
                level += 1;
            }
            indented
        })
        .collect::<Vec<_>>()
        .join("\n")
}
