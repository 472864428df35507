//! JavaScript heuristics.
//!
//! Pattern matchers, not a parser. The if-brace rewrite wraps exactly one
//! following line, so multi-statement or nested bodies come out wrong; the
//! shorthand expansion only ever touches the first `JSON.stringify({...})`
//! body in a file.

use super::{FixOutcome, SyntaxHeuristic};
use crate::models::{kind, Finding};
use regex::Regex;
use std::collections::HashSet;

const JSON_HEADER_FIXED: &str = "'Content-Type': 'application/json'}";

pub struct JsHeuristic {
    if_head: Regex,
    trailing_comma: Regex,
    stringify_body: Regex,
    function_decl: Regex,
}

impl Default for JsHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl JsHeuristic {
    pub fn new() -> Self {
        let re = |p: &str| Regex::new(p).expect("valid js pattern");
        JsHeuristic {
            if_head: re(r"\bif\s*\([^)]*\)"),
            trailing_comma: re(r"'Content-Type': 'application/json',\s*\}"),
            stringify_body: re(r"body:\s*JSON\.stringify\(\{\s*([^}]*)\}\s*\)"),
            function_decl: re(r"function\s+([A-Za-z0-9_]+)\s*\("),
        }
    }

    /// Start offsets of `if (...)` heads whose next non-blank char is not `{`.
    fn braceless_ifs(&self, content: &str) -> Vec<usize> {
        self.if_head
            .find_iter(content)
            .filter(|m| {
                content[m.end()..]
                    .chars()
                    .find(|c| !c.is_whitespace())
                    .is_some_and(|c| c != '{')
            })
            .map(|m| m.start())
            .collect()
    }

    fn add_if_braces(&self, content: &mut String, findings: &mut Vec<Finding>) {
        // Back to front so earlier offsets stay valid.
        for start in self.braceless_ifs(content).into_iter().rev() {
            let Some(offset) = content[start..].find('\n') else {
                continue;
            };
            let line_end = start + offset;
            content.insert_str(line_end, " {");
            let next_line = line_end + " {\n".len();
            match content[next_line..].find('\n') {
                Some(i) => content.insert_str(next_line + i, "\n}"),
                None => content.push_str("\n}"),
            }
            findings.push(Finding::fixed(
                kind::MISSING_IF_BRACES,
                "added braces to if statement",
            ));
        }
    }

    fn expand_shorthand(&self, content: &mut String, findings: &mut Vec<Finding>) {
        let Some(caps) = self.stringify_body.captures(content) else {
            return;
        };
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            return;
        };
        let range = whole.range();
        let segments: Vec<&str> = body.as_str().split(',').collect();
        let mut expanded = 0usize;
        let rewritten: Vec<String> = segments
            .iter()
            .enumerate()
            .map(|(i, seg)| {
                let name = seg.trim();
                // only comma-terminated entries qualify
                if i + 1 < segments.len() && is_identifier(name) {
                    expanded += 1;
                    let lead = &seg[..seg.len() - seg.trim_start().len()];
                    format!("{}{}: {}", lead, name, name)
                } else {
                    seg.to_string()
                }
            })
            .collect();
        if expanded == 0 {
            return;
        }
        let replacement = format!("body: JSON.stringify({{ {} }})", rewritten.join(",").trim());
        content.replace_range(range, &replacement);
        findings.push(Finding::fixed(
            kind::SHORTHAND_PROPERTY,
            format!("expanded {} shorthand propert(ies) in request body", expanded),
        ));
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl SyntaxHeuristic for JsHeuristic {
    fn language(&self) -> &'static str {
        "JavaScript"
    }

    fn apply(&self, content: &str) -> FixOutcome {
        let mut out = content.to_string();
        let mut findings = Vec::new();

        self.add_if_braces(&mut out, &mut findings);

        if self.trailing_comma.is_match(&out) {
            out = self
                .trailing_comma
                .replace_all(&out, JSON_HEADER_FIXED)
                .into_owned();
            findings.push(Finding::fixed(
                kind::TRAILING_COMMA,
                "removed trailing comma in request headers",
            ));
        }

        self.expand_shorthand(&mut out, &mut findings);

        let mut seen: HashSet<&str> = HashSet::new();
        for cap in self.function_decl.captures_iter(&out) {
            let name = cap.get(1).map_or("", |m| m.as_str());
            if !seen.insert(name) {
                findings.push(Finding::detected(
                    kind::DUPLICATE_FUNCTION,
                    format!("duplicate function definition: {}", name),
                ));
            }
        }

        FixOutcome {
            content: out,
            findings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_if_without_brace_wraps_next_line() {
        let js = JsHeuristic::new();
        let out = js.apply("if (ready)\n  go();\nstop();");
        assert_eq!(out.content, "if (ready) {\n  go();\n}\nstop();");
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].kind, kind::MISSING_IF_BRACES);
    }

    #[test]
    fn test_braced_if_is_untouched() {
        let js = JsHeuristic::new();
        let src = "if (a) {\n  b();\n}\nif (c)\n{\n  d();\n}\n";
        let out = js.apply(src);
        assert!(out.findings.is_empty());
        assert_eq!(out.content, src);
    }

    #[test]
    fn test_several_ifs_rewritten_back_to_front() {
        let js = JsHeuristic::new();
        let src = indoc! {"
            if (a)
              one();
            if (b)
              two();
            done();
        "};
        let expected = indoc! {"
            if (a) {
              one();
            }
            if (b) {
              two();
            }
            done();
        "};
        let out = js.apply(src);
        assert_eq!(out.content, expected);
        assert_eq!(out.findings.len(), 2);
    }

    #[test]
    fn test_if_on_last_line_is_skipped() {
        let js = JsHeuristic::new();
        let out = js.apply("if (a) b();");
        assert!(out.findings.is_empty());
    }

    #[test]
    fn test_body_on_final_line_closes_at_eof() {
        let js = JsHeuristic::new();
        let out = js.apply("if (a)\n  b();");
        assert_eq!(out.content, "if (a) {\n  b();\n}");
    }

    #[test]
    fn test_trailing_comma_in_headers_removed() {
        let js = JsHeuristic::new();
        let out = js.apply("fetch(u, { headers: {'Content-Type': 'application/json',\n } });");
        assert!(out
            .content
            .contains("{'Content-Type': 'application/json'} });"));
        assert_eq!(out.findings[0].kind, kind::TRAILING_COMMA);
    }

    #[test]
    fn test_shorthand_expanded_in_first_body_only() {
        let js = JsHeuristic::new();
        let src = indoc! {"
            login({ body: JSON.stringify({ username, password, remember }) });
            signup({ body: JSON.stringify({ email, code }) });
        "};
        let out = js.apply(src);
        assert!(out.content.contains(
            "body: JSON.stringify({ username: username, password: password, remember })"
        ));
        assert!(out.content.contains("body: JSON.stringify({ email, code })"));
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].kind, kind::SHORTHAND_PROPERTY);
    }

    #[test]
    fn test_explicit_properties_are_not_expanded() {
        let js = JsHeuristic::new();
        let src = "post({ body: JSON.stringify({ a: 1, b: 2 }) });";
        let out = js.apply(src);
        assert!(out.findings.is_empty());
        assert_eq!(out.content, src);
    }

    #[test]
    fn test_duplicate_function_detected_not_fixed() {
        let js = JsHeuristic::new();
        let src = indoc! {"
            function load() {
              return 1;
            }
            function save() {
              return 2;
            }
            function load () {
              return 3;
            }
        "};
        let out = js.apply(src);
        assert_eq!(out.findings.len(), 1);
        assert!(!out.findings[0].fixed);
        assert_eq!(
            out.findings[0].description,
            "duplicate function definition: load"
        );
        assert!(!out.changed());
        assert_eq!(out.content.matches("function ").count(), 3);
    }
}
