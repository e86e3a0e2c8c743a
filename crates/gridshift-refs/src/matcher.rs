//! Reference scanning over formula text
//!
//! Finds the cell and range references embedded in a formula or defined
//! name, left to right and without overlap. Candidates come from a regex;
//! each one is then checked against the separator characters around it, the
//! `(` that marks a function name (`LOG10(`), and string literals.

use std::sync::OnceLock;

use regex::Regex;

use crate::token::ReferenceToken;

/// A reference found in formula text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// The parsed reference
    pub token: ReferenceToken,
}

fn reference_re() -> &'static Regex {
    static REF_RE: OnceLock<Regex> = OnceLock::new();
    REF_RE.get_or_init(|| {
        let qualifier = r"(?:'(?:[^']|'')+'|[\p{L}\p{N}_.]+)!";
        let address = r"\$?[A-Za-z]{1,3}\$?[0-9]{1,7}";
        Regex::new(&format!(
            r"(?:{q})?{a}(?::(?:{q})?{a})?",
            q = qualifier,
            a = address
        ))
        .expect("reference regex must compile")
    })
}

/// Characters allowed directly around a reference
fn is_separator(c: char) -> bool {
    matches!(
        c,
        '+' | '-'
            | '*'
            | '/'
            | '^'
            | '='
            | '<'
            | '>'
            | '('
            | ')'
            | ','
            | ' '
            | '&'
            | ';'
            | '%'
            | '{'
            | '}'
            | '\t'
            | '\n'
            | '\r'
    )
}

/// Whether a byte offset sits inside a `"..."` literal
fn inside_string_literal(text: &str, offset: usize) -> bool {
    text[..offset].bytes().filter(|&b| b == b'"').count() % 2 == 1
}

/// Find every reference in `text`
///
/// # Example
///
/// ```
/// use gridshift_refs::matcher::scan;
///
/// let spans = scan("=SUM(A1:B2)+LOG10(C3)&\"D4\"");
/// let found: Vec<_> = spans.iter().map(|s| s.token.to_string()).collect();
/// assert_eq!(found, vec!["A1:B2", "C3"]);
/// ```
pub fn scan(text: &str) -> Vec<Span> {
    let re = reference_re();
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let Some(m) = re.find_at(text, pos) else {
            break;
        };
        let (start, end) = (m.start(), m.end());

        let before_ok = text[..start].chars().next_back().map_or(true, is_separator);
        let after = text[end..].chars().next();
        let after_ok = after.map_or(true, |c| c != '(' && is_separator(c));

        if before_ok && after_ok && !inside_string_literal(text, start) {
            if let Ok(token) = ReferenceToken::parse(m.as_str()) {
                spans.push(Span { start, end, token });
                pos = end;
                continue;
            }
        }

        // Retry one character further; candidates never start mid-character.
        pos = start + text[start..].chars().next().map_or(1, char::len_utf8);
    }

    spans
}

/// Parse every reference in `text`
pub fn references(text: &str) -> Vec<ReferenceToken> {
    scan(text).into_iter().map(|s| s.token).collect()
}

/// Rebuild `text`, letting `f` replace references
///
/// `f` returns `None` to keep a reference exactly as written. Everything
/// that is not a reference is copied through verbatim.
pub fn rewrite<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&ReferenceToken) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for span in scan(text) {
        out.push_str(&text[last..span.start]);
        match f(&span.token) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(&text[span.start..span.end]),
        }
        last = span.end;
    }

    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn found(text: &str) -> Vec<String> {
        references(text).iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_scan_basic() {
        assert_eq!(found("=A1+B2*$C$3"), vec!["A1", "B2", "$C$3"]);
        assert_eq!(found("=SUM(A1:A10)"), vec!["A1:A10"]);
        assert_eq!(found("A1"), vec!["A1"]);
    }

    #[test]
    fn test_scan_spans() {
        let spans = scan("=A1+Sheet2!B2");
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[0].end), (1, 3));
        assert_eq!((spans[1].start, spans[1].end), (4, 13));
    }

    #[test]
    fn test_function_names_are_not_references() {
        assert_eq!(found("=LOG10(A1)+ATAN2(B1,C1)"), vec!["A1", "B1", "C1"]);
    }

    #[test]
    fn test_string_literals_skipped() {
        assert!(found("=\"A1\"").is_empty());
        assert_eq!(found("=\"x\"&B2&\"C3\""), vec!["B2"]);
    }

    #[test]
    fn test_boundaries() {
        // Embedded in identifiers or numbers
        assert!(found("=MYNAME1").is_empty());
        assert!(found("=A1B").is_empty());
        assert!(found("=1.5E10").is_empty());
        assert!(found("=R1C1").is_empty());
        // Extra separators
        assert_eq!(found("={A1;B2}"), vec!["A1", "B2"]);
        assert_eq!(found("=A1%"), vec!["A1"]);
        assert_eq!(found("=A1\n+B1"), vec!["A1", "B1"]);
        assert_eq!(
            found("=A1^B1-C1/D1<E1>F1=G1"),
            vec!["A1", "B1", "C1", "D1", "E1", "F1", "G1"]
        );
        assert_eq!(found("=A1<>B1"), vec!["A1", "B1"]);
    }

    #[test]
    fn test_non_ascii_qualifier() {
        let refs = references("=Données!B5+Übersicht!A1:B2");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].sheet.as_ref().unwrap().name, "Données");
        assert!(!refs[0].sheet.as_ref().unwrap().quoted);
        assert_eq!(refs[1].to_string(), "Übersicht!A1:B2");
        // A letter glued to a plain address is still not a boundary
        assert!(found("=éA1").is_empty());
    }

    #[test]
    fn test_qualified_references() {
        let refs = references("='Q1 Sales'!A1:B2+Data!C3");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].sheet.as_ref().unwrap().name, "Q1 Sales");
        assert_eq!(refs[1].sheet.as_ref().unwrap().name, "Data");
    }

    #[test]
    fn test_out_of_grid_is_not_a_reference() {
        assert!(found("=A0").is_empty());
        assert!(found("=XFE1").is_empty());
        assert!(found("=A9999999").is_empty());
    }

    #[test]
    fn test_rewrite_preserves_untouched_text() {
        let out = rewrite("=sum( a1 , \"A1\" , b2 )", |token| {
            if token.to_string() == "A1" {
                Some("Z9".to_string())
            } else {
                None
            }
        });
        assert_eq!(out, "=sum( Z9 , \"A1\" , b2 )");
    }

    #[test]
    fn test_rewrite_non_ascii_text() {
        let out = rewrite("=\"é\"&A1&ü", |_| Some("B1".to_string()));
        assert_eq!(out, "=\"é\"&B1&ü");
    }
}
