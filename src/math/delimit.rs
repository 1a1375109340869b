//! Locating `$...$` and `$$...$$` formulas inside running text.

use memchr::{memchr, memmem};

use super::transcribe;
use crate::model::MathExpression;

/// A piece of running text: either literal text or a formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathSegment {
    Text(String),
    Math(MathExpression),
}

/// Split text on math delimiters.
///
/// `$$...$$` marks a display formula, `$...$` an inline one. An inline body
/// may not start or end with whitespace, so prices such as `5 $ y 10 $` stay
/// text. `\$` is a literal dollar sign. Unclosed delimiters are kept verbatim.
pub fn split_math(text: &str) -> Vec<MathSegment> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    while let Some(offset) = memchr(b'$', &bytes[pos..]) {
        let open = pos + offset;

        if open > 0 && bytes[open - 1] == b'\\' {
            literal.push_str(&text[pos..open - 1]);
            literal.push('$');
            pos = open + 1;
            continue;
        }

        let display = bytes.get(open + 1) == Some(&b'$');
        let delimiter = if display { 2 } else { 1 };
        let body_start = open + delimiter;

        match find_closing(bytes, body_start, display) {
            Some(close) => {
                literal.push_str(&text[pos..open]);
                if !literal.is_empty() {
                    segments.push(MathSegment::Text(std::mem::take(&mut literal)));
                }
                let source = text[body_start..close].trim();
                segments.push(MathSegment::Math(MathExpression {
                    source: source.to_string(),
                    nodes: transcribe(source),
                    display,
                }));
                pos = close + delimiter;
            }
            None => {
                literal.push_str(&text[pos..body_start]);
                pos = body_start;
            }
        }
    }

    literal.push_str(&text[pos..]);
    if !literal.is_empty() {
        segments.push(MathSegment::Text(literal));
    }
    segments
}

/// True when the text contains at least one well-formed formula.
pub fn contains_math(text: &str) -> bool {
    split_math(text)
        .iter()
        .any(|s| matches!(s, MathSegment::Math(_)))
}

fn find_closing(bytes: &[u8], from: usize, display: bool) -> Option<usize> {
    if display {
        let close = from + memmem::find(&bytes[from..], b"$$")?;
        let body = &bytes[from..close];
        return (!body.iter().all(u8::is_ascii_whitespace)).then_some(close);
    }

    match bytes.get(from) {
        Some(b) if !b.is_ascii_whitespace() && *b != b'$' => {}
        _ => return None,
    }
    let mut search = from;
    loop {
        let close = search + memchr(b'$', &bytes[search..])?;
        if bytes[close - 1] == b'\\' {
            search = close + 1;
            continue;
        }
        if bytes[close - 1].is_ascii_whitespace() {
            return None;
        }
        return Some(close);
    }
}
