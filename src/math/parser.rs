//! Recursive-descent parser for the supported math subset.
//!
//! Grammar (informal):
//!
//! ```text
//! sequence := atom*
//! atom     := text-char | group | command | atom ('_' arg)? ('^' arg)?
//! group    := '{' sequence '}'
//! command  := '\frac' arg arg | '\text' arg | '\' symbol-name | '\' char
//! arg      := group | command | char
//! ```
//!
//! Parsing never fails. Unmatched braces, empty groups and missing
//! arguments degrade to `Text` nodes carrying the literal source.

use log::debug;

use super::symbols;
use crate::model::{MathNode, linear_text};

/// Nesting limit for groups and command arguments.
const MAX_DEPTH: usize = 32;

/// Parse a formula body (without delimiters) into a node sequence.
pub fn transcribe(source: &str) -> Vec<MathNode> {
    let mut parser = Parser {
        src: source,
        pos: 0,
        depth: 0,
        degraded: false,
    };
    let (nodes, _) = parser.parse_sequence(false);
    if parser.degraded {
        debug!("malformed math rendered partly as literal text: {source:?}");
    }
    normalize(nodes)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
    degraded: bool,
}

/// Nodes of one sequence, remembering where the last non-text atom starts so
/// that a following script can take it as its base.
#[derive(Default)]
struct Sequence {
    nodes: Vec<MathNode>,
    last_atom: Option<usize>,
}

impl Sequence {
    fn push_char(&mut self, c: char) {
        if self.last_atom.is_none()
            && let Some(MathNode::Text(text)) = self.nodes.last_mut()
        {
            text.push(c);
            return;
        }
        self.nodes.push(MathNode::Text(c.to_string()));
        self.last_atom = None;
    }

    fn push_text(&mut self, text: &str) {
        text.chars().for_each(|c| self.push_char(c));
    }

    fn push_atom(&mut self, nodes: Vec<MathNode>) {
        if nodes.is_empty() {
            return;
        }
        self.last_atom = Some(self.nodes.len());
        self.nodes.extend(nodes);
    }

    /// Remove and return the base for a sub/superscript: the last atom, or the
    /// last visible character of a text run.
    fn take_base(&mut self) -> Vec<MathNode> {
        if let Some(start) = self.last_atom.take() {
            return self.nodes.split_off(start);
        }
        let Some(MathNode::Text(text)) = self.nodes.last_mut() else {
            return Vec::new();
        };
        text.truncate(text.trim_end().len());
        let base = text.pop();
        if text.is_empty() {
            self.nodes.pop();
        }
        base.map(|c| vec![MathNode::Text(c.to_string())])
            .unwrap_or_default()
    }
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn literal_from(&mut self, start: usize) -> Vec<MathNode> {
        self.degraded = true;
        vec![MathNode::Text(self.src[start..self.pos].to_string())]
    }

    /// Parse atoms until the end of input or, inside a group, the closing
    /// brace. Returns the nodes and whether the closing brace was consumed.
    fn parse_sequence(&mut self, in_group: bool) -> (Vec<MathNode>, bool) {
        let mut seq = Sequence::default();
        while let Some(c) = self.peek() {
            match c {
                '}' if in_group => {
                    self.bump();
                    return (seq.nodes, true);
                }
                '}' => {
                    self.bump();
                    self.degraded = true;
                    seq.push_char('}');
                }
                '{' if self.depth >= MAX_DEPTH => {
                    self.bump();
                    self.degraded = true;
                    seq.push_char('{');
                }
                '{' => {
                    let start = self.pos;
                    match self.parse_group() {
                        Some(nodes) if !nodes.is_empty() => seq.push_atom(nodes),
                        Some(_) => {
                            self.degraded = true;
                            seq.push_atom(vec![MathNode::text("{}")]);
                        }
                        None => {
                            let literal = self.literal_from(start);
                            seq.push_atom(literal);
                        }
                    }
                }
                '\\' => {
                    let nodes = self.parse_command();
                    seq.push_atom(nodes);
                }
                '_' | '^' => self.parse_scripts(&mut seq),
                _ => {
                    self.bump();
                    seq.push_char(c);
                }
            }
        }
        (seq.nodes, false)
    }

    /// Parse `{ ... }`; `None` when the closing brace is missing.
    fn parse_group(&mut self) -> Option<Vec<MathNode>> {
        self.bump();
        self.depth += 1;
        let (nodes, closed) = self.parse_sequence(true);
        self.depth -= 1;
        closed.then_some(nodes)
    }

    /// Parse a command or script argument. Empty and unclosed groups yield
    /// `None`.
    fn parse_argument(&mut self) -> Option<Vec<MathNode>> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.skip_whitespace();
        self.depth += 1;
        let arg = match self.peek() {
            Some('{') => self.parse_group().filter(|nodes| !nodes.is_empty()),
            Some('\\') => Some(self.parse_command()).filter(|nodes| !nodes.is_empty()),
            Some('}' | '_' | '^') | None => None,
            Some(c) => {
                self.bump();
                Some(vec![MathNode::Text(c.to_string())])
            }
        };
        self.depth -= 1;
        arg
    }

    fn parse_command(&mut self) -> Vec<MathNode> {
        let start = self.pos;
        self.bump();
        let name_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.bump();
        }
        let src = self.src;
        let name = &src[name_start..self.pos];

        if name.is_empty() {
            return match self.bump() {
                Some(c) => match symbols::escaped(c) {
                    Some(s) => text_nodes(s),
                    None => vec![MathNode::Text(format!("\\{c}"))],
                },
                None => vec![MathNode::text("\\")],
            };
        }

        match name {
            "frac" | "dfrac" | "tfrac" => {
                let numerator = self.parse_argument();
                let denominator = self.parse_argument();
                match (numerator, denominator) {
                    (Some(numerator), Some(denominator)) => vec![MathNode::Fraction {
                        numerator,
                        denominator,
                    }],
                    _ => self.literal_from(start),
                }
            }
            "text" | "mathrm" | "mathbf" | "mathit" | "operatorname" => {
                match self.parse_argument() {
                    Some(nodes) => vec![MathNode::Text(linear_text(&nodes))],
                    None => self.literal_from(start),
                }
            }
            _ => match symbols::symbol(name) {
                Some(s) => text_nodes(s),
                None => vec![MathNode::Text(format!("\\{name}"))],
            },
        }
    }

    fn parse_scripts(&mut self, seq: &mut Sequence) {
        let start = self.pos;
        let base = seq.take_base();
        let mut subscript = None;
        let mut superscript = None;

        while let Some(c @ ('_' | '^')) = self.peek() {
            let slot = if c == '_' {
                &mut subscript
            } else {
                &mut superscript
            };
            if slot.is_some() {
                break;
            }
            self.bump();
            match self.parse_argument() {
                Some(arg) => *slot = Some(arg),
                None => {
                    self.degraded = true;
                    seq.push_atom(base);
                    seq.push_text(&self.src[start..self.pos]);
                    return;
                }
            }
        }

        seq.push_atom(vec![MathNode::SubSuperscript {
            base,
            subscript,
            superscript,
        }]);
    }
}

fn text_nodes(s: &str) -> Vec<MathNode> {
    if s.is_empty() {
        Vec::new()
    } else {
        vec![MathNode::text(s)]
    }
}

/// Merge adjacent text nodes and drop empty ones, recursively.
fn normalize(nodes: Vec<MathNode>) -> Vec<MathNode> {
    let mut out: Vec<MathNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let node = match node {
            MathNode::Text(text) if text.is_empty() => continue,
            MathNode::Fraction {
                numerator,
                denominator,
            } => MathNode::Fraction {
                numerator: normalize(numerator),
                denominator: normalize(denominator),
            },
            MathNode::SubSuperscript {
                base,
                subscript,
                superscript,
            } => MathNode::SubSuperscript {
                base: normalize(base),
                subscript: subscript.map(normalize),
                superscript: superscript.map(normalize),
            },
            text => text,
        };
        if let (Some(MathNode::Text(prev)), MathNode::Text(next)) = (out.last_mut(), &node) {
            prev.push_str(next);
            continue;
        }
        out.push(node);
    }
    out
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn text(s: &str) -> MathNode {
        MathNode::text(s)
    }

    #[test]
    fn test_fraction() {
        let nodes = transcribe(r"\frac{qL^4}{8EI}");
        assert_eq!(nodes.len(), 1);
        let MathNode::Fraction {
            numerator,
            denominator,
        } = &nodes[0]
        else {
            panic!("expected fraction, got {nodes:?}");
        };
        assert_eq!(
            numerator,
            &vec![
                text("q"),
                MathNode::SubSuperscript {
                    base: vec![text("L")],
                    subscript: None,
                    superscript: Some(vec![text("4")]),
                },
            ]
        );
        assert_eq!(denominator, &vec![text("8EI")]);
    }

    #[test]
    fn test_summation_with_limits() {
        let nodes = transcribe(r"\sum_{i=1}^{n} q_i");
        let MathNode::SubSuperscript {
            base,
            subscript,
            superscript,
        } = &nodes[0]
        else {
            panic!("expected scripts, got {nodes:?}");
        };
        assert_eq!(base, &vec![text("∑")]);
        assert_eq!(subscript.as_deref(), Some(&[text("i=1")][..]));
        assert_eq!(superscript.as_deref(), Some(&[text("n")][..]));
        assert!(nodes[0].linear_text().contains('∑'));

        assert_eq!(nodes[1], text(" "));
        assert_eq!(
            nodes[2],
            MathNode::SubSuperscript {
                base: vec![text("q")],
                subscript: Some(vec![text("i")]),
                superscript: None,
            }
        );
    }

    #[test]
    fn test_script_base_is_last_character() {
        let nodes = transcribe(r"I = b \cdot h^3 / 12");
        assert_eq!(
            nodes,
            vec![
                text("I = b ⋅ "),
                MathNode::SubSuperscript {
                    base: vec![text("h")],
                    subscript: None,
                    superscript: Some(vec![text("3")]),
                },
                text(" / 12"),
            ]
        );
    }

    #[test]
    fn test_group_as_base() {
        let nodes = transcribe("{ab}^2");
        assert_eq!(
            nodes,
            vec![MathNode::SubSuperscript {
                base: vec![text("ab")],
                subscript: None,
                superscript: Some(vec![text("2")]),
            }]
        );
    }

    #[test]
    fn test_unknown_command_passes_through() {
        assert_eq!(transcribe(r"\foo x"), vec![text(r"\foo x")]);
    }

    #[test]
    fn test_unclosed_fraction_is_literal() {
        assert_eq!(transcribe(r"\frac{a}{b"), vec![text(r"\frac{a}{b")]);
    }

    #[test]
    fn test_empty_groups_degrade() {
        assert_eq!(transcribe(r"\frac{}{b}"), vec![text(r"\frac{}{b}")]);
        assert_eq!(transcribe("x^{}"), vec![text("x^{}")]);
        assert_eq!(transcribe("{}"), vec![text("{}")]);
    }

    #[test]
    fn test_unbalanced_braces() {
        assert_eq!(transcribe("{a"), vec![text("{a")]);
        assert_eq!(transcribe("a}"), vec![text("a}")]);
    }

    #[test]
    fn test_text_command() {
        assert_eq!(
            transcribe(r"\text{kN}\cdot m"),
            vec![text("kN⋅ m")]
        );
    }

    #[test]
    fn test_deep_nesting_is_bounded() {
        let src = "{".repeat(500) + "x" + &"}".repeat(500);
        let nodes = transcribe(&src);
        assert!(linear_text(&nodes).contains('x'));

        let src = r"\frac".repeat(1000);
        let _ = transcribe(&src);
    }

    proptest! {
        #[test]
        fn prop_never_panics(src in ".{0,64}") {
            let _ = transcribe(&src);
        }

        #[test]
        fn prop_plain_text_is_preserved(src in "[a-zA-Z0-9 =+*/().,-]{0,40}") {
            prop_assert_eq!(linear_text(&transcribe(&src)), src);
        }
    }
}
