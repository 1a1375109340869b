//! Parsed math expressions.

/// One node of a parsed formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathNode {
    /// A run of literal symbols.
    Text(String),
    Fraction {
        numerator: Vec<MathNode>,
        denominator: Vec<MathNode>,
    },
    /// A base carrying a subscript, a superscript, or both.
    SubSuperscript {
        base: Vec<MathNode>,
        subscript: Option<Vec<MathNode>>,
        superscript: Option<Vec<MathNode>>,
    },
}

impl MathNode {
    pub fn text(value: impl Into<String>) -> Self {
        MathNode::Text(value.into())
    }

    /// Flatten the node into its visible characters, in reading order.
    pub fn linear_text(&self) -> String {
        let mut out = String::new();
        self.write_linear(&mut out);
        out
    }

    fn write_linear(&self, out: &mut String) {
        match self {
            MathNode::Text(value) => out.push_str(value),
            MathNode::Fraction {
                numerator,
                denominator,
            } => {
                write_all(numerator, out);
                out.push('/');
                write_all(denominator, out);
            }
            MathNode::SubSuperscript {
                base,
                subscript,
                superscript,
            } => {
                write_all(base, out);
                if let Some(sub) = subscript {
                    out.push('_');
                    write_all(sub, out);
                }
                if let Some(sup) = superscript {
                    out.push('^');
                    write_all(sup, out);
                }
            }
        }
    }
}

/// Flatten a node sequence into its visible characters.
pub fn linear_text(nodes: &[MathNode]) -> String {
    let mut out = String::new();
    write_all(nodes, &mut out);
    out
}

fn write_all(nodes: &[MathNode], out: &mut String) {
    for node in nodes {
        node.write_linear(out);
    }
}

/// A formula found in text, with its parsed tree and original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathExpression {
    /// Source between the delimiters, without the `$`/`$$`.
    pub source: String,
    pub nodes: Vec<MathNode>,
    /// `$$...$$` formulas are standalone centered paragraphs.
    pub display: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_text() {
        let node = MathNode::SubSuperscript {
            base: vec![MathNode::text("∑")],
            subscript: Some(vec![MathNode::text("i=1")]),
            superscript: Some(vec![MathNode::text("n")]),
        };
        assert_eq!(node.linear_text(), "∑_i=1^n");

        let frac = MathNode::Fraction {
            numerator: vec![MathNode::text("a")],
            denominator: vec![MathNode::text("b")],
        };
        assert_eq!(linear_text(&[frac, MathNode::text("+c")]), "a/b+c");
    }
}
