//! Office Math Markup for transcribed formulas.

use super::body::xml_text;
use crate::model::{MathExpression, MathNode};

/// Write an inline formula.
pub fn write_math(expr: &MathExpression, buf: &mut String) {
    buf.push_str("<m:oMath>");
    write_nodes(&expr.nodes, buf);
    buf.push_str("</m:oMath>");
}

/// Write a display formula; it must be the only content of its paragraph.
pub fn write_math_paragraph(expr: &MathExpression, buf: &mut String) {
    buf.push_str(r#"<m:oMathPara><m:oMathParaPr><m:jc m:val="center"/></m:oMathParaPr>"#);
    write_math(expr, buf);
    buf.push_str("</m:oMathPara>");
}

fn write_nodes(nodes: &[MathNode], buf: &mut String) {
    for node in nodes {
        write_node(node, buf);
    }
}

fn write_node(node: &MathNode, buf: &mut String) {
    match node {
        MathNode::Text(text) => {
            buf.push_str(r#"<m:r><m:t xml:space="preserve">"#);
            buf.push_str(&xml_text(text));
            buf.push_str("</m:t></m:r>");
        }
        MathNode::Fraction {
            numerator,
            denominator,
        } => {
            buf.push_str("<m:f>");
            write_argument("m:num", numerator, buf);
            write_argument("m:den", denominator, buf);
            buf.push_str("</m:f>");
        }
        MathNode::SubSuperscript {
            base,
            subscript,
            superscript,
        } => match (subscript, superscript) {
            (Some(sub), Some(sup)) => {
                buf.push_str("<m:sSubSup>");
                write_argument("m:e", base, buf);
                write_argument("m:sub", sub, buf);
                write_argument("m:sup", sup, buf);
                buf.push_str("</m:sSubSup>");
            }
            (Some(sub), None) => {
                buf.push_str("<m:sSub>");
                write_argument("m:e", base, buf);
                write_argument("m:sub", sub, buf);
                buf.push_str("</m:sSub>");
            }
            (None, Some(sup)) => {
                buf.push_str("<m:sSup>");
                write_argument("m:e", base, buf);
                write_argument("m:sup", sup, buf);
                buf.push_str("</m:sSup>");
            }
            (None, None) => write_nodes(base, buf),
        },
    }
}

fn write_argument(tag: &str, nodes: &[MathNode], buf: &mut String) {
    buf.push('<');
    buf.push_str(tag);
    buf.push('>');
    write_nodes(nodes, buf);
    buf.push_str("</");
    buf.push_str(tag);
    buf.push('>');
}
