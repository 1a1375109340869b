//! Lenient HTML parsing for content fragments.
//!
//! Fragments go through html5ever's full document parser, so unclosed and
//! misnested tags are repaired exactly like a browser would and character
//! references are decoded. The resulting tree is an index arena.

mod arena;
mod tree_sink;

pub use arena::{Attribute, DomData, DomNode, DomNodeId, HtmlDom};
pub use tree_sink::DomSink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// A parsed fragment and the element that holds its content.
pub struct Fragment {
    pub dom: HtmlDom,
    /// The `body` element (or the document when no body was produced).
    pub root: DomNodeId,
}

/// Parse an HTML fragment. Never fails.
pub fn parse_fragment(html: &str) -> Fragment {
    let sink = DomSink::new();
    let dom = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    let root = dom.find_by_tag("body").unwrap_or_else(|| dom.document());
    Fragment { dom, root }
}
