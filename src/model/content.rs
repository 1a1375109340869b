//! The authored content tree: chapters holding nested sections.
//!
//! The tree arrives as JSON from the content-authoring service:
//!
//! ```json
//! { "chapters": [ { "id": "1", "title": "Memoria", "content": "<p>...</p>",
//!                   "sections": [ ... ] } ] }
//! ```
//!
//! Unknown fields are ignored. A missing or `null` `chapters` array yields an
//! empty tree, which still exports a title page.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// One chapter or section entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Sanitized HTML body, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Ordered children; order defines document order.
    #[serde(
        default,
        rename = "sections",
        alias = "children",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: None,
            children: Vec::new(),
        }
    }

    pub fn with_content(mut self, html: impl Into<String>) -> Self {
        self.content = Some(html.into());
        self
    }

    pub fn with_child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }

    /// Content with surrounding whitespace removed; `None` when blank.
    pub fn html(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|html| !html.is_empty())
    }

    /// True when the node only contributes its heading.
    pub fn is_leaf_heading(&self) -> bool {
        self.html().is_none() && self.children.is_empty()
    }
}

/// The root of an export: an ordered list of chapters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTree {
    #[serde(default, deserialize_with = "null_as_default")]
    pub chapters: Vec<ContentNode>,
}

impl ContentTree {
    pub fn new(chapters: Vec<ContentNode>) -> Self {
        Self { chapters }
    }

    /// Parse the JSON payload sent by the content service.
    ///
    /// An empty payload or a bare `null` means there is nothing to export.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::NothingToExport);
        }
        let tree: Option<ContentTree> = serde_json::from_slice(bytes)?;
        tree.ok_or(Error::NothingToExport)
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[ContentNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.chapters)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
