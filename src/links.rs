//! Relationship ids for external hyperlinks.
//!
//! Every anchor in the document gets its own relationship entry in the main
//! part's relationship table, even when several anchors share a target.
//! Ids already used by the package (styles, settings, template parts) are
//! reserved up front so allocations never collide with them.

use std::collections::HashSet;

/// One registered hyperlink relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelationship {
    pub id: String,
    pub target: String,
}

/// Instance-scoped allocator; build a fresh one for every export.
#[derive(Debug, Clone, Default)]
pub struct HyperlinkRegistry {
    reserved: HashSet<String>,
    entries: Vec<LinkRelationship>,
    counter: u32,
}

impl HyperlinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that will never hand out any of `ids`.
    pub fn reserving<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Register `target_uri` and return its fresh relationship id.
    pub fn allocate(&mut self, target_uri: &str) -> String {
        let id = loop {
            self.counter += 1;
            let candidate = format!("rId{}", self.counter);
            if !self.reserved.contains(&candidate) {
                break candidate;
            }
        };
        self.entries.push(LinkRelationship {
            id: id.clone(),
            target: target_uri.trim().to_string(),
        });
        id
    }

    /// Registered relationships in allocation order.
    pub fn entries(&self) -> &[LinkRelationship] {
        &self.entries
    }

    pub fn target(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.target.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
