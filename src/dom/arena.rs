//! Index-addressed DOM for parsed HTML fragments.
//!
//! html5ever builds this tree through [`super::tree_sink::DomSink`]. Nodes
//! are never freed; a detached node simply has no parent. Fragments are
//! small, so each node keeps its children in a vector.

use html5ever::QualName;

/// Position of a node in the [`HtmlDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomNodeId(u32);

impl DomNodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub enum DomData {
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
    },
    Text(String),
    /// Comments, doctypes and processing instructions; never rendered.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

#[derive(Debug)]
pub struct DomNode {
    pub data: DomData,
    pub parent: Option<DomNodeId>,
    children: Vec<DomNodeId>,
}

/// A parsed fragment. Node 0 is the document.
#[derive(Debug)]
pub struct HtmlDom {
    nodes: Vec<DomNode>,
}

impl HtmlDom {
    pub fn new() -> Self {
        Self {
            nodes: vec![DomNode {
                data: DomData::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn document(&self) -> DomNodeId {
        DomNodeId(0)
    }

    pub fn get(&self, id: DomNodeId) -> Option<&DomNode> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: DomNodeId) -> Option<&mut DomNode> {
        self.nodes.get_mut(id.index())
    }

    fn create(&mut self, data: DomData) -> DomNodeId {
        let id = DomNodeId(self.nodes.len() as u32);
        self.nodes.push(DomNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> DomNodeId {
        self.create(DomData::Element { name, attrs })
    }

    pub fn create_text(&mut self, text: String) -> DomNodeId {
        self.create(DomData::Text(text))
    }

    pub fn create_ignored(&mut self) -> DomNodeId {
        self.create(DomData::Ignored)
    }

    /// Make `child` the last child of `parent`, detaching it first.
    pub fn append(&mut self, parent: DomNodeId, child: DomNodeId) {
        self.detach(child);
        let Some(node) = self.get_mut(parent) else {
            return;
        };
        node.children.push(child);
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Place `node` right before `sibling` under the sibling's parent.
    pub fn insert_before(&mut self, sibling: DomNodeId, node: DomNodeId) {
        let Some(parent) = self.get(sibling).and_then(|n| n.parent) else {
            return;
        };
        self.detach(node);
        if let Some(parent_node) = self.get_mut(parent) {
            let at = parent_node
                .children
                .iter()
                .position(|&c| c == sibling)
                .unwrap_or(parent_node.children.len());
            parent_node.children.insert(at, node);
        }
        if let Some(n) = self.get_mut(node) {
            n.parent = Some(parent);
        }
    }

    /// Append text, extending the last child when it is already text.
    pub fn append_text(&mut self, parent: DomNodeId, text: &str) {
        let last = self.get(parent).and_then(|n| n.children.last().copied());
        if let Some(last) = last
            && let Some(DomData::Text(existing)) = self.get_mut(last).map(|n| &mut n.data)
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text.to_string());
        self.append(parent, node);
    }

    /// Remove a node from its parent's children.
    pub fn detach(&mut self, id: DomNodeId) {
        let Some(parent) = self.get_mut(id).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.retain(|&c| c != id);
        }
    }

    pub fn children(&self, id: DomNodeId) -> impl Iterator<Item = DomNodeId> + '_ {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
    }

    /// First element named `tag`, in document order.
    pub fn find_by_tag(&self, tag: &str) -> Option<DomNodeId> {
        let mut stack = vec![self.document()];
        while let Some(id) = stack.pop() {
            if self.tag(id) == Some(tag) {
                return Some(id);
            }
            stack.extend(self.children(id).collect::<Vec<_>>().into_iter().rev());
        }
        None
    }

    /// Local name of an element; `None` for text and other nodes.
    pub fn tag(&self, id: DomNodeId) -> Option<&str> {
        match &self.get(id)?.data {
            DomData::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        }
    }

    pub fn attr(&self, id: DomNodeId, attr_name: &str) -> Option<&str> {
        match &self.get(id)?.data {
            DomData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    pub fn text(&self, id: DomNodeId) -> Option<&str> {
        match &self.get(id)?.data {
            DomData::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// True if the node or any descendant is an element named in `tags`.
    pub fn contains_tag(&self, id: DomNodeId, tags: &[&str]) -> bool {
        self.tag(id).is_some_and(|t| tags.contains(&t))
            || self.children(id).any(|child| self.contains_tag(child, tags))
    }

    /// Text of the node and all its descendants.
    pub fn text_content(&self, id: DomNodeId) -> String {
        match self.text(id) {
            Some(text) => text.to_string(),
            None => self.children(id).map(|c| self.text_content(c)).collect(),
        }
    }
}

impl Default for HtmlDom {
    fn default() -> Self {
        Self::new()
    }
}
