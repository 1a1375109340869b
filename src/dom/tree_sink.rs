//! html5ever TreeSink implementation for HtmlDom.

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use super::arena::{Attribute, DomData, DomNodeId, HtmlDom};

/// TreeSink that builds an [`HtmlDom`]. Handles are node ids.
///
/// html5ever's TreeSink methods take `&self`, so the DOM sits in a RefCell.
#[derive(Default)]
pub struct DomSink {
    dom: RefCell<HtmlDom>,
}

impl DomSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_dom(self) -> HtmlDom {
        self.dom.into_inner()
    }

    fn node_of(&self, child: NodeOrText<DomNodeId>) -> DomNodeId {
        match child {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => self.dom.borrow_mut().create_text(text.to_string()),
        }
    }
}

fn attributes(attrs: Vec<Html5Attribute>) -> impl Iterator<Item = Attribute> {
    attrs.into_iter().map(|a| Attribute {
        name: a.name,
        value: a.value.to_string(),
    })
}

impl TreeSink for DomSink {
    type Handle = DomNodeId;
    type Output = HtmlDom;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.into_dom()
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {
        // Editor HTML is often slightly malformed; recovery is silent.
    }

    fn get_document(&self) -> DomNodeId {
        self.dom.borrow().document()
    }

    fn elem_name<'a>(&'a self, target: &'a DomNodeId) -> &'a QualName {
        static UNNAMED: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let dom = self.dom.borrow();
        let Some(DomData::Element { name, .. }) = dom.get(*target).map(|n| &n.data) else {
            return &UNNAMED;
        };
        // SAFETY: nodes are only ever pushed, and an element's name is never
        // replaced, so the name outlives the RefCell guard for as long as
        // `self` lives.
        unsafe { &*(name as *const QualName) }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> DomNodeId {
        self.dom
            .borrow_mut()
            .create_element(name, attributes(attrs).collect())
    }

    fn create_comment(&self, _text: StrTendril) -> DomNodeId {
        self.dom.borrow_mut().create_ignored()
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> DomNodeId {
        self.dom.borrow_mut().create_ignored()
    }

    fn append(&self, parent: &DomNodeId, child: NodeOrText<DomNodeId>) {
        match child {
            NodeOrText::AppendText(text) => self.dom.borrow_mut().append_text(*parent, &text),
            NodeOrText::AppendNode(node) => self.dom.borrow_mut().append(*parent, node),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &DomNodeId,
        prev_element: &DomNodeId,
        child: NodeOrText<DomNodeId>,
    ) {
        let has_parent = self
            .dom
            .borrow()
            .get(*element)
            .is_some_and(|n| n.parent.is_some());
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    fn get_template_contents(&self, target: &DomNodeId) -> DomNodeId {
        *target
    }

    fn same_node(&self, x: &DomNodeId, y: &DomNodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &DomNodeId, new_node: NodeOrText<DomNodeId>) {
        let node = self.node_of(new_node);
        self.dom.borrow_mut().insert_before(*sibling, node);
    }

    fn add_attrs_if_missing(&self, target: &DomNodeId, attrs: Vec<Html5Attribute>) {
        let mut dom = self.dom.borrow_mut();
        let Some(DomData::Element {
            attrs: existing, ..
        }) = dom.get_mut(*target).map(|n| &mut n.data)
        else {
            return;
        };
        for attr in attributes(attrs) {
            if !existing.iter().any(|a| a.name == attr.name) {
                existing.push(attr);
            }
        }
    }

    fn remove_from_parent(&self, target: &DomNodeId) {
        self.dom.borrow_mut().detach(*target);
    }

    fn reparent_children(&self, node: &DomNodeId, new_parent: &DomNodeId) {
        let mut dom = self.dom.borrow_mut();
        let children: Vec<_> = dom.children(*node).collect();
        for child in children {
            dom.append(*new_parent, child);
        }
    }
}
