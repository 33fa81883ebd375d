//! The output box tree.
//!
//! Every page, region and cloned content box lives in one arena. Cloning a
//! source node produces a [`LayoutBox`] carrying the node's own data; deep
//! clones recreate the node's children as well. Boxes are never shared
//! between parents, so removing a clone is just detaching its subtree.

use std::collections::BTreeMap;

use indextree::{Arena, NodeId};
use serde::Serialize;

use crate::model::Node;
use crate::style::Style;

/// Handle of a box in a [`BoxTree`].
pub type BoxId = NodeId;

/// How a box's height is determined.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Extent {
    /// Sized by its content (and an explicit style height if any).
    #[default]
    Auto,
    /// Exactly this tall regardless of content.
    Fixed(f64),
    /// Takes the space its parent's fixed siblings leave over, growing with
    /// content beyond that.
    Fill,
    /// Captured height: at least this tall, growing with content.
    Locked(f64),
}

/// One box in the output tree.
#[derive(Debug, Clone, Default)]
pub struct LayoutBox {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
    pub style: Style,
    /// Fixed outer width, when one has been locked.
    pub width: Option<f64>,
    pub extent: Extent,
}

impl LayoutBox {
    /// A shallow copy of a source node: its own data, none of its children.
    pub fn from_node(node: &Node) -> Self {
        Self {
            tag: node.tag.clone(),
            id: node.id.clone(),
            classes: Vec::new(),
            attributes: node.attributes.clone(),
            text: node.text.clone(),
            style: node.style.clone(),
            width: None,
            extent: Extent::Auto,
        }
    }

    /// A structural `div` with the given classes.
    pub fn div(classes: &[&str]) -> Self {
        Self {
            tag: "div".to_string(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Arena of output boxes rooted at the pages wrapper.
#[derive(Debug)]
pub struct BoxTree {
    arena: Arena<LayoutBox>,
    root: BoxId,
}

impl Default for BoxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxTree {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(LayoutBox::div(&["paginate", "paginate-pages"]));
        Self { arena, root }
    }

    /// The pages wrapper.
    pub fn root(&self) -> BoxId {
        self.root
    }

    pub fn get(&self, id: BoxId) -> &LayoutBox {
        self.arena[id].get()
    }

    pub fn get_mut(&mut self, id: BoxId) -> &mut LayoutBox {
        self.arena[id].get_mut()
    }

    /// Create a box as the last child of `parent`.
    pub fn append(&mut self, parent: BoxId, data: LayoutBox) -> BoxId {
        let id = self.arena.new_node(data);
        parent.append(id, &mut self.arena);
        id
    }

    /// `cloneNode(false)`: copy `node` without its children under `parent`.
    pub fn append_shallow(&mut self, parent: BoxId, node: &Node) -> BoxId {
        self.append(parent, LayoutBox::from_node(node))
    }

    /// `cloneNode(true)`: copy `node` and its whole subtree under `parent`.
    pub fn append_deep(&mut self, parent: BoxId, node: &Node) -> BoxId {
        let id = self.append_shallow(parent, node);
        for child in &node.children {
            self.append_deep(id, child);
        }
        id
    }

    /// Copy the subtree rooted at `source` (already in this tree) under `parent`.
    pub fn copy_subtree(&mut self, source: BoxId, parent: BoxId) -> BoxId {
        let data = self.get(source).clone();
        let id = self.append(parent, data);
        let children: Vec<BoxId> = self.children(source).collect();
        for child in children {
            self.copy_subtree(child, id);
        }
        id
    }

    /// Replace the children of `target` with copies of `source`'s children.
    pub fn replace_children_with_copy(&mut self, target: BoxId, source: BoxId) {
        let children: Vec<BoxId> = self.children(source).collect();
        self.clear_children(target);
        for child in children {
            self.copy_subtree(child, target);
        }
    }

    /// Replace the children of `target` with a single text box.
    pub fn replace_children_with_text(&mut self, target: BoxId, text: &str) {
        self.clear_children(target);
        if !text.is_empty() {
            let mut span = LayoutBox {
                tag: "span".to_string(),
                ..Default::default()
            };
            span.text = Some(text.to_string());
            self.append(target, span);
        }
    }

    pub fn clear_children(&mut self, id: BoxId) {
        let children: Vec<BoxId> = self.children(id).collect();
        for child in children {
            child.remove_subtree(&mut self.arena);
        }
    }

    /// Detach and drop `id` with all its descendants.
    pub fn remove(&mut self, id: BoxId) {
        id.remove_subtree(&mut self.arena);
    }

    /// Whether `id` has been removed from the tree.
    pub fn is_removed(&self, id: BoxId) -> bool {
        id.is_removed(&self.arena)
    }

    pub fn parent(&self, id: BoxId) -> Option<BoxId> {
        id.parent(&self.arena)
    }

    pub fn children(&self, id: BoxId) -> impl Iterator<Item = BoxId> + '_ {
        id.children(&self.arena)
    }

    pub fn has_children(&self, id: BoxId) -> bool {
        self.arena[id].first_child().is_some()
    }

    /// `id` and all its descendants in document order.
    pub fn descendants(&self, id: BoxId) -> impl Iterator<Item = BoxId> + '_ {
        id.descendants(&self.arena)
    }

    /// Descendants of `id` (excluding `id`) with the given tag.
    pub fn find_by_tag<'a>(&'a self, id: BoxId, tag: &'a str) -> impl Iterator<Item = BoxId> + 'a {
        self.descendants(id)
            .skip(1)
            .filter(move |d| self.get(*d).tag == tag)
    }

    /// Concatenated text of `id`'s subtree.
    pub fn text_content(&self, id: BoxId) -> String {
        self.descendants(id)
            .filter_map(|d| self.get(d).text.as_deref())
            .collect()
    }

    /// Number of ancestors between `id` and `ancestor` (0 when equal, `None`
    /// when `ancestor` is not on the chain).
    pub fn depth_below(&self, id: BoxId, ancestor: BoxId) -> Option<usize> {
        id.ancestors(&self.arena).position(|a| a == ancestor)
    }

    /// Serializable view of the subtree rooted at `id`.
    pub fn snapshot(&self, id: BoxId) -> BoxInfo {
        let data = self.get(id);
        BoxInfo {
            tag: data.tag.clone(),
            id: data.id.clone(),
            classes: data.classes.clone(),
            attributes: data.attributes.clone(),
            text: data.text.clone(),
            children: self.children(id).map(|c| self.snapshot(c)).collect(),
        }
    }
}

/// Serializable snapshot of a box and its descendants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxInfo {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BoxInfo>,
}
