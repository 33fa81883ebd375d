//! Tracks the open ancestor chain while content streams into a page, so a
//! break at any depth can be followed by the same nesting on the next page.
//!
//! Table bodies get special treatment: the `thead` preceding them is
//! remembered and repeated at the top of every page fragment of the body.

use super::page::Page;
use super::tree::{BoxId, BoxTree};
use crate::model::Node;
use crate::style::Display;

/// One open ancestor.
#[derive(Debug, Clone)]
pub struct AncestryFrame<'a> {
    /// Deep-cloned ahead of `main` on every new page.
    pub before: Vec<&'a Node>,
    /// Shallow-cloned to become the insertion point.
    pub main: &'a Node,
    /// Deep-cloned after `main` on every new page.
    pub after: Vec<&'a Node>,
}

/// Stack of open ancestors, outermost first.
#[derive(Debug, Clone, Default)]
pub struct AncestryTracker<'a> {
    frames: Vec<AncestryFrame<'a>>,
}

impl<'a> AncestryTracker<'a> {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Open `node`. `preceding` are its earlier siblings in source order.
    pub fn push(&mut self, node: &'a Node, preceding: &'a [Node]) {
        let mut before = Vec::new();
        if node.style.display(&node.tag) == Display::TableRowGroup {
            if let Some(head) = repeating_header(preceding) {
                before.push(head);
            }
        }
        self.frames.push(AncestryFrame {
            before,
            main: node,
            after: Vec::new(),
        });
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[AncestryFrame<'a>] {
        &self.frames
    }

    /// Rebuild the open chain inside `page`'s content region and return the
    /// innermost clone, where insertion resumes.
    pub fn render_levels(&self, tree: &mut BoxTree, page: &Page) -> BoxId {
        let mut target = page.content;
        for frame in &self.frames {
            for node in &frame.before {
                tree.append_deep(target, node);
            }
            let main = tree.append_shallow(target, frame.main);
            for node in &frame.after {
                tree.append_deep(target, node);
            }
            target = main;
        }
        target
    }
}

/// Closest preceding `thead` still displayed as a header group.
fn repeating_header(preceding: &[Node]) -> Option<&Node> {
    preceding
        .iter()
        .rev()
        .find(|sibling| sibling.tag == "thead" && sibling.style.display(&sibling.tag) == Display::TableHeaderGroup)
}
