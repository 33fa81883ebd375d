//! # Pagination Engine
//!
//! Streams the source tree into pages. There is no infinite canvas and no
//! geometry of our own: every decision is "insert, ask the oracle, keep or
//! retract".
//!
//! 1. Walk the source tree depth-first, left to right.
//! 2. A splittable container is cloned shallowly and descended into, so an
//!    overflow is always discovered at the smallest unit that caused it.
//! 3. A leaf, or a subtree marked `break-inside: avoid`, is cloned whole and
//!    the content region is measured. If it no longer fits, the clone is
//!    taken back out, a new page is started and the clone goes in again.
//! 4. A new page reopens every ancestor that was open on the previous one
//!    (see [`ancestry`]), repeating table header groups on the way.
//! 5. A box that overflows a page holding nothing else stays where it is and
//!    is reported; the render never aborts and never loops.

pub mod ancestry;
pub mod oracle;
pub mod page;
pub mod page_break;
pub mod tree;

use serde::Serialize;

use crate::model::{Node, PageTemplate};
use ancestry::AncestryTracker;
use oracle::LayoutOracle;
use page::{Page, PageLayout};
use page_break::{decide_break, BreakDecision, BreakDirectives};
use tree::{BoxId, BoxInfo, BoxTree};

/// An atomic box that did not fit even on a page of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overflow {
    /// 0-based index of the page the box was left on.
    pub page: usize,
    /// Id of the offending source node, if it had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// Content region height measured with the box in place.
    pub height: f64,
    /// The page's locked content height.
    pub limit: f64,
    #[serde(skip)]
    pub box_id: BoxId,
}

/// The paginated result: every page lives in one shared box tree.
#[derive(Debug)]
pub struct PageSet {
    pub tree: BoxTree,
    pub pages: Vec<Page>,
    pub overflows: Vec<Overflow>,
}

impl PageSet {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Texts of the leaves in a page's content region, in document order.
    /// Ancestor clones carry no text of their own and drop out.
    pub fn content_texts(&self, index: usize) -> Vec<String> {
        let content = self.pages[index].content;
        self.tree
            .descendants(content)
            .filter(|id| !self.tree.has_children(*id))
            .filter_map(|id| self.tree.get(id).text.clone())
            .collect()
    }

    /// Flattened text of a page's header region.
    pub fn header_text(&self, index: usize) -> String {
        self.tree.text_content(self.pages[index].header)
    }

    /// Flattened text of a page's footer region.
    pub fn footer_text(&self, index: usize) -> String {
        self.tree.text_content(self.pages[index].footer)
    }

    /// Whether a recorded overflow explains page `index` exceeding its height.
    pub fn has_overflow(&self, index: usize) -> bool {
        self.overflows.iter().any(|o| o.page == index)
    }
}

/// Where content goes next. Passed explicitly through the recursion.
#[derive(Debug)]
struct Cursor<'a> {
    page: usize,
    insertion: BoxId,
    ancestry: AncestryTracker<'a>,
    /// A `break-after` is waiting for the next piece of content.
    pending_break: bool,
    /// Something other than reopened ancestors is on the current page.
    placed_on_page: bool,
}

/// Distributes a source tree over pages.
#[derive(Debug, Clone)]
pub struct Paginator<O: LayoutOracle> {
    oracle: O,
    template: PageTemplate,
    page_classes: Vec<String>,
}

impl<O: LayoutOracle> Paginator<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            template: PageTemplate::default(),
            page_classes: Vec::new(),
        }
    }

    pub fn with_template(mut self, template: PageTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_page_classes(mut self, classes: Vec<String>) -> Self {
        self.page_classes = classes;
        self
    }

    /// Paginate the children of `root`. The root itself stands for the
    /// content region and is not cloned.
    pub fn render(&self, root: &Node) -> PageSet {
        let mut tree = BoxTree::new();
        let layout = PageLayout::prepare(&mut tree, &self.template, &self.oracle);
        let mut pass = Pass {
            oracle: &self.oracle,
            classes: &self.page_classes,
            layout,
            tree,
            pages: Vec::new(),
            overflows: Vec::new(),
        };

        let first = pass.layout.insert_page(&mut pass.tree, 0, pass.classes, pass.oracle);
        let mut cursor = Cursor {
            page: 0,
            insertion: first.content,
            ancestry: AncestryTracker::new(),
            pending_break: false,
            placed_on_page: false,
        };
        pass.pages.push(first);

        pass.process_content(root, &mut cursor);
        pass.layout.finish_layout(&mut pass.tree, &mut pass.pages);

        log::debug!(
            "paginated into {} pages, {} oversized boxes",
            pass.pages.len(),
            pass.overflows.len()
        );
        PageSet {
            tree: pass.tree,
            pages: pass.pages,
            overflows: pass.overflows,
        }
    }
}

/// State of one render: the output under construction.
struct Pass<'p, O: LayoutOracle> {
    oracle: &'p O,
    classes: &'p [String],
    layout: PageLayout,
    tree: BoxTree,
    pages: Vec<Page>,
    overflows: Vec<Overflow>,
}

impl<'p, O: LayoutOracle> Pass<'p, O> {
    fn process_content<'a>(&mut self, parent: &'a Node, cursor: &mut Cursor<'a>) {
        for (i, child) in parent.children.iter().enumerate() {
            let directives = BreakDirectives::of(child);

            if directives.break_before || cursor.pending_break {
                self.break_page(cursor);
            }

            if child.has_children() && !directives.avoid_break_inside {
                self.process_container(child, &parent.children[..i], cursor);
            } else {
                self.place_atomic(child, cursor);
            }

            if directives.break_after {
                cursor.pending_break = true;
            }
        }
    }

    fn process_container<'a>(&mut self, node: &'a Node, preceding: &'a [Node], cursor: &mut Cursor<'a>) {
        let wrapper = self.tree.append_shallow(cursor.insertion, node);
        cursor.insertion = wrapper;
        cursor.ancestry.push(node, preceding);

        self.process_content(node, cursor);

        cursor.ancestry.pop();
        let current = cursor.insertion;
        cursor.insertion = self
            .tree
            .parent(current)
            .unwrap_or(self.pages[cursor.page].content);

        // A break may have moved all of this container's content to a later
        // page; an empty clone would still render as a box.
        for clone in [wrapper, current] {
            if !self.tree.is_removed(clone) && !self.tree.has_children(clone) {
                self.tree.remove(clone);
            }
        }
    }

    fn place_atomic(&mut self, node: &Node, cursor: &mut Cursor<'_>) {
        let (clone, height) = self.insert_and_measure(node, cursor);
        let limit = self.pages[cursor.page].content_height;

        match decide_break(height, limit, cursor.placed_on_page) {
            BreakDecision::Place => {}
            BreakDecision::MoveToNextPage => {
                self.tree.remove(clone);
                self.new_page(cursor);
                let (clone, height) = self.insert_and_measure(node, cursor);
                let limit = self.pages[cursor.page].content_height;
                if decide_break(height, limit, false) == BreakDecision::AcceptOverflow {
                    self.record_overflow(node, clone, height, cursor);
                }
            }
            BreakDecision::AcceptOverflow => self.record_overflow(node, clone, height, cursor),
        }
        cursor.placed_on_page = true;
    }

    fn insert_and_measure(&mut self, node: &Node, cursor: &Cursor<'_>) -> (BoxId, f64) {
        let clone = self.tree.append_deep(cursor.insertion, node);
        let height = self
            .oracle
            .measure_height(&self.tree, self.pages[cursor.page].content);
        log::trace!(
            "placed <{}> on page {}, content height now {}",
            node.tag,
            cursor.page + 1,
            height
        );
        (clone, height)
    }

    fn record_overflow(&mut self, node: &Node, clone: BoxId, height: f64, cursor: &Cursor<'_>) {
        let limit = self.pages[cursor.page].content_height;
        log::warn!(
            "<{}>{} cannot be rendered to page {}, it overflows by itself ({} > {})",
            node.tag,
            node.id.as_deref().map(|id| format!(" #{}", id)).unwrap_or_default(),
            cursor.page + 1,
            height,
            limit
        );
        self.overflows.push(Overflow {
            page: cursor.page,
            node_id: node.id.clone(),
            height,
            limit,
            box_id: clone,
        });
    }

    /// Honor a forced break. A page holding nothing yet already satisfies it.
    fn break_page(&mut self, cursor: &mut Cursor<'_>) {
        cursor.pending_break = false;
        if cursor.placed_on_page {
            self.new_page(cursor);
        } else {
            log::debug!("forced break on empty page {} skipped", cursor.page + 1);
        }
    }

    fn new_page(&mut self, cursor: &mut Cursor<'_>) {
        let index = self.pages.len();
        let page = self
            .layout
            .insert_page(&mut self.tree, index, self.classes, self.oracle);
        cursor.insertion = cursor.ancestry.render_levels(&mut self.tree, &page);
        cursor.page = index;
        cursor.pending_break = false;
        cursor.placed_on_page = false;
        self.pages.push(page);
    }
}

// ── Serializable layout metadata (for the CLI / debugging) ──────────

/// Complete snapshot of a page set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    pub pages: Vec<PageInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overflows: Vec<Overflow>,
}

/// Snapshot of a single page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub number: usize,
    pub classes: Vec<String>,
    pub width: f64,
    pub height: f64,
    pub header_height: f64,
    pub content_height: f64,
    pub footer_height: f64,
    pub header: Vec<BoxInfo>,
    pub content: Vec<BoxInfo>,
    pub footer: Vec<BoxInfo>,
}

impl LayoutInfo {
    pub fn from_page_set(set: &PageSet) -> Self {
        let region = |id: BoxId| -> Vec<BoxInfo> {
            set.tree.children(id).map(|c| set.tree.snapshot(c)).collect()
        };
        LayoutInfo {
            pages: set
                .pages
                .iter()
                .map(|page| PageInfo {
                    number: page.number(),
                    classes: page.classes.clone(),
                    width: page.width,
                    height: page.height,
                    header_height: page.header_height,
                    content_height: page.content_height,
                    footer_height: page.footer_height,
                    header: region(page.header),
                    content: region(page.content),
                    footer: region(page.footer),
                })
                .collect(),
            overflows: set.overflows.clone(),
        }
    }
}
