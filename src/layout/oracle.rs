//! # Layout Oracle
//!
//! The paginator never computes geometry. It inserts a box, then asks an
//! oracle how tall the page's content region has become. Production callers
//! back the trait with a real layout engine; [`BlockOracle`] is a small
//! deterministic block-flow model that is good enough for print documents
//! made of stacked boxes, and doubles as a lookup-table oracle in tests.

use std::collections::HashMap;

use super::tree::{BoxId, BoxTree, Extent};
use crate::style::Display;

/// Measures boxes in their current position in the tree.
///
/// Implementations must be side-effect free and stable: the same box in the
/// same position with the same content measures the same. A box that cannot
/// be measured (detached, hidden) reports `0.0`.
pub trait LayoutOracle {
    /// Rendered outer height of `id`.
    fn measure_height(&self, tree: &BoxTree, id: BoxId) -> f64;

    /// Rendered outer width of `id`.
    fn measure_width(&self, tree: &BoxTree, id: BoxId) -> f64;
}

impl<T: LayoutOracle + ?Sized> LayoutOracle for &T {
    fn measure_height(&self, tree: &BoxTree, id: BoxId) -> f64 {
        (**self).measure_height(tree, id)
    }

    fn measure_width(&self, tree: &BoxTree, id: BoxId) -> f64 {
        (**self).measure_width(tree, id)
    }
}

/// Default height of a line of text when a box sets no `lineHeight`.
pub const DEFAULT_LINE_HEIGHT: f64 = 16.8;

/// Block-flow measurement.
///
/// - `display: none` boxes take no space.
/// - Children stack vertically, except in table rows where the row is as
///   tall as its tallest cell.
/// - Leaves are as tall as their explicit `height`, or one line per line
///   of text.
/// - [`Extent::Fixed`] boxes are exactly that tall; [`Extent::Locked`] boxes
///   are at least that tall; [`Extent::Fill`] boxes take what their parent's
///   other children leave and grow with content beyond that.
/// - Heights registered with [`BlockOracle::with_height`] override all of
///   the above for boxes with that id.
#[derive(Debug, Clone, Default)]
pub struct BlockOracle {
    heights: HashMap<String, f64>,
    line_height: Option<f64>,
}

impl BlockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `height` for every box whose id is `id`.
    pub fn with_height(mut self, id: &str, height: f64) -> Self {
        self.heights.insert(id.to_string(), height);
        self
    }

    /// Line height for text leaves without their own `lineHeight`.
    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = Some(line_height);
        self
    }

    fn content_height(&self, tree: &BoxTree, id: BoxId) -> f64 {
        let data = tree.get(id);
        let children = tree.children(id).map(|c| self.measure_height(tree, c));
        let stacked = if data.style.display(&data.tag) == Display::TableRow {
            children.fold(0.0, f64::max)
        } else {
            children.sum()
        };
        let own = if tree.has_children(id) {
            stacked
        } else {
            self.leaf_height(tree, id)
        };
        own + data.style.padding_vertical()
    }

    fn leaf_height(&self, tree: &BoxTree, id: BoxId) -> f64 {
        let data = tree.get(id);
        if let Some(height) = data.style.height {
            return height;
        }
        match &data.text {
            Some(text) if !text.is_empty() => {
                let line = data
                    .style
                    .line_height
                    .or(self.line_height)
                    .unwrap_or(DEFAULT_LINE_HEIGHT);
                line * text.lines().count().max(1) as f64
            }
            _ => 0.0,
        }
    }

    /// Height a `Fill` box gets before content: the parent's height minus
    /// everything its siblings take.
    fn fill_height(&self, tree: &BoxTree, id: BoxId) -> f64 {
        let Some(parent) = tree.parent(id) else {
            return 0.0;
        };
        let parent_height = match tree.get(parent).extent {
            Extent::Fixed(h) | Extent::Locked(h) => h,
            _ => return 0.0,
        };
        let siblings: f64 = tree
            .children(parent)
            .filter(|s| *s != id)
            .map(|s| self.measure_height(tree, s))
            .sum();
        (parent_height - siblings).max(0.0)
    }
}

impl LayoutOracle for BlockOracle {
    fn measure_height(&self, tree: &BoxTree, id: BoxId) -> f64 {
        let data = tree.get(id);
        if let Some(height) = data.id.as_ref().and_then(|i| self.heights.get(i)) {
            return *height;
        }
        if data.style.display(&data.tag) == Display::None {
            return 0.0;
        }
        match data.extent {
            Extent::Fixed(h) => h,
            Extent::Locked(h) => h.max(self.content_height(tree, id)),
            Extent::Fill => self.fill_height(tree, id).max(self.content_height(tree, id)),
            Extent::Auto => match data.style.height {
                Some(h) if tree.has_children(id) => h,
                _ => self.content_height(tree, id),
            },
        }
    }

    fn measure_width(&self, tree: &BoxTree, id: BoxId) -> f64 {
        let data = tree.get(id);
        if data.style.display(&data.tag) == Display::None {
            return 0.0;
        }
        if let Some(width) = data.width.or(data.style.width) {
            return width;
        }
        match tree.parent(id) {
            Some(parent) => self.measure_width(tree, parent),
            None => 0.0,
        }
    }
}
