//! # Page Factory
//!
//! Pages are stamped from a [`PageTemplate`]: a `div.page` with zero-margin
//! `header`, `content` and `footer` regions. The page's outer size comes from
//! a probe measured once in [`PageLayout::prepare`]; each region's height is
//! measured and locked right after the page is attached, before any content
//! goes in, so later insertions cannot change the page's footprint.

use serde::Serialize;

use super::oracle::LayoutOracle;
use super::tree::{BoxId, BoxTree, Extent, LayoutBox};
use crate::model::PageTemplate;

/// Subtracted from the last page's locked height so renderers that round
/// up do not emit a trailing blank page.
pub const LAST_PAGE_EPSILON: f64 = 0.4;

/// Class given to pages when the caller asks for none.
pub const DEFAULT_PAGE_CLASS: &str = "default";

/// One output page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 0-based position in the page set.
    pub index: usize,
    pub classes: Vec<String>,
    pub width: f64,
    pub height: f64,
    pub header_height: f64,
    pub content_height: f64,
    pub footer_height: f64,
    #[serde(skip)]
    pub root: BoxId,
    #[serde(skip)]
    pub header: BoxId,
    #[serde(skip)]
    pub content: BoxId,
    #[serde(skip)]
    pub footer: BoxId,
}

impl Page {
    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// Creates pages with dimensions measured once from the template.
#[derive(Debug, Clone)]
pub struct PageLayout {
    template: PageTemplate,
    page_width: f64,
    page_height: f64,
}

impl PageLayout {
    /// Measure the template's page size with a detached probe page.
    pub fn prepare<O: LayoutOracle>(tree: &mut BoxTree, template: &PageTemplate, oracle: &O) -> Self {
        let (width, height) = template.size.dimensions();
        let mut probe = LayoutBox::div(&["page", DEFAULT_PAGE_CLASS]);
        probe.width = Some(width);
        probe.extent = Extent::Fixed(height);
        let probe = tree.append(tree.root(), probe);

        let page_width = oracle.measure_width(tree, probe);
        let page_height = oracle.measure_height(tree, probe);
        tree.remove(probe);

        log::debug!("page template measured at {}x{}", page_width, page_height);
        Self {
            template: template.clone(),
            page_width,
            page_height,
        }
    }

    /// Append a fresh page to the pages wrapper and lock its regions.
    pub fn insert_page<O: LayoutOracle>(
        &self,
        tree: &mut BoxTree,
        index: usize,
        classes: &[String],
        oracle: &O,
    ) -> Page {
        let mut page_classes = vec!["page".to_string()];
        if classes.is_empty() {
            page_classes.push(DEFAULT_PAGE_CLASS.to_string());
        } else {
            page_classes.extend(classes.iter().cloned());
        }

        let root = tree.append(
            tree.root(),
            LayoutBox {
                classes: page_classes.clone(),
                width: Some(self.page_width),
                extent: Extent::Fixed(self.page_height),
                ..LayoutBox::div(&[])
            },
        );
        let header = tree.append(root, region("header", Extent::Fixed(self.template.header_height)));
        let content = tree.append(root, region("content", Extent::Fill));
        let footer = tree.append(root, region("footer", Extent::Fixed(self.template.footer_height)));

        for node in &self.template.header {
            tree.append_deep(header, node);
        }
        for node in &self.template.footer {
            tree.append_deep(footer, node);
        }

        let header_height = lock_height(tree, header, oracle);
        let footer_height = lock_height(tree, footer, oracle);
        let content_height = lock_height(tree, content, oracle);

        log::debug!(
            "page {} created, content region locked at {}",
            index + 1,
            content_height
        );

        Page {
            index,
            classes: page_classes,
            width: self.page_width,
            height: self.page_height,
            header_height,
            content_height,
            footer_height,
            root,
            header,
            content,
            footer,
        }
    }

    /// Apply the last-page height correction once every page is final.
    pub fn finish_layout(&self, tree: &mut BoxTree, pages: &mut [Page]) {
        adjust_last_page(tree, pages);
    }
}

fn region(class: &str, extent: Extent) -> LayoutBox {
    LayoutBox {
        width: None,
        extent,
        ..LayoutBox::div(&[class])
    }
}

fn lock_height<O: LayoutOracle>(tree: &mut BoxTree, id: BoxId, oracle: &O) -> f64 {
    let height = oracle.measure_height(tree, id);
    tree.get_mut(id).extent = Extent::Locked(height);
    height
}

/// Shrink the final page by [`LAST_PAGE_EPSILON`].
pub fn adjust_last_page(tree: &mut BoxTree, pages: &mut [Page]) {
    let Some(last) = pages.last_mut() else {
        return;
    };
    last.height = (last.height - LAST_PAGE_EPSILON).max(0.0);
    tree.get_mut(last.root).extent = Extent::Fixed(last.height);
}
