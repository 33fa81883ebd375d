//! # Document Model
//!
//! The input representation for the paginator. A document is a single source
//! tree of nodes, each with a tag, attributes, a computed style and children,
//! plus the page template every page is stamped from.
//!
//! The model is intentionally close to the DOM: a node is what
//! `element.cloneNode(false)` would copy, and its children are what
//! `cloneNode(true)` would add. The paginator only ever reads and clones
//! these nodes; the caller's tree is never mutated.

use std::collections::BTreeMap;

use crate::error::PaginateError;
use crate::style::Style;
use serde::{Deserialize, Serialize};

/// Tag of a named content producer.
pub const SOURCE_TAG: &str = "paginate-source";
/// Tag of a named content consumer in a header or footer.
pub const TARGET_TAG: &str = "paginate-target";
/// Attribute carrying a source's or target's key.
pub const KEY_ATTR: &str = "data-key";
/// Attribute the decorator writes once a target has been resolved.
pub const STATUS_ATTR: &str = "data-status";
/// Value of [`STATUS_ATTR`] for resolved targets.
pub const STATUS_SOLVED: &str = "solved";

/// Key that seeds the header region.
pub const HEADER_KEY: &str = "header";
/// Key that seeds the footer region.
pub const FOOTER_KEY: &str = "footer";
/// Computed key: 1-based page ordinal.
pub const PAGE_NUMBER_KEY: &str = "pageNumber";
/// Computed key: number of pages in the set.
pub const TOTAL_PAGES_KEY: &str = "totalPages";
/// Keys content may not define.
pub const RESERVED_KEYS: [&str; 2] = [PAGE_NUMBER_KEY, TOTAL_PAGES_KEY];

/// Legacy boolean attribute: force a page break before the node.
pub const BREAK_BEFORE_ATTR: &str = "breakbefore";
/// Legacy boolean attribute: force a page break after the node.
pub const BREAK_AFTER_ATTR: &str = "breakafter";
/// Legacy boolean attribute: keep the node's subtree on one page.
pub const NO_BREAK_ATTR: &str = "nobreak";

/// A complete document ready for pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The source tree. Its children are distributed over pages; the root
    /// itself is the content region's stand-in and is never cloned.
    pub root: Node,

    /// Page size and the fixed header/footer content of every page.
    #[serde(default)]
    pub page: PageTemplate,

    /// Extra classes put on every page box. `default` when empty.
    #[serde(default)]
    pub page_classes: Vec<String>,

    /// Whether to run the cross-reference pass after pagination.
    #[serde(default = "default_true")]
    pub decorate: bool,
}

fn default_true() -> bool {
    true
}

impl Document {
    /// A document with the default A4 template.
    pub fn new(root: Node) -> Self {
        Self {
            root,
            page: PageTemplate::default(),
            page_classes: Vec::new(),
            decorate: true,
        }
    }
}

/// The layout every page is created from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTemplate {
    /// Page size. Defaults to A4.
    #[serde(default)]
    pub size: PageSize,

    /// Height of the header region.
    #[serde(default = "default_region_height")]
    pub header_height: f64,

    /// Height of the footer region.
    #[serde(default = "default_region_height")]
    pub footer_height: f64,

    /// Content placed in every page's header before decoration.
    #[serde(default)]
    pub header: Vec<Node>,

    /// Content placed in every page's footer before decoration.
    #[serde(default)]
    pub footer: Vec<Node>,
}

/// 2cm in points.
fn default_region_height() -> f64 {
    56.69
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            header_height: default_region_height(),
            footer_height: default_region_height(),
            header: Vec::new(),
            footer: Vec::new(),
        }
    }
}

impl PageTemplate {
    /// A template of an explicit size with empty header and footer regions.
    pub fn custom(width: f64, height: f64, header_height: f64, footer_height: f64) -> Self {
        Self {
            size: PageSize::Custom { width, height },
            header_height,
            footer_height,
            header: Vec::new(),
            footer: Vec::new(),
        }
    }

    /// Height left for the content region.
    pub fn content_height(&self) -> f64 {
        let (_, height) = self.size.dimensions();
        height - self.header_height - self.footer_height
    }

    /// Reject templates that cannot hold any content.
    pub fn validate(&self) -> Result<(), PaginateError> {
        let (width, height) = self.size.dimensions();
        if !(width > 0.0 && height > 0.0) {
            return Err(PaginateError::InvalidTemplate(format!(
                "page size must be positive, got {}x{}",
                width, height
            )));
        }
        if self.header_height < 0.0 || self.footer_height < 0.0 {
            return Err(PaginateError::InvalidTemplate(
                "header and footer heights must not be negative".to_string(),
            ));
        }
        if self.content_height() <= 0.0 {
            return Err(PaginateError::InvalidTemplate(format!(
                "header ({}) and footer ({}) leave no room on a page {} high",
                self.header_height, self.footer_height, height
            )));
        }
        Ok(())
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// A node in the source tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Element tag, lower case (`div`, `tbody`, `paginate-source`, ...).
    pub tag: String,

    /// A unique identifier for this node. Clones keep it, which makes it the
    /// box identity lookup-table oracles key on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Element attributes, including `data-key` and the legacy break flags.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Text content owned directly by this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Computed style.
    #[serde(default)]
    pub style: Style,

    /// Child nodes.
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Create an element with children.
    pub fn element(tag: &str, children: Vec<Node>) -> Self {
        Self {
            tag: tag.to_string(),
            children,
            ..Default::default()
        }
    }

    /// Create a text-bearing leaf.
    pub fn text(tag: &str, content: &str) -> Self {
        Self {
            tag: tag.to_string(),
            text: Some(content.to_string()),
            ..Default::default()
        }
    }

    /// Create a named source box holding `children`.
    pub fn source(key: &str, children: Vec<Node>) -> Self {
        Node::element(SOURCE_TAG, children).with_attr(KEY_ATTR, key)
    }

    /// Create a placeholder that resolves to the source named `key`.
    pub fn target(key: &str) -> Self {
        Node::element(TARGET_TAG, Vec::new()).with_attr(KEY_ATTR, key)
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set an explicit height, the common case for measured leaves.
    pub fn with_height(mut self, height: f64) -> Self {
        self.style.height = Some(height);
        self
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Text of every leaf in document order.
    pub fn leaf_texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_leaf_texts(&mut out);
        out
    }

    fn collect_leaf_texts(&self, out: &mut Vec<String>) {
        if self.children.is_empty() {
            if let Some(text) = &self.text {
                out.push(text.clone());
            }
        }
        for child in &self.children {
            child.collect_leaf_texts(out);
        }
    }
}
