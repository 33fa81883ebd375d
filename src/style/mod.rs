//! # Style System
//!
//! The computed-style subset the paginator reads. Geometry is the layout
//! oracle's business; the engine itself only consults the display role
//! (to recognise table bodies and their header groups) and the three break
//! properties. The sizing fields exist for oracles that lay boxes out
//! themselves, like [`crate::layout::oracle::BlockOracle`].
//!
//! Values keep their CSS spelling on the wire (`"table-header-group"`,
//! `"avoid-page"`), so documents can be produced straight from computed
//! styles of a rendered DOM.

use crate::model::Edges;
use serde::{Deserialize, Serialize};

/// The style properties for a node. Unset properties fall back to the
/// defaults of the node's tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    // ── Box Model ──────────────────────────────────────────────
    /// Display role. Defaults per tag, see [`Display::for_tag`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
    /// Explicit width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Explicit height. For leaves this is their rendered height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Height of one line of text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    /// Padding inside the box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<Edges>,

    // ── Page Behavior ──────────────────────────────────────────
    /// `break-before`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_before: Option<BreakBetween>,
    /// `break-after`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_after: Option<BreakBetween>,
    /// `break-inside`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_inside: Option<BreakInside>,
}

/// Display roles the paginator and the block oracle distinguish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    #[default]
    Block,
    Inline,
    None,
    Table,
    TableHeaderGroup,
    TableRowGroup,
    TableFooterGroup,
    TableRow,
    TableCell,
}

impl Display {
    /// User-agent default display for a tag name.
    pub fn for_tag(tag: &str) -> Display {
        match tag {
            "table" => Display::Table,
            "thead" => Display::TableHeaderGroup,
            "tbody" => Display::TableRowGroup,
            "tfoot" => Display::TableFooterGroup,
            "tr" => Display::TableRow,
            "td" | "th" => Display::TableCell,
            "span" | "a" | "b" | "i" | "em" | "strong" | "code" | "small" | "sub" | "sup" => {
                Display::Inline
            }
            crate::model::SOURCE_TAG | "template" | "style" | "script" => Display::None,
            _ => Display::Block,
        }
    }
}

/// Values of `break-before` / `break-after`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakBetween {
    #[default]
    Auto,
    Avoid,
    AvoidPage,
    Page,
    Always,
    Left,
    Right,
    Recto,
    Verso,
}

impl BreakBetween {
    /// Whether the value forces a page boundary.
    pub fn is_forced(self) -> bool {
        matches!(
            self,
            BreakBetween::Page
                | BreakBetween::Always
                | BreakBetween::Left
                | BreakBetween::Right
                | BreakBetween::Recto
                | BreakBetween::Verso
        )
    }
}

/// Values of `break-inside`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakInside {
    #[default]
    Auto,
    Avoid,
    AvoidPage,
}

impl BreakInside {
    /// Whether the subtree must not be split across pages.
    pub fn avoids_break(self) -> bool {
        matches!(self, BreakInside::Avoid | BreakInside::AvoidPage)
    }
}

impl Style {
    /// Computed display role for a node with this style and tag.
    pub fn display(&self, tag: &str) -> Display {
        self.display.unwrap_or_else(|| Display::for_tag(tag))
    }

    /// Vertical padding, zero when unset.
    pub fn padding_vertical(&self) -> f64 {
        self.padding.map(|p| p.vertical()).unwrap_or(0.0)
    }
}
