//! # Page Break Decisions
//!
//! The two rule sets that decide where page boundaries fall: the break
//! directives a box carries, and what to do with an atomic box once the
//! oracle says the page no longer fits.

use crate::model::{Node, BREAK_AFTER_ATTR, BREAK_BEFORE_ATTR, NO_BREAK_ATTR};

/// Break directives of one source box, reduced to booleans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakDirectives {
    /// Start a new page before this box.
    pub break_before: bool,
    /// Place this box's subtree as one unit.
    pub avoid_break_inside: bool,
    /// Start a new page after this box.
    pub break_after: bool,
}

impl BreakDirectives {
    /// Read the directives from `node`'s computed style and its legacy
    /// `breakbefore` / `nobreak` / `breakafter` attributes.
    pub fn of(node: &Node) -> Self {
        let style = &node.style;
        Self {
            break_before: style.break_before.is_some_and(|b| b.is_forced())
                || node.has_attr(BREAK_BEFORE_ATTR),
            avoid_break_inside: style.break_inside.is_some_and(|b| b.avoids_break())
                || node.has_attr(NO_BREAK_ATTR),
            break_after: style.break_after.is_some_and(|b| b.is_forced())
                || node.has_attr(BREAK_AFTER_ATTR),
        }
    }
}

/// What to do with an atomic box after inserting and measuring it.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// The content region still fits.
    Place,
    /// Take the box back out and retry on a new page.
    MoveToNextPage,
    /// The box overflows a page holding nothing else; moving it would not
    /// help, so it stays, oversized.
    AcceptOverflow,
}

/// Decide given the content region's measured height after insertion, its
/// locked height, and whether anything else was already placed on the page.
pub fn decide_break(measured: f64, locked: f64, page_has_content: bool) -> BreakDecision {
    if measured <= locked {
        return BreakDecision::Place;
    }
    if page_has_content {
        BreakDecision::MoveToNextPage
    } else {
        BreakDecision::AcceptOverflow
    }
}
