//! # Paginate
//!
//! A box-level pagination engine.
//!
//! Print layout for arbitrary content usually means letting a browser slice
//! one long canvas into pages, which tears table rows, forgets which
//! container a fragment belonged to and leaves headers and footers static.
//!
//! Paginate streams the content tree **into** pages instead. Boxes are
//! cloned onto the current page one at a time, a [`LayoutOracle`] reports
//! whether the page still fits, and on overflow the engine descends or
//! breaks. Open ancestors are reopened on every new page, table header
//! groups repeat, and a second pass fills running headers and footers from
//! named sources in the content.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]      : Source tree, page template
//!       ↓
//!   [layout]     : Paginator: oracle-driven distribution into pages
//!       ↓
//!   [decorate]   : Header/footer cross-reference resolution
//!       ↓
//!   PageSet      : One box tree holding every page
//! ```

pub mod decorate;
pub mod error;
pub mod layout;
pub mod model;
pub mod style;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use decorate::{DecorationSummary, Decorator};
pub use error::PaginateError;
pub use layout::oracle::{BlockOracle, LayoutOracle};
pub use layout::{LayoutInfo, PageSet, Paginator};

use model::Document;

/// Paginate a document and, unless it opts out, resolve its headers and
/// footers.
///
/// This is the primary entry point. Only the page template is validated;
/// pagination itself always completes.
pub fn paginate<O: LayoutOracle>(document: &Document, oracle: O) -> Result<PageSet, PaginateError> {
    document.page.validate()?;
    let paginator = Paginator::new(oracle)
        .with_template(document.page.clone())
        .with_page_classes(document.page_classes.clone());
    let mut set = paginator.render(&document.root);
    if document.decorate {
        Decorator::new(&mut set).decorate();
    }
    Ok(set)
}

/// Paginate a document described as JSON with the built-in [`BlockOracle`]
/// and return the layout snapshot as JSON.
pub fn paginate_json(json: &str) -> Result<String, PaginateError> {
    let document: Document = serde_json::from_str(json)?;
    let set = paginate(&document, BlockOracle::new())?;
    Ok(serde_json::to_string_pretty(&LayoutInfo::from_page_set(&set))?)
}
