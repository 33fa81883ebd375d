//! Structured error types for the pagination engine.
//!
//! Pagination and decoration themselves never fail: overflow and missing
//! references are handled locally. What can fail is reading the input
//! document, validating its page template, and the CLI's file I/O.

use thiserror::Error;

/// The unified error type returned by all public fallible APIs.
#[derive(Debug, Error)]
pub enum PaginateError {
    /// JSON input failed to parse as a valid document.
    #[error("Failed to parse document: {source}{}", render_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// The page template cannot produce a usable page.
    #[error("Invalid page template: {0}")]
    InvalidTemplate(String),
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn render_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for PaginateError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        PaginateError::Parse { source: e, hint }
    }
}
