use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("invalid page selection: {0}")]
    InvalidPageSelection(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("no pages available after applying selection")]
    NoPagesSelected,

    /// Every page produced zero rows; usually the PDF has no text layer.
    #[error("no tabular text found in the selected pages")]
    NoTabularText,
}

/// Failure to produce fragments for a single page. Recovered by the
/// aggregator: the page contributes zero rows.
#[derive(Debug, Error)]
#[error("page {page}: {reason}")]
pub struct FragmentError {
    pub page: u32,
    pub reason: String,
}

impl FragmentError {
    #[must_use]
    pub fn new(page: u32, reason: impl Into<String>) -> Self {
        Self {
            page,
            reason: reason.into(),
        }
    }
}
