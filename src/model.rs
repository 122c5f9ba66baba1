use serde::Serialize;

/// A positioned run of text on one page. Coordinates use a bottom-left
/// origin, so the top of the page has the largest `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub text: String,
}

impl TextFragment {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            width,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub representative_y: f64,
    pub fragments: Vec<TextFragment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub page: u32,
    pub cells: Vec<String>,
}

/// Rows of every page in reading order. Rows are ragged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableMatrix {
    pub rows: Vec<MatrixRow>,
}

impl TableMatrix {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|row| row.cells.len()).max().unwrap_or(0)
    }

    pub(crate) fn push_page(&mut self, page: u32, rows: Vec<Vec<String>>) {
        self.rows
            .extend(rows.into_iter().map(|cells| MatrixRow { page, cells }));
    }
}
