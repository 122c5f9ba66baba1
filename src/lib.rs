//! Rebuilds row/cell tables from the positioned text of PDF pages.
//!
//! Each page's text fragments are grouped into rows by baseline, then split
//! into cells using a gap threshold derived from that page's own spacing.
//! Pages are processed independently and concatenated in document order.

mod aggregate;
mod cell_assembler;
mod error;
mod export;
mod gap_stats;
mod model;
mod options;
mod pdf_reader;
mod row_cluster;
mod warning;

use std::path::Path;

use tracing::debug;

pub use aggregate::{FragmentSource, build_table_matrix, reconstruct_page};
pub use error::{ExtractError, FragmentError};
pub use model::{MatrixRow, Row, TableMatrix, TextFragment};
pub use options::{
    DEFAULT_EMPTY_MEDIAN, DEFAULT_GAP_FLOOR, DEFAULT_GAP_MULTIPLIER, DEFAULT_NOISE_FLOOR,
    DEFAULT_ROW_PROXIMITY, ExtractOptions, OutputFormat, PageSelection, ReconstructionParams,
};
pub use pdf_reader::PdfFragmentSource;
pub use warning::{ExtractWarning, WarningCode as ExtractWarningCode};

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    pub row_count: usize,
    pub column_count: usize,
    pub warnings: Vec<ExtractWarning>,
}

fn validate_options(options: &ExtractOptions) -> Result<(), ExtractError> {
    if matches!(options.delimiter, b'"' | b'\n' | b'\r') || !options.delimiter.is_ascii() {
        return Err(ExtractError::InvalidOption(format!(
            "unusable delimiter {:?}",
            char::from(options.delimiter)
        )));
    }
    options.params.validate()
}

/// Callers validate `options` first.
fn extract_from_source<S>(
    source: &mut S,
    options: &ExtractOptions,
) -> Result<(TableMatrix, ExtractionReport), ExtractError>
where
    S: FragmentSource + ?Sized,
{
    let mut warnings = Vec::new();
    let matrix = aggregate::collect_matrix(source, &options.params, &mut warnings)?;
    debug!(
        rows = matrix.row_count(),
        columns = matrix.column_count(),
        warnings = warnings.len(),
        "table matrix built"
    );

    let report = ExtractionReport {
        row_count: matrix.row_count(),
        column_count: matrix.column_count(),
        warnings,
    };
    Ok((matrix, report))
}

/// Renders a matrix in the format selected by `options`.
pub fn render_matrix(
    matrix: &TableMatrix,
    options: &ExtractOptions,
) -> Result<String, ExtractError> {
    validate_options(options)?;
    export::write_to_string(matrix, options)
}

/// Reconstructs tables from any fragment source and renders them.
pub fn extract_source_to_string<S>(
    source: &mut S,
    options: &ExtractOptions,
) -> Result<(String, ExtractionReport), ExtractError>
where
    S: FragmentSource + ?Sized,
{
    validate_options(options)?;

    let (matrix, report) = extract_from_source(source, options)?;
    let rendered = export::write_to_string(&matrix, options)?;
    Ok((rendered, report))
}

pub fn extract_pdf_to_file(
    input_pdf: &Path,
    output: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    validate_options(options)?;

    let mut source = PdfFragmentSource::open(input_pdf, options.pages.as_ref())?;
    let (matrix, report) = extract_from_source(&mut source, options)?;
    export::write_to_path(output, &matrix, options)?;

    Ok(report)
}

pub fn extract_pdf_bytes_to_string(
    input_pdf: &[u8],
    options: &ExtractOptions,
) -> Result<(String, ExtractionReport), ExtractError> {
    validate_options(options)?;

    let mut source = PdfFragmentSource::from_bytes(input_pdf, options.pages.as_ref())?;
    let (matrix, report) = extract_from_source(&mut source, options)?;
    let rendered = export::write_to_string(&matrix, options)?;
    Ok((rendered, report))
}
