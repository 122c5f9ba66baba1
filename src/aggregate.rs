use tracing::{debug, warn};

use crate::cell_assembler::assemble_cells;
use crate::error::{ExtractError, FragmentError};
use crate::gap_stats::page_gap_threshold;
use crate::model::{TableMatrix, TextFragment};
use crate::options::ReconstructionParams;
use crate::row_cluster::cluster_rows;
use crate::warning::{ExtractWarning, WarningCode};

/// Yields the positioned text of a document one page at a time.
pub trait FragmentSource {
    /// Page numbers to process, in document order.
    fn page_numbers(&self) -> Vec<u32>;

    fn page_fragments(&mut self, page: u32) -> Result<Vec<TextFragment>, FragmentError>;

    /// Non-fatal findings gathered while producing the last page.
    fn drain_warnings(&mut self) -> Vec<ExtractWarning> {
        Vec::new()
    }
}

/// Pages supplied directly by the caller, numbered from 1.
impl FragmentSource for Vec<Vec<TextFragment>> {
    fn page_numbers(&self) -> Vec<u32> {
        (1..).take(self.len()).collect()
    }

    fn page_fragments(&mut self, page: u32) -> Result<Vec<TextFragment>, FragmentError> {
        usize::try_from(page)
            .ok()
            .and_then(|page| page.checked_sub(1))
            .and_then(|index| self.get(index))
            .cloned()
            .ok_or_else(|| FragmentError::new(page, "page does not exist"))
    }
}

/// Rows of cells for a single page. Rows without any text are dropped.
#[must_use]
pub fn reconstruct_page(
    fragments: &[TextFragment],
    params: &ReconstructionParams,
) -> Vec<Vec<String>> {
    let rows = cluster_rows(fragments, params.row_proximity);
    let threshold = page_gap_threshold(&rows, params);
    debug!(
        fragments = fragments.len(),
        rows = rows.len(),
        threshold,
        "reconstructing page"
    );

    rows.iter()
        .map(|row| assemble_cells(row, threshold, params.noise_floor))
        .filter(|cells| !cells.is_empty())
        .collect()
}

/// Runs the reconstruction over every page of `source`, in order.
///
/// Pages are independent: a page that fails to produce fragments adds a
/// warning and zero rows. A matrix with no rows at all is reported as
/// [`ExtractError::NoTabularText`].
pub fn build_table_matrix<S>(
    source: &mut S,
    params: &ReconstructionParams,
    warnings: &mut Vec<ExtractWarning>,
) -> Result<TableMatrix, ExtractError>
where
    S: FragmentSource + ?Sized,
{
    params.validate()?;
    collect_matrix(source, params, warnings)
}

/// Page loop behind [`build_table_matrix`] for callers that already
/// validated `params`.
pub(crate) fn collect_matrix<S>(
    source: &mut S,
    params: &ReconstructionParams,
    warnings: &mut Vec<ExtractWarning>,
) -> Result<TableMatrix, ExtractError>
where
    S: FragmentSource + ?Sized,
{
    let mut matrix = TableMatrix::default();
    for page in source.page_numbers() {
        let fragments = match source.page_fragments(page) {
            Ok(fragments) => fragments,
            Err(error) => {
                warn!(page, %error, "skipping page after extraction failure");
                warnings.push(
                    ExtractWarning::new(WarningCode::PageExtractionFailed, error.reason)
                        .with_page(page),
                );
                warnings.extend(source.drain_warnings());
                continue;
            }
        };
        warnings.extend(source.drain_warnings());

        if fragments.is_empty() {
            warnings.push(
                ExtractWarning::new(WarningCode::EmptyPage, "page has no text fragments")
                    .with_page(page),
            );
            continue;
        }

        let rows = reconstruct_page(&fragments, params);
        debug!(page, rows = rows.len(), "page reconstructed");
        matrix.push_page(page, rows);
    }

    if matrix.is_empty() {
        return Err(ExtractError::NoTabularText);
    }

    Ok(matrix)
}
