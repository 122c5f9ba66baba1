use crate::model::Row;
use crate::options::ReconstructionParams;

/// Horizontal gaps between neighbouring fragments of every row, keeping only
/// those wider than `noise_floor`. Rows must already be sorted by x.
pub(crate) fn collect_gaps(rows: &[Row], noise_floor: f64) -> Vec<f64> {
    rows.iter()
        .flat_map(|row| {
            row.fragments
                .windows(2)
                .map(|pair| pair[1].x - pair[0].right())
        })
        .filter(|gap| *gap > noise_floor)
        .collect()
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Cell-boundary threshold for one page, derived from the page's own spacing.
pub(crate) fn page_gap_threshold(rows: &[Row], params: &ReconstructionParams) -> f64 {
    let gaps = collect_gaps(rows, params.noise_floor);
    let median = median(&gaps).unwrap_or(params.empty_median);
    (median * params.gap_multiplier).max(params.gap_floor)
}
