use crate::model::Row;

/// Merges a row's fragments into cells, left to right.
///
/// Blank fragments are skipped and do not move the right edge used for the
/// next gap. A gap above `threshold` starts a new cell; a gap of at least
/// `noise_floor` inside a cell becomes a single space.
pub(crate) fn assemble_cells(row: &Row, threshold: f64, noise_floor: f64) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut last_right: Option<f64> = None;

    for fragment in &row.fragments {
        if fragment.text.trim().is_empty() {
            continue;
        }

        match last_right.map(|right| fragment.x - right) {
            Some(gap) if gap > threshold => {
                flush_cell(&mut current, &mut cells);
                current.push_str(&fragment.text);
            }
            Some(gap) => {
                if gap >= noise_floor {
                    current.push(' ');
                }
                current.push_str(&fragment.text);
            }
            None => current.push_str(&fragment.text),
        }
        last_right = Some(fragment.right());
    }

    flush_cell(&mut current, &mut cells);
    cells
}

fn flush_cell(current: &mut String, cells: &mut Vec<String>) {
    let cell = current.trim();
    if !cell.is_empty() {
        cells.push(cell.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::assemble_cells;
    use crate::model::{Row, TextFragment};

    fn row(fragments: &[(&str, f64, f64)]) -> Row {
        Row {
            representative_y: 100.0,
            fragments: fragments
                .iter()
                .map(|&(text, x, width)| TextFragment::new(x, 100.0, width, text))
                .collect(),
        }
    }

    #[test]
    fn wide_gap_splits_cells() {
        let row = row(&[("Name", 0.0, 40.0), ("Alice", 100.0, 40.0)]);
        let cells = assemble_cells(&row, 20.0, 2.0);
        assert_eq!(cells, vec!["Name", "Alice"]);
    }

    #[test]
    fn kerning_gap_joins_without_space() {
        let row = row(&[("Ali", 0.0, 20.0), ("ce", 21.0, 15.0)]);
        let cells = assemble_cells(&row, 20.0, 2.0);
        assert_eq!(cells, vec!["Alice"]);
    }

    #[test]
    fn word_gap_joins_with_space() {
        let row = row(&[("Hello", 0.0, 40.0), ("World", 45.0, 40.0)]);
        let cells = assemble_cells(&row, 20.0, 2.0);
        assert_eq!(cells, vec!["Hello World"]);
    }

    #[test]
    fn gap_equal_to_threshold_stays_in_cell() {
        let row = row(&[("a", 0.0, 10.0), ("b", 30.0, 10.0)]);
        let cells = assemble_cells(&row, 20.0, 2.0);
        assert_eq!(cells, vec!["a b"]);
    }

    #[test]
    fn blank_fragments_do_not_advance_right_edge() {
        // the blank run would bridge the gap if its width counted
        let cells = assemble_cells(
            &row(&[("Qty", 0.0, 30.0), ("   ", 31.0, 60.0), ("12", 95.0, 10.0)]),
            20.0,
            2.0,
        );
        assert_eq!(cells, vec!["Qty", "12"]);
    }

    #[test]
    fn blank_only_row_has_no_cells() {
        let row = row(&[(" ", 0.0, 5.0), ("\t", 40.0, 5.0)]);
        let cells = assemble_cells(&row, 20.0, 2.0);
        assert!(cells.is_empty());
    }

    #[test]
    fn cell_text_is_trimmed() {
        let cells = assemble_cells(
            &row(&[(" Total ", 0.0, 40.0), ("9.50 ", 200.0, 30.0)]),
            20.0,
            2.0,
        );
        assert_eq!(cells, vec!["Total", "9.50"]);
    }
}
