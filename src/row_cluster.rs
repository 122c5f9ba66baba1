use crate::model::{Row, TextFragment};

/// Groups a page's fragments into visual rows, top of page first.
///
/// A fragment joins the first row whose representative y is strictly closer
/// than `proximity`; a difference exactly equal to `proximity` opens a new
/// row. The representative y moves halfway towards each joining fragment, so
/// it is a decaying average rather than the mean of all members.
pub(crate) fn cluster_rows(fragments: &[TextFragment], proximity: f64) -> Vec<Row> {
    let mut ordered = fragments.iter().collect::<Vec<_>>();
    ordered.sort_by(|a, b| b.y.total_cmp(&a.y));

    let mut rows: Vec<Row> = Vec::new();
    for fragment in ordered {
        if let Some(row) = rows
            .iter_mut()
            .find(|row| (row.representative_y - fragment.y).abs() < proximity)
        {
            row.representative_y = (row.representative_y + fragment.y) / 2.0;
            row.fragments.push(fragment.clone());
        } else {
            rows.push(Row {
                representative_y: fragment.y,
                fragments: vec![fragment.clone()],
            });
        }
    }

    for row in &mut rows {
        row.fragments.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    rows
}
