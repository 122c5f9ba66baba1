use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// Courier advances 0.6 em per glyph.
pub const FONT_SIZE: f64 = 12.0;
pub const GLYPH_WIDTH: f64 = FONT_SIZE * 0.6;

#[derive(Debug, Clone)]
pub struct PlacedText {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Lays out each cell word by word, one shown string per word, separated by
/// one space advance. `cells` holds the x of each cell's first word.
pub fn table_row(y: f64, cells: &[(f64, &str)]) -> Vec<PlacedText> {
    let mut placed = Vec::new();
    for (start, text) in cells {
        let mut x = *start;
        for word in text.split_whitespace() {
            placed.push(PlacedText {
                x,
                y,
                text: word.to_string(),
            });
            let glyphs = u32::try_from(word.chars().count()).expect("short word");
            x += (f64::from(glyphs) + 1.0) * GLYPH_WIDTH;
        }
    }
    placed
}

pub fn create_table_pdf(
    path: &Path,
    pages: &[Vec<PlacedText>],
) -> Result<(), Box<dyn std::error::Error>> {
    let pages = pages
        .iter()
        .map(|texts| ("F1", texts.as_slice()))
        .collect::<Vec<_>>();
    create_pdf_with_fonts(path, &pages)
}

/// Like [`create_table_pdf`], but each page selects its font resource by
/// name. Only `F1` (Courier) is defined in the page resources.
pub fn create_pdf_with_fonts(
    path: &Path,
    pages: &[(&str, &[PlacedText])],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids = Vec::new();

    for (font, texts) in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font.as_bytes().to_vec()), FONT_SIZE.into()],
            ),
        ];

        for placed in *texts {
            operations.push(Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    placed.x.into(),
                    placed.y.into(),
                ],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(placed.text.as_str())],
            ));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(path)?;
    Ok(())
}

pub fn invoice_page() -> Vec<PlacedText> {
    [
        table_row(750.0, &[(50.0, "Item description and notes"), (400.0, "Amount")]),
        table_row(730.0, &[(50.0, "Blue ballpoint pen x10"), (400.0, "12.00")]),
        table_row(710.0, &[(50.0, "Red ink refill pack"), (400.0, "4.50")]),
    ]
    .concat()
}

pub fn region_page() -> Vec<PlacedText> {
    [
        table_row(760.0, &[(60.0, "Region of the city"), (420.0, "Pop")]),
        table_row(740.0, &[(60.0, "North river bank area"), (420.0, "1200")]),
    ]
    .concat()
}
