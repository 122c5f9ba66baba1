use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use lopdf::Document;
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};
use tracing::debug;

use crate::aggregate::FragmentSource;
use crate::error::{ExtractError, FragmentError};
use crate::model::TextFragment;
use crate::options::PageSelection;
use crate::warning::{ExtractWarning, WarningCode};

/// Glyphs further apart vertically than this belong to different runs.
const BASELINE_TOLERANCE: f64 = 0.5;

fn looks_decoding_broken(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return false;
    }

    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

#[derive(Debug)]
struct GlyphRun {
    x: f64,
    y: f64,
    end: f64,
    ink_end: Option<f64>,
    text: String,
}

impl GlyphRun {
    fn into_fragment(self) -> TextFragment {
        let right = self.ink_end.unwrap_or(self.end);
        TextFragment::new(self.x, self.y, (right - self.x).max(0.0), self.text)
    }
}

/// Turns the glyph stream of one page into fragments, one per shown string.
#[derive(Debug, Default)]
struct FragmentCollector {
    fragments: Vec<TextFragment>,
    run: Option<GlyphRun>,
}

impl FragmentCollector {
    fn finish_run(&mut self) {
        if let Some(run) = self.run.take() {
            self.fragments.push(run.into_fragment());
        }
    }
}

impl OutputDev for FragmentCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        self.fragments.clear();
        self.run = None;
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        self.finish_run();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> Result<(), OutputError> {
        let (x, y) = (trm.m31, trm.m32);
        let advance = width * font_size * trm.m11.hypot(trm.m12);
        let end = x + advance;
        let is_ink = !char.trim().is_empty();

        let continues_run = self.run.as_ref().is_some_and(|run| {
            (run.y - y).abs() <= BASELINE_TOLERANCE && x + BASELINE_TOLERANCE >= run.x
        });
        if !continues_run {
            self.finish_run();
        }

        let run = self.run.get_or_insert_with(|| GlyphRun {
            x,
            y,
            end,
            ink_end: None,
            text: String::new(),
        });
        run.text.push_str(char);
        run.end = run.end.max(end);
        if is_ink {
            run.ink_end = Some(run.ink_end.map_or(end, |ink_end| ink_end.max(end)));
        }
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        self.finish_run();
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        self.finish_run();
        Ok(())
    }
}

/// Fragment source backed by a PDF's text layer.
pub struct PdfFragmentSource {
    document: Document,
    pages: Vec<u32>,
    warnings: Vec<ExtractWarning>,
}

impl PdfFragmentSource {
    pub fn open(input_pdf: &Path, selection: Option<&PageSelection>) -> Result<Self, ExtractError> {
        let document = Document::load(input_pdf)?;
        Self::from_document(document, selection)
    }

    pub fn from_bytes(
        input_pdf: &[u8],
        selection: Option<&PageSelection>,
    ) -> Result<Self, ExtractError> {
        let document = Document::load_mem(input_pdf)?;
        Self::from_document(document, selection)
    }

    fn from_document(
        document: Document,
        selection: Option<&PageSelection>,
    ) -> Result<Self, ExtractError> {
        let pages = document
            .get_pages()
            .into_keys()
            .filter(|page| selection.is_none_or(|selection| selection.contains(*page)))
            .collect::<Vec<_>>();

        if pages.is_empty() {
            return Err(ExtractError::NoPagesSelected);
        }

        Ok(Self {
            document,
            pages,
            warnings: Vec::new(),
        })
    }
}

impl FragmentSource for PdfFragmentSource {
    fn page_numbers(&self) -> Vec<u32> {
        self.pages.clone()
    }

    fn page_fragments(&mut self, page: u32) -> Result<Vec<TextFragment>, FragmentError> {
        let mut collector = FragmentCollector::default();
        // pdf-extract panics on some malformed fonts
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::output_doc_page(&self.document, &mut collector, page)
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(error)) => return Err(FragmentError::new(page, error.to_string())),
            Err(_) => {
                return Err(FragmentError::new(
                    page,
                    "text extraction aborted on malformed page content",
                ));
            }
        }

        let text = collector
            .fragments
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect::<String>();
        if looks_decoding_broken(&text) {
            self.warnings.push(
                ExtractWarning::new(
                    WarningCode::SuspectTextLayer,
                    "page text looks undecodable; cells may contain garbage",
                )
                .with_page(page),
            );
        }

        debug!(page, fragments = collector.fragments.len(), "read page fragments");
        Ok(collector.fragments)
    }

    fn drain_warnings(&mut self) -> Vec<ExtractWarning> {
        std::mem::take(&mut self.warnings)
    }
}
