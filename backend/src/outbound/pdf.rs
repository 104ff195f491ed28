//! A4 PDF rendering for report exports using the built-in Helvetica faces.

use async_trait::async_trait;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use crate::domain::ReportDocument;
use crate::domain::ports::{ReportPdfRenderer, ReportRenderError};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const BODY_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 12.0;
const TITLE_SIZE: f32 = 16.0;
/// Millimetres per point.
const PT_TO_MM: f32 = 0.3528;
/// Characters per body line at [`BODY_SIZE`] across the printable width.
const WRAP_COLUMNS: usize = 95;

/// Renders report documents to PDF on a blocking thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintPdfRenderer;

#[async_trait]
impl ReportPdfRenderer for PrintPdfRenderer {
    async fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, ReportRenderError> {
        let owned = document.clone();
        tokio::task::spawn_blocking(move || render_document(&owned))
            .await
            .map_err(|error| ReportRenderError::render(error.to_string()))?
    }
}

/// Page cursor that starts a new page when the current one fills up.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, ReportRenderError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|error| ReportRenderError::render(error.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|error| ReportRenderError::render(error.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    fn line(&mut self, text: &str, size: f32, bold: bool) {
        let height = size * PT_TO_MM * 1.4;
        if self.y - height < MARGIN {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.y -= height;
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(winansi_safe(text), size, Mm(MARGIN), Mm(self.y), font);
    }

    fn gap(&mut self, millimetres: f32) {
        self.y -= millimetres;
    }

    fn paragraph(&mut self, text: &str) {
        for line in wrap_text(text, WRAP_COLUMNS) {
            self.line(&line, BODY_SIZE, false);
        }
    }

    fn finish(self) -> Result<Vec<u8>, ReportRenderError> {
        self.doc
            .save_to_bytes()
            .map_err(|error| ReportRenderError::render(error.to_string()))
    }
}

fn render_document(document: &ReportDocument) -> Result<Vec<u8>, ReportRenderError> {
    let mut writer = PageWriter::new(&document.title)?;
    writer.line(&document.hospital_name, TITLE_SIZE, true);
    writer.line(&document.title, HEADING_SIZE, true);
    writer.gap(4.0);

    for (label, value) in &document.metadata {
        writer.paragraph(&format!("{label}: {value}"));
    }

    for section in &document.sections {
        writer.gap(4.0);
        writer.line(section.heading, HEADING_SIZE, true);
        writer.gap(1.0);
        writer.paragraph(&section.body);
    }

    writer.gap(6.0);
    writer.paragraph(document.footer);
    writer.finish()
}

/// Break `text` into lines of at most `columns` characters.
///
/// Explicit newlines are kept, blank lines survive as empty strings, and
/// words longer than a line are split.
fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > columns {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                lines.push(word.drain(..columns).collect());
            }
            let word: String = word.into_iter().collect();
            if word.is_empty() {
                continue;
            }
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > columns {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        lines.push(current);
    }
    lines
}

/// Built-in PDF fonts only cover Latin-1; anything else prints as `?`.
fn winansi_safe(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) < 0x100 && !c.is_control() { c } else { '?' })
        .collect()
}
