use std::path::Path;

use crate::error::ExtractionError;
use crate::processor::{DocumentFormat, DocumentProcessor};

pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor for PdfProcessor {
    fn process(&self, path: &Path) -> Result<String, ExtractionError> {
        let _span = tracing::info_span!("processor.pdf").entered();

        let pdf_bytes = std::fs::read(path).map_err(|e| ExtractionError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let doc = lopdf::Document::load_mem(&pdf_bytes)
            .map_err(|e| ExtractionError::PdfProcessing(format!("Failed to load PDF: {}", e)))?;

        Ok(extract_text_from_pdf(&doc))
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Pdf)
    }
}

/// Page texts in page order, separated by blank lines. Pages that fail to
/// decode are skipped.
fn extract_text_from_pdf(doc: &lopdf::Document) -> String {
    let mut pages = Vec::new();

    for (page_num, _) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) => {
                let page_text = page_text.trim();
                if !page_text.is_empty() {
                    pages.push(page_text.to_string());
                }
            }
            Err(e) => tracing::debug!(page = page_num, "Skipping undecodable PDF page: {}", e),
        }
    }

    pages.join("\n\n")
}

/// Builds a PDF with one page per entry, each drawing its text in Courier.
#[cfg(test)]
pub(crate) fn build_test_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.new_object_id();
    let resources_id = doc.new_object_id();

    doc.objects.insert(
        font_id,
        Object::Dictionary(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        }),
    );

    doc.objects.insert(
        resources_id,
        Object::Dictionary(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        }),
    );

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content_id = doc.new_object_id();
        let page_id = doc.new_object_id();

        let content = format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", text);
        let content_stream = Stream::new(dictionary! {}, content.into_bytes());
        doc.objects
            .insert(content_id, Object::Stream(content_stream));

        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            }),
        );
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut pdf_bytes = Vec::new();
    doc.save_to(&mut pdf_bytes).unwrap();
    pdf_bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn write_pdf(pages: &[&str]) -> NamedTempFile {
        let mut temp_file = NamedTempFile::with_suffix(".pdf").unwrap();
        std::io::Write::write_all(&mut temp_file, &build_test_pdf(pages)).unwrap();
        temp_file
    }

    #[test]
    fn test_supports_pdf_format() {
        let processor = PdfProcessor::new();
        assert!(processor.supports(DocumentFormat::Pdf));
        assert!(!processor.supports(DocumentFormat::Docx));
    }

    #[test]
    fn test_process_pdf_with_embedded_text() {
        let temp_file = write_pdf(&["Hello world."]);

        let text = PdfProcessor::new().process(temp_file.path()).unwrap();
        assert_eq!(text.trim(), "Hello world.");
    }

    #[test]
    fn test_pages_joined_with_blank_line() {
        let temp_file = write_pdf(&["First page", "Second page"]);

        let text = PdfProcessor::new().process(temp_file.path()).unwrap();
        let first = text.find("First page").unwrap();
        let second = text.find("Second page").unwrap();
        assert!(first < second);
        assert!(text[first..second].contains("\n\n"));
    }

    #[test]
    fn test_corrupted_pdf_error() {
        let temp_file = NamedTempFile::with_suffix(".pdf").unwrap();
        std::fs::write(temp_file.path(), b"not a valid pdf content").unwrap();

        match PdfProcessor::new().process(temp_file.path()) {
            Err(ExtractionError::PdfProcessing(msg)) => {
                assert!(
                    msg.contains("Failed to load PDF"),
                    "Expected 'Failed to load PDF' in: {}",
                    msg
                );
            }
            other => panic!("Expected PdfProcessing error, got {:?}", other),
        }
    }

    #[test]
    fn test_pdf_file_not_found_error() {
        let result = PdfProcessor::new().process(Path::new("/nonexistent/lecture.pdf"));
        assert!(matches!(result, Err(ExtractionError::ReadDocument { .. })));
    }
}
