use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ExtractionError;
use crate::processor::{DocumentFormat, DocumentProcessor};

pub struct DocxProcessor;

impl DocxProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor for DocxProcessor {
    fn process(&self, path: &Path) -> Result<String, ExtractionError> {
        let _span = tracing::info_span!("processor.docx").entered();

        let file = std::fs::File::open(path).map_err(|e| ExtractionError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ExtractionError::DocxProcessing(format!("Failed to open DOCX: {}", e)))?;

        extract_docx_text(&mut archive)
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Docx)
    }
}

fn extract_docx_text<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<String, ExtractionError> {
    let mut document_xml = archive.by_name("word/document.xml").map_err(|e| {
        ExtractionError::DocxProcessing(format!("Failed to find document.xml: {}", e))
    })?;

    let mut xml_content = String::new();
    document_xml.read_to_string(&mut xml_content).map_err(|e| {
        ExtractionError::DocxProcessing(format!("Failed to read document.xml: {}", e))
    })?;

    parse_docx_xml(&xml_content)
}

/// One output line per `w:p` paragraph. `w:tab` and `w:br` inside runs become
/// a tab and a line break.
fn parse_docx_xml(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut text = String::new();
    let mut in_text_element = false;
    let mut in_paragraph = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = true,
                b"p" => in_paragraph = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" if in_paragraph => text.push('\t'),
                b"br" if in_paragraph => text.push('\n'),
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = false,
                b"p" => {
                    if in_paragraph {
                        text.push('\n');
                        in_paragraph = false;
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_element {
                    let decoded = e.unescape().unwrap_or_default();
                    text.push_str(&decoded);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractionError::DocxProcessing(format!(
                    "XML parsing error: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:body>
                <w:p>
                    <w:r><w:t>Cell biology</w:t></w:r>
                </w:p>
                <w:p>
                    <w:r><w:t>Mitochondria</w:t></w:r>
                    <w:r><w:tab/><w:t>produce ATP</w:t></w:r>
                </w:p>
            </w:body>
        </w:document>"#;

    fn write_docx(document_xml: &str) -> NamedTempFile {
        let temp_file = NamedTempFile::with_suffix(".docx").unwrap();
        let mut zip = zip::ZipWriter::new(temp_file.reopen().unwrap());
        zip.start_file(
            "word/document.xml",
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        zip.finish().unwrap();
        temp_file
    }

    #[test]
    fn test_supports_docx_format() {
        let processor = DocxProcessor::new();
        assert!(processor.supports(DocumentFormat::Docx));
        assert!(!processor.supports(DocumentFormat::Pdf));
    }

    #[test]
    fn test_parse_paragraphs_one_per_line() {
        let text = parse_docx_xml(BODY).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Cell biology", "Mitochondria\tproduce ATP"]);
    }

    #[test]
    fn test_process_docx_archive() {
        let file = write_docx(BODY);
        let text = DocxProcessor::new().process(file.path()).unwrap();
        assert!(text.contains("Cell biology"));
        assert!(text.contains("Mitochondria"));
    }

    #[test]
    fn test_archive_without_document_xml() {
        let temp_file = NamedTempFile::with_suffix(".docx").unwrap();
        let mut zip = zip::ZipWriter::new(temp_file.reopen().unwrap());
        zip.start_file("other.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"hello").unwrap();
        zip.finish().unwrap();

        let err = DocxProcessor::new().process(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("document.xml"));
    }

    #[test]
    fn test_not_a_zip() {
        let temp_file = NamedTempFile::with_suffix(".docx").unwrap();
        std::fs::write(temp_file.path(), b"plain bytes").unwrap();

        let err = DocxProcessor::new().process(temp_file.path()).unwrap_err();
        assert!(matches!(err, ExtractionError::DocxProcessing(_)));
    }
}
