//! Raw text extraction from `.docx` containers.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{QuizError, Result};

/// Turns the bytes of a Word document into plain text.
pub trait TextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// Reads `word/document.xml` from the zip container and concatenates the
/// `w:t` runs, one line per paragraph.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

const DOCUMENT_PART: &str = "word/document.xml";
/// Upper bound on the uncompressed document part.
pub const MAX_DOCUMENT_XML: u64 = 32 * 1024 * 1024;

impl TextExtractor for DocxExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        let xml = read_document_part(bytes, MAX_DOCUMENT_XML)?;
        document_text(&xml)
    }
}

/// Reads the document part, refusing to inflate more than `limit` bytes
/// whatever size the archive declares.
fn read_document_part(bytes: &[u8], limit: u64) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| QuizError::Extraction(format!("not a docx archive: {}", e)))?;
    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| QuizError::Extraction(format!("{} missing: {}", DOCUMENT_PART, e)))?;
    let too_large =
        || QuizError::Extraction(format!("{} is larger than {} bytes", DOCUMENT_PART, limit));
    if part.size() > limit {
        return Err(too_large());
    }

    let mut xml = String::new();
    part.take(limit + 1).read_to_string(&mut xml)?;
    if xml.len() as u64 > limit {
        return Err(too_large());
    }
    Ok(xml)
}

fn document_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| QuizError::Extraction(format!("invalid document xml: {}", e)))?;
        match event {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text_run => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Event::GeneralRef(e) if in_text_run => {
                push_entity(&mut text, &String::from_utf8_lossy(&e));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

fn push_entity(text: &mut String, name: &str) {
    match name {
        "amp" => text.push('&'),
        "lt" => text.push('<'),
        "gt" => text.push('>'),
        "quot" => text.push('"'),
        "apos" => text.push('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse().ok()
            } else {
                None
            };
            if let Some(ch) = code.and_then(char::from_u32) {
                text.push(ch);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:r><w:t>Photosynthesis converts</w:t></w:r><w:r><w:t xml:space="preserve"> light</w:t></w:r></w:p>
<w:p><w:r><w:t>into chemical energy &amp; heat.</w:t></w:r></w:p>
</w:body>
</w:document>"#;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            writer
                .start_file(DOCUMENT_PART, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_extracts_paragraph_text() {
        let bytes = build_docx(DOCUMENT_XML);
        let text = DocxExtractor.extract_text(&bytes).unwrap();
        assert!(text.contains("Photosynthesis converts light\n"));
        assert!(text.contains("into chemical energy & heat.\n"));
    }

    #[test]
    fn test_document_part_size_is_capped() {
        let bytes = build_docx(DOCUMENT_XML);
        let limit = DOCUMENT_XML.len() as u64 - 1;
        let result = read_document_part(&bytes, limit);
        assert!(matches!(result, Err(QuizError::Extraction(ref msg)) if msg.contains("larger than")));

        let xml = read_document_part(&bytes, DOCUMENT_XML.len() as u64).unwrap();
        assert_eq!(xml, DOCUMENT_XML);
    }

    #[test]
    fn test_oversized_part_is_rejected() {
        let padding = "<w:p/>".repeat(200_000);
        let xml = format!("<w:document><w:body>{}</w:body></w:document>", padding);
        let bytes = build_docx(&xml);

        let result = read_document_part(&bytes, 64 * 1024);
        assert!(matches!(result, Err(QuizError::Extraction(_))));
    }

    #[test]
    fn test_rejects_non_zip() {
        let result = DocxExtractor.extract_text(b"plain text, not a zip");
        assert!(matches!(result, Err(QuizError::Extraction(_))));
    }

    #[test]
    fn test_numeric_entities() {
        let mut text = String::new();
        push_entity(&mut text, "#x41");
        push_entity(&mut text, "#66");
        push_entity(&mut text, "unknown");
        assert_eq!(text, "AB");
    }
}
