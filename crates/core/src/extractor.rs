use crate::error::ExtractError;
use crate::models::DocumentKind;
use lopdf::Document;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;
use std::fs::{self, File};
use std::io::{Read, Seek};
use std::path::Path;
use tracing::warn;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// UTF-8 first, ISO-8859-1 when the bytes are not valid UTF-8.
#[derive(Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = fs::read(path)?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(error) => {
                warn!(path = %path.display(), "not valid utf-8, falling back to latin-1");
                Ok(decode_latin1(error.as_bytes()))
            }
        }
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| char::from(byte)).collect()
}

#[derive(Default)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let document =
            Document::load(path).map_err(|error| ExtractError::PdfParse(error.to_string()))?;

        let mut text = String::new();
        for page_no in document.get_pages().into_keys() {
            let page_text = document
                .extract_text(&[page_no])
                .map_err(|error| ExtractError::PdfParse(format!("page {page_no}: {error}")))?;
            text.push_str(&page_text);
            text.push('\n');
        }

        Ok(text)
    }
}

/// Reads paragraph text from `word/document.xml` inside an OOXML package.
#[derive(Default)]
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let file = File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|error| ExtractError::Docx(format!("failed to open package: {error}")))?;
        read_document_xml(&mut archive)
    }
}

fn read_document_xml<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> Result<String, ExtractError> {
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|error| ExtractError::Docx(format!("missing word/document.xml: {error}")))?;

    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;

    paragraphs_from_xml(&xml)
}

/// Body paragraphs in document order, each followed by a newline. Table content is
/// not part of the paragraph list and is left out.
fn paragraphs_from_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut text = String::new();
    let mut in_text_run = false;
    let mut table_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref element)) => match element.local_name().as_ref() {
                b"t" => in_text_run = true,
                b"tbl" => table_depth += 1,
                _ => {}
            },
            Ok(Event::End(ref element)) => match element.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"p" if table_depth == 0 => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref element)) if table_depth == 0 => {
                match element.local_name().as_ref() {
                    b"p" | b"br" => text.push('\n'),
                    b"tab" => text.push('\t'),
                    _ => {}
                }
            }
            Ok(Event::Text(run)) => {
                if in_text_run && table_depth == 0 {
                    let decoded = run
                        .decode()
                        .map_err(|error| ExtractError::Docx(format!("bad text run: {error}")))?;
                    text.push_str(&decoded);
                }
            }
            Ok(Event::GeneralRef(reference)) => {
                if in_text_run && table_depth == 0 {
                    text.push_str(&resolve_reference(&reference)?);
                }
            }
            Ok(Event::Eof) => break,
            Err(error) => {
                return Err(ExtractError::Docx(format!("xml parsing error: {error}")));
            }
            _ => {}
        }
    }

    Ok(text)
}

/// Character references (`&#233;`, `&#xE9;`) and the five predefined XML entities.
fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, ExtractError> {
    let character = reference
        .resolve_char_ref()
        .map_err(|error| ExtractError::Docx(format!("bad character reference: {error}")))?;
    if let Some(character) = character {
        return Ok(character.to_string());
    }

    let name = reference
        .decode()
        .map_err(|error| ExtractError::Docx(format!("bad entity reference: {error}")))?;
    match resolve_predefined_entity(&name) {
        Some(resolved) => Ok(resolved.to_string()),
        None => {
            warn!(entity = %name, "unknown entity in word document, kept verbatim");
            Ok(format!("&{name};"))
        }
    }
}

pub fn extract_document(path: &Path, kind: DocumentKind) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::PlainText => PlainTextExtractor.extract(path),
        DocumentKind::Pdf => LopdfExtractor.extract(path),
        DocumentKind::Word => DocxExtractor.extract(path),
        DocumentKind::Unsupported => Err(ExtractError::Unsupported(
            path.extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_else(|| "(no extension)".to_string()),
        )),
    }
}

/// Returns the full text of `path`, or an empty string after logging why extraction failed.
pub fn extract_text(path: &Path) -> String {
    let kind = DocumentKind::from_path(path);
    match extract_document(path, kind) {
        Ok(text) => text,
        Err(error) => {
            warn!(path = %path.display(), kind = ?kind, %error, "text extraction failed");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::tempdir;

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer
            .start_file("word/document.xml", options)
            .expect("start entry");
        writer
            .write_all(document_xml.as_bytes())
            .expect("write entry");
        writer.finish().expect("finish archive").into_inner()
    }

    const TWO_PARAGRAPHS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t xml:space="preserve">Hello </w:t></w:r><w:r><w:t>World</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:r><w:t>Second</w:t><w:tab/><w:t>para</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn utf8_text_is_read_verbatim() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("a.txt");
        fs::write(&path, "héllo\nworld")?;

        assert_eq!(extract_text(&path), "héllo\nworld");
        Ok(())
    }

    #[test]
    fn invalid_utf8_falls_back_to_latin1() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("legacy.txt");
        fs::write(&path, [b'c', b'a', b'f', 0xE9])?;

        assert_eq!(extract_text(&path), "café");
        Ok(())
    }

    #[test]
    fn missing_file_yields_empty_text() {
        assert_eq!(extract_text(Path::new("/definitely/not/here.txt")), "");
    }

    #[test]
    fn docx_paragraphs_end_with_newlines() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("memo.docx");
        fs::write(&path, docx_bytes(TWO_PARAGRAPHS))?;

        assert_eq!(extract_text(&path), "Hello World\n\nSecond\tpara\n");
        Ok(())
    }

    #[test]
    fn docx_references_are_resolved() -> Result<(), Box<dyn std::error::Error>> {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>AT&amp;T &lt;ok&gt; caf&#233; &#xE9;t&#233; &quot;q&quot; &apos;s</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

        assert_eq!(paragraphs_from_xml(xml)?, "AT&T <ok> café été \"q\" 's\n");
        Ok(())
    }

    #[test]
    fn docx_tables_are_not_paragraphs() -> Result<(), Box<dyn std::error::Error>> {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Before</w:t></w:r></w:p>
    <w:tbl>
      <w:tr><w:tc><w:p><w:r><w:t>Cell &amp; more</w:t></w:r></w:p><w:p/></w:tc></w:tr>
    </w:tbl>
    <w:p><w:r><w:t>After</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

        assert_eq!(paragraphs_from_xml(xml)?, "Before\nAfter\n");
        Ok(())
    }

    fn two_page_pdf() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        use lopdf::{dictionary, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut page_ids = Vec::new();
        for line in ["Alpha page", "Bravo page"] {
            let content = format!("BT\n/F1 12 Tf\n50 700 Td\n({line}) Tj\nET\n");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| (*id).into()).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_ids.len() as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }

    #[test]
    fn pdf_pages_are_read_in_order_each_ending_with_newline() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("report.pdf");
        fs::write(&path, two_page_pdf()?)?;

        let text = extract_text(&path);

        assert!(text.ends_with('\n'));
        let alpha = text.find("Alpha page").ok_or("first page text missing")?;
        let bravo = text.find("Bravo page").ok_or("second page text missing")?;
        assert!(alpha < bravo);
        assert!(text[alpha..bravo].contains('\n'));
        assert_eq!(crate::chunking::normalize_whitespace(&text), "Alpha page Bravo page");
        Ok(())
    }

    #[test]
    fn legacy_doc_that_is_not_a_zip_yields_empty_text() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("old.doc");
        fs::write(&path, b"\xD0\xCF\x11\xE0 not a zip")?;

        assert!(matches!(
            extract_document(&path, DocumentKind::Word),
            Err(ExtractError::Docx(_))
        ));
        assert_eq!(extract_text(&path), "");
        Ok(())
    }

    #[test]
    fn corrupt_pdf_yields_empty_text() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4\n%broken")?;

        assert_eq!(extract_text(&path), "");
        Ok(())
    }

    #[test]
    fn unsupported_kind_is_reported() {
        let result = extract_document(Path::new("picture.png"), DocumentKind::Unsupported);
        match result {
            Err(ExtractError::Unsupported(ext)) => assert_eq!(ext, ".png"),
            other => panic!("expected unsupported error, got {other:?}"),
        }
    }
}
