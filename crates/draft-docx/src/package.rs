//! OOXML zip packaging

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::error::DocxError;
use crate::types::DocxDocument;
use crate::xml;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Package parts, in the order they are written
pub const PARTS: [&str; 6] = [
    "[Content_Types].xml",
    "_rels/.rels",
    "word/document.xml",
    "word/styles.xml",
    "word/numbering.xml",
    "word/_rels/document.xml.rels",
];

/// Serialize a document into `.docx` bytes
pub fn write_docx(doc: &DocxDocument) -> Result<Vec<u8>, DocxError> {
    let contents: [String; 6] = [
        xml::CONTENT_TYPES.to_string(),
        xml::PACKAGE_RELS.to_string(),
        xml::document_xml(doc),
        xml::styles_xml(doc),
        xml::numbering_xml(doc),
        xml::DOCUMENT_RELS.to_string(),
    ];

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (part, content) in PARTS.into_iter().zip(contents.iter()) {
        zip.start_file(part, opts)
            .map_err(|source| DocxError::Zip { part, source })?;
        zip.write_all(content.as_bytes())?;
    }

    let bytes = zip
        .finish()
        .map_err(|source| DocxError::Zip {
            part: "central directory",
            source,
        })?
        .into_inner();

    tracing::debug!(
        elements = doc.body.len(),
        bytes = bytes.len(),
        "Packaged Word document"
    );
    Ok(bytes)
}
