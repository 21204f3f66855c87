//! WordprocessingML serialization of the object graph

use std::fmt::Write;

use crate::types::{BodyElement, DocxDocument, NumberingDefinition, Paragraph, Run, Table};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>
</Types>"#;

pub const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

pub const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>
</Relationships>"#;

/// Escape text for element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Control characters other than tab/newline are invalid in XML 1.0
            c if (c as u32) < 0x20 && c != '\t' && c != '\n' && c != '\r' => {}
            c => out.push(c),
        }
    }
    out
}

pub fn document_xml(doc: &DocxDocument) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    let _ = write!(xml, r#"<w:document xmlns:w="{}" xmlns:r="{}"><w:body>"#, W_NS, R_NS);

    for element in &doc.body {
        match element {
            BodyElement::Paragraph(p) => write_paragraph(&mut xml, p),
            BodyElement::Table(t) => write_table(&mut xml, t),
        }
    }

    // A4, 1 inch margins
    xml.push_str(
        r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#,
    );
    xml.push_str("</w:body></w:document>");
    xml
}

fn write_paragraph(xml: &mut String, p: &Paragraph) {
    xml.push_str("<w:p><w:pPr>");
    if p.keep_with_next {
        xml.push_str("<w:keepNext/>");
    }
    if let Some(numbering) = p.numbering {
        let _ = write!(
            xml,
            r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
            numbering.level, numbering.num_id
        );
    }
    if let Some(after) = p.spacing_after {
        let _ = write!(xml, r#"<w:spacing w:after="{}"/>"#, after);
    }
    let _ = write!(xml, r#"<w:jc w:val="{}"/>"#, p.alignment.ooxml());
    xml.push_str("</w:pPr>");

    for run in &p.runs {
        write_run(xml, run);
    }
    xml.push_str("</w:p>");
}

fn write_run(xml: &mut String, run: &Run) {
    xml.push_str("<w:r>");
    if run.bold || run.italic || run.underline || run.size.is_some() {
        xml.push_str("<w:rPr>");
        if run.bold {
            xml.push_str("<w:b/>");
        }
        if run.italic {
            xml.push_str("<w:i/>");
        }
        if let Some(size) = run.size {
            let _ = write!(xml, r#"<w:sz w:val="{}"/>"#, size);
        }
        if run.underline {
            xml.push_str(r#"<w:u w:val="single"/>"#);
        }
        xml.push_str("</w:rPr>");
    }

    // Line breaks inside a run become <w:br/>
    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        let _ = write!(xml, r#"<w:t xml:space="preserve">{}</w:t>"#, escape(line));
    }
    xml.push_str("</w:r>");
}

fn write_table(xml: &mut String, table: &Table) {
    xml.push_str("<w:tbl><w:tblPr>");
    let total: u32 = table.column_widths.iter().sum();
    let _ = write!(xml, r#"<w:tblW w:w="{}" w:type="dxa"/>"#, total);
    xml.push_str("<w:tblBorders>");
    for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
        let _ = write!(xml, r#"<w:{} w:val="nil"/>"#, edge);
    }
    xml.push_str(r#"</w:tblBorders><w:tblLayout w:type="fixed"/></w:tblPr><w:tblGrid>"#);
    for width in &table.column_widths {
        let _ = write!(xml, r#"<w:gridCol w:w="{}"/>"#, width);
    }
    xml.push_str("</w:tblGrid>");

    for row in &table.rows {
        xml.push_str("<w:tr>");
        for (i, cell) in row.cells.iter().enumerate() {
            xml.push_str("<w:tc><w:tcPr>");
            if let Some(width) = table.column_widths.get(i) {
                let _ = write!(xml, r#"<w:tcW w:w="{}" w:type="dxa"/>"#, width);
            }
            xml.push_str("</w:tcPr>");
            if cell.paragraphs.is_empty() {
                // Every cell needs at least one paragraph
                xml.push_str("<w:p/>");
            }
            for p in &cell.paragraphs {
                write_paragraph(xml, p);
            }
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
}

pub fn styles_xml(doc: &DocxDocument) -> String {
    let font = escape(&doc.font_family);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="{ns}"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/><w:lang w:val="en-IN"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="360" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style></w:styles>"#,
        ns = W_NS,
        font = font,
        size = doc.font_size,
    )
}

pub fn numbering_xml(doc: &DocxDocument) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    let _ = write!(xml, r#"<w:numbering xmlns:w="{}">"#, W_NS);

    // One abstract definition per list, sharing its id
    for def in &doc.numbering {
        write_abstract_num(&mut xml, def);
    }
    for def in &doc.numbering {
        let _ = write!(
            xml,
            r#"<w:num w:numId="{id}"><w:abstractNumId w:val="{id}"/></w:num>"#,
            id = def.num_id
        );
    }

    xml.push_str("</w:numbering>");
    xml
}

fn write_abstract_num(xml: &mut String, def: &NumberingDefinition) {
    let _ = write!(
        xml,
        r#"<w:abstractNum w:abstractNumId="{id}"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="{fmt}"/><w:lvlText w:val="{text}"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="{indent}" w:hanging="{indent}"/></w:pPr></w:lvl></w:abstractNum>"#,
        id = def.num_id,
        fmt = def.format.ooxml(),
        text = escape(&def.level_text),
        indent = def.indent,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Alignment, NumberFormat};

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"A & B <"x"> 'y'"#), "A &amp; B &lt;&quot;x&quot;&gt; &apos;y&apos;");
        assert_eq!(escape("bell\u{7}"), "bell");
    }

    #[test]
    fn test_paragraph_markup() {
        let doc = DocxDocument {
            body: vec![BodyElement::Paragraph(
                Paragraph::new()
                    .run(Run::new("Title & more").bold())
                    .align(Alignment::Center)
                    .numbered(1),
            )],
            ..DocxDocument::default()
        };
        let xml = document_xml(&doc);

        assert!(xml.contains(r#"<w:numId w:val="1"/>"#));
        assert!(xml.contains(r#"<w:jc w:val="center"/>"#));
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains("Title &amp; more"));
    }

    #[test]
    fn test_numbering_markup() {
        let doc = DocxDocument {
            numbering: vec![NumberingDefinition {
                num_id: 2,
                format: NumberFormat::LowerLetter,
                level_text: "(%1)".to_string(),
                indent: 567,
            }],
            ..DocxDocument::default()
        };
        let xml = numbering_xml(&doc);

        assert!(xml.contains(r#"<w:numFmt w:val="lowerLetter"/>"#));
        assert!(xml.contains(r#"<w:lvlText w:val="(%1)"/>"#));
        assert!(xml.contains(r#"<w:num w:numId="2"><w:abstractNumId w:val="2"/></w:num>"#));
    }
}
