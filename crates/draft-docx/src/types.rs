//! Word document object graph
//!
//! A small subset of WordprocessingML: paragraphs of formatted runs,
//! borderless tables and list numbering. Enough to lay out a court filing;
//! nothing here knows about legal documents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocxDocument {
    pub body: Vec<BodyElement>,
    pub numbering: Vec<NumberingDefinition>,
    /// Default body font size in half-points (24 = 12pt)
    pub font_size: u32,
    pub font_family: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyElement {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn ooxml(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub alignment: Alignment,
    pub numbering: Option<NumberingRef>,
    /// Space after the paragraph, in twentieths of a point
    pub spacing_after: Option<u32>,
    pub keep_with_next: bool,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new().run(Run::new(text))
    }

    pub fn run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn numbered(mut self, num_id: u32) -> Self {
        self.numbering = Some(NumberingRef { num_id, level: 0 });
        self
    }

    pub fn spacing_after(mut self, twips: u32) -> Self {
        self.spacing_after = Some(twips);
        self
    }

    pub fn keep_with_next(mut self) -> Self {
        self.keep_with_next = true;
        self
    }

    /// Concatenated run text
    pub fn raw_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Half-points; `None` inherits the document default
    pub size: Option<u32>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn size(mut self, half_points: u32) -> Self {
        self.size = Some(half_points);
        self
    }
}

/// Table without visible borders, used for aligned label/value layouts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column widths in twentieths of a point
    pub column_widths: Vec<u32>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}

impl TableCell {
    pub fn new(paragraph: Paragraph) -> Self {
        Self {
            paragraphs: vec![paragraph],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingRef {
    pub num_id: u32,
    pub level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberFormat {
    Decimal,
    LowerLetter,
}

impl NumberFormat {
    pub fn ooxml(&self) -> &'static str {
        match self {
            NumberFormat::Decimal => "decimal",
            NumberFormat::LowerLetter => "lowerLetter",
        }
    }

    fn render(&self, n: usize) -> String {
        match self {
            NumberFormat::Decimal => n.to_string(),
            NumberFormat::LowerLetter => {
                // Word repeats the letter past z: aa, bb, ...
                let letter = (b'a' + ((n - 1) % 26) as u8) as char;
                letter.to_string().repeat((n - 1) / 26 + 1)
            }
        }
    }
}

/// One list definition; `level_text` uses Word's `%1` placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingDefinition {
    pub num_id: u32,
    pub format: NumberFormat,
    pub level_text: String,
    /// Hanging indent in twentieths of a point
    pub indent: u32,
}

impl NumberingDefinition {
    pub fn label(&self, n: usize) -> String {
        self.level_text.replace("%1", &self.format.render(n))
    }
}

impl DocxDocument {
    pub fn numbering_definition(&self, num_id: u32) -> Option<&NumberingDefinition> {
        self.numbering.iter().find(|d| d.num_id == num_id)
    }

    /// Text as a word processor would display it, numbering resolved
    ///
    /// One line per paragraph; table cells are read row by row, left to right.
    pub fn plain_text(&self) -> String {
        let mut counters: HashMap<u32, usize> = HashMap::new();
        let mut lines = Vec::new();

        for element in &self.body {
            match element {
                BodyElement::Paragraph(p) => lines.push(self.paragraph_line(p, &mut counters)),
                BodyElement::Table(table) => {
                    for row in &table.rows {
                        for cell in &row.cells {
                            for p in &cell.paragraphs {
                                lines.push(self.paragraph_line(p, &mut counters));
                            }
                        }
                    }
                }
            }
        }

        lines.join("\n")
    }

    fn paragraph_line(&self, paragraph: &Paragraph, counters: &mut HashMap<u32, usize>) -> String {
        let text = paragraph.raw_text();
        let label = paragraph.numbering.and_then(|numbering| {
            let definition = self.numbering_definition(numbering.num_id)?;
            let count = counters.entry(numbering.num_id).or_insert(0);
            *count += 1;
            Some(definition.label(*count))
        });

        match label {
            Some(label) => format!("{} {}", label, text),
            None => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numbering_labels() {
        let decimal = NumberingDefinition {
            num_id: 1,
            format: NumberFormat::Decimal,
            level_text: "%1.".to_string(),
            indent: 360,
        };
        let letters = NumberingDefinition {
            num_id: 2,
            format: NumberFormat::LowerLetter,
            level_text: "(%1)".to_string(),
            indent: 360,
        };

        assert_eq!(decimal.label(3), "3.");
        assert_eq!(letters.label(1), "(a)");
        assert_eq!(letters.label(26), "(z)");
        assert_eq!(letters.label(27), "(aa)");
    }

    #[test]
    fn test_plain_text_counts_per_list() {
        let doc = DocxDocument {
            body: vec![
                BodyElement::Paragraph(Paragraph::text("GROUNDS")),
                BodyElement::Paragraph(Paragraph::text("A").numbered(1)),
                BodyElement::Paragraph(Paragraph::text("x").numbered(2)),
                BodyElement::Paragraph(Paragraph::text("B").numbered(1)),
            ],
            numbering: vec![
                NumberingDefinition {
                    num_id: 1,
                    format: NumberFormat::Decimal,
                    level_text: "%1.".to_string(),
                    indent: 360,
                },
                NumberingDefinition {
                    num_id: 2,
                    format: NumberFormat::LowerLetter,
                    level_text: "(%1)".to_string(),
                    indent: 360,
                },
            ],
            font_size: 24,
            font_family: "Times New Roman".to_string(),
        };

        assert_eq!(doc.plain_text(), "GROUNDS\n1. A\n(a) x\n2. B");
    }
}
