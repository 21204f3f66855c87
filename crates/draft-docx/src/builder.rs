//! Map a [`DocumentModel`] onto the Word object graph
//!
//! Section order and omissions follow the PDF layout: court heading, case
//! line, cause title, title, numbered body, lettered prayer, signature
//! block, verification.

use draft_model::{DocumentModel, Party, PartyGroup, Relief};

use crate::types::{
    Alignment, BodyElement, DocxDocument, NumberFormat, NumberingDefinition, Paragraph, Run,
    Table, TableCell, TableRow,
};

const BODY_NUMBERING: u32 = 1;
const PRAYER_NUMBERING: u32 = 2;

const HEADING_SIZE: u32 = 28;
const BODY_SIZE: u32 = 24;
const SECTION_GAP: u32 = 240;
const PARAGRAPH_GAP: u32 = 120;

/// Text width of an A4 page with 1 inch margins, in twips
const TEXT_WIDTH: u32 = 9026;
const LABEL_WIDTH: u32 = 2200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Prefix of the case line, e.g. "Bail Application"
    pub case_label: String,
    pub font_family: String,
    pub include_verification: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            case_label: "Case".to_string(),
            font_family: "Times New Roman".to_string(),
            include_verification: true,
        }
    }
}

pub fn build_document(model: &DocumentModel) -> DocxDocument {
    build_document_with(model, &BuildOptions::default())
}

pub fn build_document_with(model: &DocumentModel, options: &BuildOptions) -> DocxDocument {
    let mut body: Vec<BodyElement> = Vec::new();
    let mut push = |p: Paragraph| body.push(BodyElement::Paragraph(p));

    if let Some(heading) = model.court.heading() {
        push(centered_bold(&heading, HEADING_SIZE));
    }
    if let Some(location) = model.court.location_line() {
        push(Paragraph::text(location).align(Alignment::Center));
    }
    if let Some(case_line) = model.court.case_line(&options.case_label) {
        push(centered_bold(&case_line, BODY_SIZE).spacing_after(SECTION_GAP));
    }

    for group in model.moving_parties() {
        body.extend(party_block(group));
    }
    if model.responding_parties().next().is_some() {
        body.push(BodyElement::Paragraph(
            centered_bold("VERSUS", BODY_SIZE).spacing_after(SECTION_GAP),
        ));
    }
    for group in model.responding_parties() {
        body.extend(party_block(group));
    }

    let mut push = |p: Paragraph| body.push(BodyElement::Paragraph(p));

    if let Some(title) = &model.title {
        push(
            Paragraph::new()
                .run(Run::new(title).bold().underline())
                .align(Alignment::Center)
                .spacing_after(PARAGRAPH_GAP),
        );
    }
    if let Some(subtitle) = &model.subtitle {
        push(
            Paragraph::new()
                .run(Run::new(subtitle).italic())
                .align(Alignment::Center)
                .spacing_after(SECTION_GAP),
        );
    }

    if !model.body.paragraphs.is_empty() {
        push(section_heading(model.body.label.heading()));
        for text in &model.body.paragraphs {
            push(
                Paragraph::text(text)
                    .align(Alignment::Justify)
                    .numbered(BODY_NUMBERING)
                    .spacing_after(PARAGRAPH_GAP),
            );
        }
    }

    if let Some(prayer) = &model.prayer {
        push(section_heading(&prayer.heading));
        match &prayer.relief {
            Relief::Items(items) => {
                for item in items {
                    push(
                        Paragraph::text(item)
                            .align(Alignment::Justify)
                            .numbered(PRAYER_NUMBERING)
                            .spacing_after(PARAGRAPH_GAP),
                    );
                }
            }
            Relief::Text(text) => push(
                Paragraph::text(text)
                    .align(Alignment::Justify)
                    .spacing_after(PARAGRAPH_GAP),
            ),
        }
    }

    let footer = &model.footer;
    if let Some(note) = &footer.closing_note {
        push(
            Paragraph::text(note)
                .align(Alignment::Justify)
                .spacing_after(SECTION_GAP),
        );
    }

    if let Some(signature) = signature_block(model) {
        body.push(signature);
    }

    if options.include_verification {
        if let Some(verification) = &footer.verification {
            body.push(BodyElement::Paragraph(section_heading("VERIFICATION")));
            body.push(BodyElement::Paragraph(
                Paragraph::text(verification).align(Alignment::Justify),
            ));
        }
    }

    DocxDocument {
        body,
        numbering: numbering_definitions(),
        font_size: BODY_SIZE,
        font_family: options.font_family.clone(),
    }
}

fn numbering_definitions() -> Vec<NumberingDefinition> {
    vec![
        NumberingDefinition {
            num_id: BODY_NUMBERING,
            format: NumberFormat::Decimal,
            level_text: "%1.".to_string(),
            indent: 567,
        },
        NumberingDefinition {
            num_id: PRAYER_NUMBERING,
            format: NumberFormat::LowerLetter,
            level_text: "(%1)".to_string(),
            indent: 567,
        },
    ]
}

fn centered_bold(text: &str, size: u32) -> Paragraph {
    Paragraph::new()
        .run(Run::new(text).bold().size(size))
        .align(Alignment::Center)
}

fn section_heading(text: &str) -> Paragraph {
    centered_bold(text, BODY_SIZE)
        .spacing_after(PARAGRAPH_GAP)
        .keep_with_next()
}

/// Label/value table per member, then the right-aligned role label
fn party_block(group: &PartyGroup) -> Vec<BodyElement> {
    let mut elements = Vec::new();
    let numbered = group.members.len() > 1;

    for (i, party) in group.members.iter().enumerate() {
        let rows = party_rows(party)
            .into_iter()
            .enumerate()
            .map(|(row_index, (label, value))| {
                let label = if numbered && row_index == 0 {
                    format!("{}. {}:", i + 1, label)
                } else {
                    format!("{}:", label)
                };
                let value_run = if row_index == 0 {
                    Run::new(value).bold()
                } else {
                    Run::new(value)
                };
                TableRow {
                    cells: vec![
                        TableCell::new(Paragraph::text(label)),
                        TableCell::new(Paragraph::new().run(value_run)),
                    ],
                }
            })
            .collect();

        elements.push(BodyElement::Table(Table {
            column_widths: vec![LABEL_WIDTH, TEXT_WIDTH - LABEL_WIDTH],
            rows,
        }));
    }

    elements.push(BodyElement::Paragraph(
        Paragraph::new()
            .run(Run::new(format!("...{}", group.role.block_label(group.members.len()))).bold())
            .align(Alignment::Right)
            .spacing_after(SECTION_GAP),
    ));

    elements
}

fn party_rows(party: &Party) -> Vec<(String, String)> {
    let mut rows = vec![("Name".to_string(), party.name.clone())];
    if let Some(guardian) = &party.guardian_name {
        rows.push((
            party.relation.clone().unwrap_or_else(|| "S/o".to_string()),
            guardian.clone(),
        ));
    }
    if let Some(age) = &party.age {
        rows.push(("Age".to_string(), format!("{} years", age)));
    }
    if let Some(occupation) = &party.occupation {
        rows.push(("Occupation".to_string(), occupation.clone()));
    }
    if let Some(address) = &party.address {
        rows.push(("Address".to_string(), address.clone()));
    }
    rows
}

fn signature_block(model: &DocumentModel) -> Option<BodyElement> {
    let footer = &model.footer;

    let mut left = Vec::new();
    if let Some(place) = &footer.place {
        left.push(Paragraph::text(format!("Place: {}", place)));
    }
    if let Some(date) = &footer.date {
        left.push(Paragraph::text(format!("Date: {}", date)));
    }

    let mut right = Vec::new();
    if let Some(advocate) = &footer.advocate_name {
        let side = model
            .moving_parties()
            .next()
            .map(|g| g.role.block_label(g.members.len()))
            .unwrap_or_else(|| "Applicant".to_string());
        right.push(
            Paragraph::new()
                .run(Run::new(advocate).bold())
                .align(Alignment::Right),
        );
        right.push(Paragraph::text(format!("Advocate for the {}", side)).align(Alignment::Right));
    }

    if left.is_empty() && right.is_empty() {
        return None;
    }

    Some(BodyElement::Table(Table {
        column_widths: vec![TEXT_WIDTH / 2, TEXT_WIDTH / 2],
        rows: vec![TableRow {
            cells: vec![
                TableCell { paragraphs: left },
                TableCell { paragraphs: right },
            ],
        }],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use draft_model::{Body, BodyLabel, CourtDetails, Footer, PartyRole, Prayer};
    use pretty_assertions::assert_eq;

    fn model() -> DocumentModel {
        DocumentModel {
            court: CourtDetails {
                court_name: Some("Civil Judge (Senior Division)".to_string()),
                district: Some("Nagpur".to_string()),
                case_number: Some("77".to_string()),
                year: Some("2024".to_string()),
                ..CourtDetails::default()
            },
            parties: vec![
                PartyGroup {
                    role: PartyRole::Plaintiff,
                    members: vec![Party::named("Asha Rao"), Party::named("Kiran Rao")],
                },
                PartyGroup {
                    role: PartyRole::Defendant,
                    members: vec![Party {
                        address: Some("Civil Lines".to_string()),
                        ..Party::named("Vikram Shah")
                    }],
                },
            ],
            title: Some("SUIT FOR PERMANENT INJUNCTION".to_string()),
            subtitle: None,
            body: Body {
                label: BodyLabel::Facts,
                paragraphs: vec!["A".into(), "B".into(), "C".into()],
            },
            prayer: Some(Prayer {
                heading: "PRAYER".to_string(),
                relief: Relief::Items(vec!["Restrain the defendant".into()]),
            }),
            footer: Footer {
                place: Some("Nagpur".to_string()),
                advocate_name: Some("Adv. R. Deshmukh".to_string()),
                ..Footer::default()
            },
        }
    }

    #[test]
    fn test_body_numbered_in_order() {
        let text = build_document(&model()).plain_text();
        assert!(text.contains("FACTS OF THE CASE\n1. A\n2. B\n3. C"));
    }

    #[test]
    fn test_prayer_lettered() {
        let text = build_document(&model()).plain_text();
        assert!(text.contains("PRAYER\n(a) Restrain the defendant"));
    }

    #[test]
    fn test_cause_title() {
        let options = BuildOptions {
            case_label: "Civil Suit".to_string(),
            ..BuildOptions::default()
        };
        let text = build_document_with(&model(), &options).plain_text();
        let lines: Vec<&str> = text.lines().take(10).collect();

        assert_eq!(
            lines,
            vec![
                "IN THE COURT OF CIVIL JUDGE (SENIOR DIVISION), NAGPUR",
                "District Nagpur",
                "Civil Suit No. 77 of 2024",
                "1. Name:",
                "Asha Rao",
                "2. Name:",
                "Kiran Rao",
                "...Plaintiffs",
                "VERSUS",
                "Name:",
            ]
        );
    }

    #[test]
    fn test_missing_sections_omitted() {
        let mut model = model();
        model.prayer = None;
        model.footer = Footer::default();
        let doc = build_document(&model);
        let text = doc.plain_text();

        assert!(!text.contains("PRAYER"));
        assert!(!text.contains("Advocate for"));
        assert!(matches!(doc.body.last(), Some(BodyElement::Paragraph(p)) if p.raw_text() == "C"));
    }

    #[test]
    fn test_signature_table() {
        let doc = build_document(&model());
        let Some(BodyElement::Table(table)) = doc.body.last() else {
            panic!("signature block should close the document");
        };
        assert_eq!(table.rows[0].cells[0].paragraphs[0].raw_text(), "Place: Nagpur");
        assert_eq!(
            table.rows[0].cells[1].paragraphs[1].raw_text(),
            "Advocate for the Plaintiffs"
        );
    }
}
