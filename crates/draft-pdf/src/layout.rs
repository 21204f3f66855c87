//! Page layout tree built from a [`DocumentModel`]
//!
//! The tree is the single description of what goes on the page. The Typst
//! template only decides *how* each block looks, so text content never
//! passes through markup and needs no escaping.

use draft_model::{relief_label, DocumentModel, Party, PartyGroup, Relief};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Paper {
    #[default]
    A4,
    Legal,
    UsLetter,
}

impl Paper {
    /// Name understood by Typst's `page(paper: ..)`
    pub fn typst_name(&self) -> &'static str {
        match self {
            Paper::A4 => "a4",
            Paper::Legal => "us-legal",
            Paper::UsLetter => "us-letter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub paper: Paper,
    /// Body text size in points
    pub font_size: f64,
    /// Prefix of the case line, e.g. "Bail Application" or "Civil Suit"
    pub case_label: String,
    pub include_verification: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            paper: Paper::A4,
            font_size: 12.0,
            case_label: "Case".to_string(),
            include_verification: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Centered bold heading; level 1 is the court heading
    Heading { text: String, level: u8 },
    Centered { text: String, bold: bool },
    /// One cause-title block: each member as label/value rows, then the
    /// right-aligned role label
    Party {
        members: Vec<Vec<Row>>,
        role_label: String,
    },
    /// Numbered ground or lettered relief
    Item { marker: String, text: String },
    Paragraph { text: String },
    Signature { left: Vec<String>, right: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub paper: Paper,
    pub font_size: f64,
    pub blocks: Vec<Block>,
}

impl PageLayout {
    /// Flatten the tree into reading order, one visual line per line
    pub fn plain_text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        for block in &self.blocks {
            match block {
                Block::Heading { text, .. }
                | Block::Centered { text, .. }
                | Block::Paragraph { text } => lines.push(text.clone()),
                Block::Party {
                    members,
                    role_label,
                } => {
                    for rows in members {
                        lines.extend(rows.iter().map(|r| format!("{}: {}", r.label, r.value)));
                    }
                    lines.push(role_label.clone());
                }
                Block::Item { marker, text } => lines.push(format!("{} {}", marker, text)),
                Block::Signature { left, right } => {
                    lines.extend(left.iter().cloned());
                    lines.extend(right.iter().cloned());
                }
            }
        }

        lines.join("\n")
    }

    /// The JSON handed to the Typst template as `sys.inputs.layout`
    pub fn to_input(&self) -> serde_json::Value {
        serde_json::json!({
            "paper": self.paper.typst_name(),
            "font_size": self.font_size,
            "blocks": self.blocks,
        })
    }
}

/// Lay out a document; sections whose data is absent are left out
pub fn build_layout(model: &DocumentModel, options: &LayoutOptions) -> PageLayout {
    let mut blocks = Vec::new();

    if let Some(heading) = model.court.heading() {
        blocks.push(Block::Heading {
            text: heading,
            level: 1,
        });
    }
    if let Some(location) = model.court.location_line() {
        blocks.push(Block::Centered {
            text: location,
            bold: false,
        });
    }
    if let Some(case_line) = model.court.case_line(&options.case_label) {
        blocks.push(Block::Centered {
            text: case_line,
            bold: true,
        });
    }

    push_parties(&mut blocks, model.moving_parties());
    if model.responding_parties().next().is_some() {
        blocks.push(Block::Centered {
            text: "VERSUS".to_string(),
            bold: true,
        });
    }
    push_parties(&mut blocks, model.responding_parties());

    if let Some(title) = &model.title {
        blocks.push(Block::Heading {
            text: title.clone(),
            level: 2,
        });
    }
    if let Some(subtitle) = &model.subtitle {
        blocks.push(Block::Centered {
            text: subtitle.clone(),
            bold: false,
        });
    }

    if !model.body.paragraphs.is_empty() {
        blocks.push(Block::Heading {
            text: model.body.label.heading().to_string(),
            level: 3,
        });
        blocks.extend(
            model
                .body
                .paragraphs
                .iter()
                .enumerate()
                .map(|(i, text)| Block::Item {
                    marker: format!("{}.", i + 1),
                    text: text.clone(),
                }),
        );
    }

    if let Some(prayer) = &model.prayer {
        blocks.push(Block::Heading {
            text: prayer.heading.clone(),
            level: 3,
        });
        match &prayer.relief {
            Relief::Items(items) => {
                blocks.extend(items.iter().enumerate().map(|(i, text)| Block::Item {
                    marker: relief_label(i),
                    text: text.clone(),
                }))
            }
            Relief::Text(text) => blocks.push(Block::Paragraph { text: text.clone() }),
        }
    }

    let footer = &model.footer;
    if let Some(note) = &footer.closing_note {
        blocks.push(Block::Paragraph { text: note.clone() });
    }

    let mut left = Vec::new();
    if let Some(place) = &footer.place {
        left.push(format!("Place: {}", place));
    }
    if let Some(date) = &footer.date {
        left.push(format!("Date: {}", date));
    }
    let mut right = Vec::new();
    if let Some(advocate) = &footer.advocate_name {
        right.push(advocate.clone());
        right.push("Advocate for the ".to_string() + &moving_label(model));
    }
    if !left.is_empty() || !right.is_empty() {
        blocks.push(Block::Signature { left, right });
    }

    if options.include_verification {
        if let Some(verification) = &footer.verification {
            blocks.push(Block::Heading {
                text: "VERIFICATION".to_string(),
                level: 3,
            });
            blocks.push(Block::Paragraph {
                text: verification.clone(),
            });
        }
    }

    PageLayout {
        paper: options.paper,
        font_size: options.font_size,
        blocks,
    }
}

fn push_parties<'a>(blocks: &mut Vec<Block>, groups: impl Iterator<Item = &'a PartyGroup>) {
    for group in groups {
        blocks.push(Block::Party {
            members: group.members.iter().map(party_rows).collect(),
            role_label: format!("...{}", group.role.block_label(group.members.len())),
        });
    }
}

fn party_rows(party: &Party) -> Vec<Row> {
    let row = |label: &str, value: &str| Row {
        label: label.to_string(),
        value: value.to_string(),
    };

    let mut rows = vec![row("Name", &party.name)];
    if let Some(guardian) = &party.guardian_name {
        rows.push(row(party.relation.as_deref().unwrap_or("S/o"), guardian));
    }
    if let Some(age) = &party.age {
        rows.push(row("Age", &format!("{} years", age)));
    }
    if let Some(occupation) = &party.occupation {
        rows.push(row("Occupation", occupation));
    }
    if let Some(address) = &party.address {
        rows.push(row("Address", address));
    }
    rows
}

fn moving_label(model: &DocumentModel) -> String {
    model
        .moving_parties()
        .next()
        .map(|g| g.role.block_label(g.members.len()))
        .unwrap_or_else(|| "Applicant".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use draft_model::{Body, BodyLabel, CourtDetails, Footer, PartyRole, Prayer};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn model() -> DocumentModel {
        DocumentModel {
            court: CourtDetails {
                court_name: Some("Sessions Judge".to_string()),
                district: Some("Pune".to_string()),
                year: Some("2024".to_string()),
                ..CourtDetails::default()
            },
            parties: vec![
                PartyGroup {
                    role: PartyRole::Applicant,
                    members: vec![Party::named("Ramesh Kumar")],
                },
                PartyGroup {
                    role: PartyRole::State,
                    members: vec![Party::named("State of Maharashtra")],
                },
            ],
            title: Some("APPLICATION FOR REGULAR BAIL".to_string()),
            subtitle: None,
            body: Body {
                label: BodyLabel::Grounds,
                paragraphs: vec!["A".into(), "B".into(), "C".into()],
            },
            prayer: Some(Prayer {
                heading: "PRAYER".to_string(),
                relief: Relief::Items(vec!["Release the applicant".into(), "Costs".into()]),
            }),
            footer: Footer {
                place: Some("Pune".to_string()),
                advocate_name: Some("Adv. Meera Joshi".to_string()),
                ..Footer::default()
            },
        }
    }

    #[test]
    fn test_grounds_numbered_in_order() {
        let text = build_layout(&model(), &LayoutOptions::default()).plain_text();
        let a = text.find("1. A").unwrap();
        let b = text.find("2. B").unwrap();
        let c = text.find("3. C").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_prayer_items_lettered() {
        let text = build_layout(&model(), &LayoutOptions::default()).plain_text();
        assert!(text.contains("(a) Release the applicant"));
        assert!(text.contains("(b) Costs"));
    }

    #[test]
    fn test_cause_title_order() {
        let layout = build_layout(&model(), &LayoutOptions::default());
        let text = layout.plain_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "IN THE COURT OF SESSIONS JUDGE, PUNE");
        assert_eq!(lines[1], "District Pune");
        assert_eq!(lines[2], "Case No. ______ of 2024");
        assert_eq!(lines[3], "Name: Ramesh Kumar");
        assert_eq!(lines[4], "...Applicant");
        assert_eq!(lines[5], "VERSUS");
        assert_eq!(lines[6], "Name: State of Maharashtra");
    }

    #[test]
    fn test_missing_prayer_is_omitted() {
        let mut model = model();
        model.prayer = None;
        let layout = build_layout(&model, &LayoutOptions::default());

        assert!(!layout.plain_text().contains("PRAYER"));
        assert!(layout
            .blocks
            .iter()
            .all(|b| !matches!(b, Block::Item { marker, .. } if marker.starts_with('('))));
    }

    #[test]
    fn test_prayer_text_block() {
        let mut model = model();
        model.prayer = Some(Prayer {
            heading: "PRAYER".to_string(),
            relief: Relief::Text("Grant bail.".to_string()),
        });
        let text = build_layout(&model, &LayoutOptions::default()).plain_text();
        assert!(text.contains("PRAYER\nGrant bail."));
    }

    #[test]
    fn test_signature_names_moving_side() {
        let layout = build_layout(&model(), &LayoutOptions::default());
        assert_eq!(
            layout.blocks.last(),
            Some(&Block::Signature {
                left: vec!["Place: Pune".to_string()],
                right: vec![
                    "Adv. Meera Joshi".to_string(),
                    "Advocate for the Applicant".to_string()
                ],
            })
        );
    }

    #[test]
    fn test_verification_respects_option() {
        let mut model = model();
        model.footer.verification = Some("Verified at Pune.".to_string());

        let with = build_layout(&model, &LayoutOptions::default()).plain_text();
        assert!(with.ends_with("VERIFICATION\nVerified at Pune."));

        let options = LayoutOptions {
            include_verification: false,
            ..LayoutOptions::default()
        };
        let without = build_layout(&model, &options).plain_text();
        assert!(!without.contains("VERIFICATION"));
    }

    #[test]
    fn test_input_shape() {
        let input = build_layout(&model(), &LayoutOptions::default()).to_input();
        assert_eq!(input["paper"], "a4");
        assert_eq!(input["blocks"][0]["kind"], "heading");
        assert_eq!(input["blocks"][0]["level"], 1);
    }

    proptest! {
        /// n grounds become items "1." to "n.", in input order
        #[test]
        fn grounds_numbered_consecutively(
            grounds in prop::collection::vec("[A-Za-z ]{1,24}", 1..30),
        ) {
            let mut model = model();
            model.body.paragraphs = grounds.clone();
            model.prayer = None;
            let layout = build_layout(&model, &LayoutOptions::default());

            let items: Vec<(String, String)> = layout
                .blocks
                .into_iter()
                .filter_map(|b| match b {
                    Block::Item { marker, text } => Some((marker, text)),
                    _ => None,
                })
                .collect();
            let expected: Vec<(String, String)> = grounds
                .into_iter()
                .enumerate()
                .map(|(i, text)| (format!("{}.", i + 1), text))
                .collect();
            prop_assert_eq!(items, expected);
        }
    }
}
