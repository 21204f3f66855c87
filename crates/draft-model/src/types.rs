use serde::{Deserialize, Serialize};

/// A validated legal document, ready for rendering
///
/// Produced by [`crate::normalize::from_reply`]; renderers can rely on the
/// invariants documented on each field instead of re-checking the raw reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentModel {
    pub court: CourtDetails,
    /// At least one group; every group has at least one member.
    /// Moving-side groups come before responding-side groups.
    pub parties: Vec<PartyGroup>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Body,
    pub prayer: Option<Prayer>,
    pub footer: Footer,
}

impl DocumentModel {
    /// Groups on the side that brings the application
    pub fn moving_parties(&self) -> impl Iterator<Item = &PartyGroup> {
        self.parties.iter().filter(|g| g.role.side() == Side::Moving)
    }

    /// Groups on the side that answers the application
    pub fn responding_parties(&self) -> impl Iterator<Item = &PartyGroup> {
        self.parties
            .iter()
            .filter(|g| g.role.side() == Side::Responding)
    }

    /// Name of the first listed party (used for download filenames)
    pub fn first_party_name(&self) -> Option<&str> {
        self.parties
            .first()
            .and_then(|g| g.members.first())
            .map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtDetails {
    pub court_name: Option<String>,
    pub court_type: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub case_number: Option<String>,
    pub year: Option<String>,
}

impl CourtDetails {
    /// "IN THE COURT OF THE SESSIONS JUDGE, PUNE" style heading
    pub fn heading(&self) -> Option<String> {
        let court = self.court_name.as_deref().or(self.court_type.as_deref())?;
        let mut heading = if court.to_uppercase().starts_with("IN THE") {
            court.to_uppercase()
        } else {
            format!("IN THE COURT OF {}", court.to_uppercase())
        };
        if let Some(district) = &self.district {
            if !heading.contains(&district.to_uppercase()) {
                heading.push_str(", ");
                heading.push_str(&district.to_uppercase());
            }
        }
        Some(heading)
    }

    /// Secondary heading line naming the district and state
    pub fn location_line(&self) -> Option<String> {
        match (&self.district, &self.state) {
            (Some(d), Some(s)) => Some(format!("District {}, {}", d, s)),
            (Some(d), None) => Some(format!("District {}", d)),
            (None, Some(s)) => Some(s.clone()),
            (None, None) => None,
        }
    }

    /// "Case No. 45 of 2024"; the number is left blank for the registry when absent
    pub fn case_line(&self, label: &str) -> Option<String> {
        match (&self.case_number, &self.year) {
            (Some(n), Some(y)) => Some(format!("{} No. {} of {}", label, n, y)),
            (Some(n), None) => Some(format!("{} No. {}", label, n)),
            (None, Some(y)) => Some(format!("{} No. ______ of {}", label, y)),
            (None, None) => None,
        }
    }
}

/// Which side of the dispute a role sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Moving,
    Responding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Applicant,
    Petitioner,
    Plaintiff,
    Complainant,
    Appellant,
    Caveator,
    Aggrieved,
    Accused,
    Respondent,
    Defendant,
    OppositeParty,
    State,
}

impl PartyRole {
    pub const ALL: [PartyRole; 12] = [
        PartyRole::Applicant,
        PartyRole::Petitioner,
        PartyRole::Plaintiff,
        PartyRole::Complainant,
        PartyRole::Appellant,
        PartyRole::Caveator,
        PartyRole::Aggrieved,
        PartyRole::Accused,
        PartyRole::Respondent,
        PartyRole::Defendant,
        PartyRole::OppositeParty,
        PartyRole::State,
    ];

    pub fn side(&self) -> Side {
        match self {
            PartyRole::Applicant
            | PartyRole::Petitioner
            | PartyRole::Plaintiff
            | PartyRole::Complainant
            | PartyRole::Appellant
            | PartyRole::Caveator
            | PartyRole::Aggrieved => Side::Moving,
            PartyRole::Accused
            | PartyRole::Respondent
            | PartyRole::Defendant
            | PartyRole::OppositeParty
            | PartyRole::State => Side::Responding,
        }
    }

    /// Singular display label, e.g. "Applicant"
    pub fn label(&self) -> &'static str {
        match self {
            PartyRole::Applicant => "Applicant",
            PartyRole::Petitioner => "Petitioner",
            PartyRole::Plaintiff => "Plaintiff",
            PartyRole::Complainant => "Complainant",
            PartyRole::Appellant => "Appellant",
            PartyRole::Caveator => "Caveator",
            PartyRole::Aggrieved => "Aggrieved Person",
            PartyRole::Accused => "Accused",
            PartyRole::Respondent => "Respondent",
            PartyRole::Defendant => "Defendant",
            PartyRole::OppositeParty => "Opposite Party",
            PartyRole::State => "Respondent (State)",
        }
    }

    /// Label used next to a party block ("...Applicant" / "...Applicants")
    pub fn block_label(&self, count: usize) -> String {
        if count > 1 && !matches!(self, PartyRole::Accused | PartyRole::State) {
            format!("{}s", self.label())
        } else {
            self.label().to_string()
        }
    }

    /// Key used in form field names and reply objects ("oppositeParty")
    pub fn key(&self) -> &'static str {
        match self {
            PartyRole::Applicant => "applicant",
            PartyRole::Petitioner => "petitioner",
            PartyRole::Plaintiff => "plaintiff",
            PartyRole::Complainant => "complainant",
            PartyRole::Appellant => "appellant",
            PartyRole::Caveator => "caveator",
            PartyRole::Aggrieved => "aggrieved",
            PartyRole::Accused => "accused",
            PartyRole::Respondent => "respondent",
            PartyRole::Defendant => "defendant",
            PartyRole::OppositeParty => "oppositeParty",
            PartyRole::State => "state",
        }
    }

    /// Parse a reply key, accepting plurals, snake_case and camelCase
    pub fn from_key(raw: &str) -> Option<Self> {
        let folded: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        let singular = folded
            .strip_suffix("ies")
            .map(|s| format!("{}y", s))
            .or_else(|| folded.strip_suffix('s').map(str::to_string))
            .unwrap_or_else(|| folded.clone());

        [folded.as_str(), singular.as_str()]
            .iter()
            .find_map(|candidate| match *candidate {
                "applicant" => Some(PartyRole::Applicant),
                "petitioner" => Some(PartyRole::Petitioner),
                "plaintiff" => Some(PartyRole::Plaintiff),
                "complainant" => Some(PartyRole::Complainant),
                "appellant" => Some(PartyRole::Appellant),
                "caveator" => Some(PartyRole::Caveator),
                "aggrieved" | "aggrievedperson" => Some(PartyRole::Aggrieved),
                "accused" => Some(PartyRole::Accused),
                "respondent" => Some(PartyRole::Respondent),
                "defendant" => Some(PartyRole::Defendant),
                "oppositeparty" => Some(PartyRole::OppositeParty),
                "state" | "prosecution" => Some(PartyRole::State),
                _ => None,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyGroup {
    pub role: PartyRole,
    pub members: Vec<Party>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub name: String,
    pub guardian_name: Option<String>,
    /// Relation prefix such as "S/o", "D/o", "W/o"
    pub relation: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub age: Option<String>,
}

impl Party {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Descriptive lines printed under the name, in cause-title order
    pub fn description_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(guardian) = &self.guardian_name {
            let relation = self.relation.as_deref().unwrap_or("S/o");
            lines.push(format!("{} {}", relation, guardian));
        }

        match (&self.age, &self.occupation) {
            (Some(age), Some(occ)) => {
                lines.push(format!("Aged about {} years, Occupation: {}", age, occ))
            }
            (Some(age), None) => lines.push(format!("Aged about {} years", age)),
            (None, Some(occ)) => lines.push(format!("Occupation: {}", occ)),
            (None, None) => {}
        }

        if let Some(address) = &self.address {
            lines.push(format!("R/o {}", address));
        }

        lines
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyLabel {
    Grounds,
    Facts,
}

impl BodyLabel {
    pub fn heading(&self) -> &'static str {
        match self {
            BodyLabel::Grounds => "GROUNDS",
            BodyLabel::Facts => "FACTS OF THE CASE",
        }
    }
}

/// Ordered paragraphs of the application; rendered with 1-based numbering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub label: BodyLabel,
    pub paragraphs: Vec<String>,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            label: BodyLabel::Grounds,
            paragraphs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prayer {
    pub heading: String,
    pub relief: Relief,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Relief {
    /// Ordered relief clauses, lettered (a), (b), ... in output
    Items(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    pub place: Option<String>,
    pub date: Option<String>,
    pub advocate_name: Option<String>,
    pub closing_note: Option<String>,
    pub verification: Option<String>,
}

/// Letter label for the zero-based relief index: (a), (b), ... (z), (aa), (ab)
pub fn relief_label(index: usize) -> String {
    let mut n = index;
    let mut letters = Vec::new();
    loop {
        letters.push((b'a' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.reverse();
    format!("({})", letters.into_iter().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relief_labels() {
        assert_eq!(relief_label(0), "(a)");
        assert_eq!(relief_label(2), "(c)");
        assert_eq!(relief_label(25), "(z)");
        assert_eq!(relief_label(26), "(aa)");
        assert_eq!(relief_label(27), "(ab)");
    }

    #[test]
    fn test_role_from_key_variants() {
        assert_eq!(PartyRole::from_key("applicant"), Some(PartyRole::Applicant));
        assert_eq!(PartyRole::from_key("Applicants"), Some(PartyRole::Applicant));
        assert_eq!(
            PartyRole::from_key("opposite_party"),
            Some(PartyRole::OppositeParty)
        );
        assert_eq!(
            PartyRole::from_key("oppositeParties"),
            Some(PartyRole::OppositeParty)
        );
        assert_eq!(PartyRole::from_key("accused"), Some(PartyRole::Accused));
        assert_eq!(PartyRole::from_key("witness"), None);
    }

    #[test]
    fn test_every_role_key_round_trips() {
        for role in PartyRole::ALL {
            assert_eq!(PartyRole::from_key(role.key()), Some(role));
        }
    }

    #[test]
    fn test_party_description_lines() {
        let party = Party {
            name: "Ramesh Kumar".to_string(),
            guardian_name: Some("Suresh Kumar".to_string()),
            relation: None,
            address: Some("12 MG Road, Pune".to_string()),
            occupation: Some("Farmer".to_string()),
            age: Some("34".to_string()),
        };

        assert_eq!(
            party.description_lines(),
            vec![
                "S/o Suresh Kumar".to_string(),
                "Aged about 34 years, Occupation: Farmer".to_string(),
                "R/o 12 MG Road, Pune".to_string(),
            ]
        );
    }

    #[test]
    fn test_court_heading() {
        let court = CourtDetails {
            court_name: Some("Sessions Judge".to_string()),
            district: Some("Pune".to_string()),
            ..CourtDetails::default()
        };
        assert_eq!(
            court.heading().as_deref(),
            Some("IN THE COURT OF SESSIONS JUDGE, PUNE")
        );
        assert_eq!(CourtDetails::default().heading(), None);
    }

    #[test]
    fn test_case_line_without_number() {
        let court = CourtDetails {
            year: Some("2024".to_string()),
            ..CourtDetails::default()
        };
        assert_eq!(
            court.case_line("Bail Application").as_deref(),
            Some("Bail Application No. ______ of 2024")
        );
    }
}
