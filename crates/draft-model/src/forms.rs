//! Form schemas, records and field-level validation
//!
//! Validation only mirrors what an HTML form would enforce on its own:
//! required presence, numeric ranges, phone/email/date shapes and select
//! membership. Anything cross-field is the generation service's business.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::kinds::DocumentKind;
use crate::types::PartyRole;

lazy_static! {
    static ref PHONE_PATTERN: Regex = Regex::new(r"^(\+91[\s-]?)?[6-9][0-9]{9}$").unwrap();
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
    static ref DATE_PATTERN: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

const INDIAN_STATES: &[&str] = &[
    "Andhra Pradesh",
    "Bihar",
    "Delhi",
    "Gujarat",
    "Haryana",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Punjab",
    "Rajasthan",
    "Tamil Nadu",
    "Telangana",
    "Uttar Pradesh",
    "West Bengal",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormSection {
    Court,
    FirstParty,
    SecondParty,
    Particulars,
    Advocate,
    /// Login and signup screens
    Account,
}

impl FormSection {
    pub fn heading(&self, kind: DocumentKind) -> String {
        let (moving, responding) = kind.parties();
        match self {
            FormSection::Court => "Court Details".to_string(),
            FormSection::FirstParty => format!("{} Details", moving.label()),
            FormSection::SecondParty => format!("{} Details", responding.label()),
            FormSection::Particulars => "Case Particulars".to_string(),
            FormSection::Advocate => "Advocate & Filing".to_string(),
            FormSection::Account => "Account".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldControl {
    Text,
    TextArea,
    Date,
    Number { min: Option<f64>, max: Option<f64> },
    Phone,
    Email,
    Select { options: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub section: FormSection,
    pub control: FieldControl,
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>, section: FormSection) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            section,
            control: FieldControl::Text,
            required: false,
        }
    }

    pub fn control(mut self, control: FieldControl) -> Self {
        self.control = control;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Check one raw value against this field's constraints
    pub fn check(&self, raw: &str) -> Result<(), FieldError> {
        let value = raw.trim();

        if value.is_empty() {
            return if self.required {
                Err(self.error("is required"))
            } else {
                Ok(())
            };
        }

        match &self.control {
            FieldControl::Text | FieldControl::TextArea => Ok(()),
            FieldControl::Date => {
                if DATE_PATTERN.is_match(value) {
                    Ok(())
                } else {
                    Err(self.error("must be a date (YYYY-MM-DD)"))
                }
            }
            FieldControl::Number { min, max } => {
                // NaN and infinities parse as f64 but are not numbers to a form
                let n: f64 = value
                    .parse()
                    .ok()
                    .filter(|n: &f64| n.is_finite())
                    .ok_or_else(|| self.error("must be a number"))?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(self.error(format!("must be at least {}", min)));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(self.error(format!("must be at most {}", max)));
                    }
                }
                Ok(())
            }
            FieldControl::Phone => {
                let compact: String = value.chars().filter(|c| *c != ' ').collect();
                if PHONE_PATTERN.is_match(&compact) {
                    Ok(())
                } else {
                    Err(self.error("must be a 10-digit mobile number"))
                }
            }
            FieldControl::Email => {
                if EMAIL_PATTERN.is_match(value) {
                    Ok(())
                } else {
                    Err(self.error("must be a valid email address"))
                }
            }
            FieldControl::Select { options } => {
                if options.iter().any(|o| o == value) {
                    Ok(())
                } else {
                    Err(self.error("must be one of the listed options"))
                }
            }
        }
    }

    fn error(&self, message: impl Into<String>) -> FieldError {
        FieldError {
            field: self.name.clone(),
            message: format!("{} {}", self.label, message.into()),
        }
    }
}

/// A single failed field, shown inline next to the control
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// The ordered field list for one document kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub kind: DocumentKind,
    pub fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn for_kind(kind: DocumentKind) -> Self {
        let (moving, responding) = kind.parties();

        let mut fields = court_fields();
        fields.extend(party_fields(moving, FormSection::FirstParty, true));
        fields.extend(party_fields(responding, FormSection::SecondParty, false));
        fields.extend(particular_fields(kind));
        fields.extend(advocate_fields());

        Self { kind, fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn section(&self, section: FormSection) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(move |f| f.section == section)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// An empty record with every schema field present
    pub fn blank_record(&self) -> FormRecord {
        let mut record = FormRecord::default();
        for field in &self.fields {
            record.set(&field.name, "");
        }
        record
    }
}

fn court_fields() -> Vec<FieldSpec> {
    use FormSection::Court;
    vec![
        FieldSpec::new("courtName", "Court", Court).required(),
        FieldSpec::new("district", "District", Court).required(),
        FieldSpec::new("state", "State", Court).control(FieldControl::Select {
            options: INDIAN_STATES.iter().map(|s| s.to_string()).collect(),
        }),
        FieldSpec::new("caseNumber", "Case number", Court),
        FieldSpec::new("year", "Year", Court).control(FieldControl::Number {
            min: Some(1950.0),
            max: Some(2100.0),
        }),
    ]
}

/// Party fields are prefixed with the role key ("applicantName")
fn party_fields(role: PartyRole, section: FormSection, full: bool) -> Vec<FieldSpec> {
    let key = role.key();
    let label = role.label();
    let name = |suffix: &str| format!("{}{}", key, suffix);

    if role == PartyRole::State {
        return vec![FieldSpec::new(name("Name"), "State represented through", section)];
    }

    let mut fields = vec![
        FieldSpec::new(name("Name"), format!("{} name", label), section).required(),
        FieldSpec::new(name("GuardianName"), "Father's / husband's name", section),
        FieldSpec::new(name("Relation"), "Relation", section).control(FieldControl::Select {
            options: vec!["S/o".into(), "D/o".into(), "W/o".into()],
        }),
        FieldSpec::new(name("Age"), "Age", section).control(FieldControl::Number {
            min: Some(0.0),
            max: Some(120.0),
        }),
        FieldSpec::new(name("Address"), "Address", section)
            .control(FieldControl::TextArea)
            .required(),
    ];

    if full {
        fields.push(FieldSpec::new(name("Occupation"), "Occupation", section));
        fields.push(FieldSpec::new(name("Phone"), "Mobile", section).control(FieldControl::Phone));
        fields.push(FieldSpec::new(name("Email"), "Email", section).control(FieldControl::Email));
    }

    fields
}

fn particular_fields(kind: DocumentKind) -> Vec<FieldSpec> {
    use FieldControl::{Date, Number, Select, TextArea};
    use FormSection::Particulars as P;

    let amount = |name: &str, label: &str| {
        FieldSpec::new(name, label, P).control(Number {
            min: Some(0.0),
            max: None,
        })
    };

    let mut fields = match kind {
        DocumentKind::BailApplication | DocumentKind::AnticipatoryBail => vec![
            FieldSpec::new("firNumber", "FIR number", P).required(),
            FieldSpec::new("policeStation", "Police station", P).required(),
            FieldSpec::new("offenceSections", "Sections of offence", P).required(),
            FieldSpec::new("arrestDate", "Date of arrest", P).control(Date),
            FieldSpec::new("previousBail", "Previous bail application", P).control(Select {
                options: vec!["No".into(), "Yes".into()],
            }),
        ],
        DocumentKind::BailCancellation => vec![
            FieldSpec::new("bailOrderDate", "Date of bail order", P)
                .control(Date)
                .required(),
            FieldSpec::new("firNumber", "FIR number", P).required(),
            FieldSpec::new("violations", "Conditions violated", P).control(TextArea),
        ],
        DocumentKind::TemporaryInjunction | DocumentKind::PermanentInjunction => vec![
            FieldSpec::new("propertyDescription", "Property description", P)
                .control(TextArea)
                .required(),
            FieldSpec::new("causeOfActionDate", "Cause of action arose on", P).control(Date),
            FieldSpec::new("threatenedAct", "Act sought to be restrained", P)
                .control(TextArea)
                .required(),
        ],
        DocumentKind::MaintenancePetition => vec![
            FieldSpec::new("marriageDate", "Date of marriage", P).control(Date),
            amount("monthlyAmount", "Maintenance claimed per month"),
            amount("respondentIncome", "Respondent's monthly income"),
            FieldSpec::new("children", "Children", P).control(Number {
                min: Some(0.0),
                max: Some(20.0),
            }),
        ],
        DocumentKind::DivorcePetition | DocumentKind::RestitutionOfConjugalRights => vec![
            FieldSpec::new("marriageDate", "Date of marriage", P)
                .control(Date)
                .required(),
            FieldSpec::new("marriagePlace", "Place of marriage", P).required(),
            FieldSpec::new("separationDate", "Living separately since", P).control(Date),
            FieldSpec::new("marriageAct", "Governing law", P).control(Select {
                options: vec![
                    "Hindu Marriage Act, 1955".into(),
                    "Special Marriage Act, 1954".into(),
                ],
            }),
        ],
        DocumentKind::DomesticViolence => vec![
            FieldSpec::new("incidentDate", "Date of last incident", P).control(Date),
            FieldSpec::new("sharedHousehold", "Shared household address", P).control(TextArea),
            FieldSpec::new("reliefsSought", "Reliefs sought", P).control(TextArea),
        ],
        DocumentKind::ChequeBounce => vec![
            FieldSpec::new("chequeNumber", "Cheque number", P).required(),
            FieldSpec::new("chequeDate", "Cheque date", P)
                .control(Date)
                .required(),
            amount("chequeAmount", "Cheque amount").required(),
            FieldSpec::new("bankName", "Drawee bank", P),
            FieldSpec::new("noticeDate", "Legal notice date", P).control(Date),
        ],
        DocumentKind::MoneyRecovery => vec![
            amount("principalAmount", "Principal amount").required(),
            FieldSpec::new("interestRate", "Interest rate (% p.a.)", P).control(Number {
                min: Some(0.0),
                max: Some(100.0),
            }),
            FieldSpec::new("loanDate", "Date of advance", P).control(Date),
        ],
        DocumentKind::EvictionSuit => vec![
            FieldSpec::new("premisesAddress", "Tenanted premises", P)
                .control(TextArea)
                .required(),
            amount("monthlyRent", "Monthly rent"),
            FieldSpec::new("tenancyStart", "Tenancy commenced", P).control(Date),
            FieldSpec::new("evictionGround", "Ground for eviction", P).control(Select {
                options: vec![
                    "Arrears of rent".into(),
                    "Bona fide requirement".into(),
                    "Sub-letting".into(),
                    "Misuse of premises".into(),
                ],
            }),
        ],
        DocumentKind::ConsumerComplaint => vec![
            FieldSpec::new("productOrService", "Product or service", P).required(),
            FieldSpec::new("purchaseDate", "Date of purchase", P).control(Date),
            amount("amountPaid", "Amount paid"),
            amount("compensationClaimed", "Compensation claimed"),
        ],
        DocumentKind::ChildCustody => vec![
            FieldSpec::new("childName", "Child's name", P).required(),
            FieldSpec::new("childAge", "Child's age", P).control(Number {
                min: Some(0.0),
                max: Some(18.0),
            }),
            FieldSpec::new("currentCustodian", "Currently residing with", P),
        ],
        DocumentKind::CaveatPetition => vec![
            FieldSpec::new("anticipatedProceeding", "Anticipated proceeding", P)
                .control(TextArea)
                .required(),
            FieldSpec::new("impugnedOrderDate", "Date of order", P).control(Date),
        ],
    };

    fields.push(
        FieldSpec::new("facts", "Brief facts", P)
            .control(TextArea)
            .required(),
    );
    fields
}

fn advocate_fields() -> Vec<FieldSpec> {
    use FormSection::Advocate;
    vec![
        FieldSpec::new("advocateName", "Advocate name", Advocate),
        FieldSpec::new("advocateEnrollment", "Enrollment number", Advocate),
        FieldSpec::new("place", "Place", Advocate),
        FieldSpec::new("date", "Date", Advocate).control(FieldControl::Date),
    ]
}

/// Values entered so far, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormRecord {
    values: BTreeMap<String, String>,
}

impl FormRecord {
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Every failing field, in schema order
    pub fn validate(&self, schema: &FormSchema) -> Result<(), Vec<FieldError>> {
        let errors: Vec<FieldError> = schema
            .fields
            .iter()
            .filter_map(|spec| spec.check(self.get(&spec.name).unwrap_or("")).err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Flat JSON object whose keys are exactly the schema's field names
    ///
    /// Values the user never touched are sent as empty strings; values for
    /// names outside the schema are dropped.
    pub fn to_payload(&self, schema: &FormSchema) -> Value {
        let mut payload = Map::new();
        for field in &schema.fields {
            let value = self.get(&field.name).map(str::trim).unwrap_or("");
            payload.insert(field.name.clone(), Value::String(value.to_string()));
        }
        Value::Object(payload)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = FormRecord::default();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}
