//! Boundary decoding of webhook replies into [`DocumentModel`]
//!
//! The generation service is not versioned: field names drift between
//! document kinds and optional sections come and go. Every alias the
//! service is known to emit is folded here, once, so renderers only ever
//! see the typed model.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ModelError;
use crate::types::{
    Body, BodyLabel, CourtDetails, DocumentModel, Footer, Party, PartyGroup, PartyRole, Prayer,
    Relief,
};

/// Keys that mark an object as the model itself rather than an envelope
const MODEL_KEYS: &[&str] = &[
    "courtDetails",
    "parties",
    "applicationTitle",
    "applicationBody",
    "prayer",
];

/// Envelope keys some webhook platforms wrap the payload in
const ENVELOPE_KEYS: &[&str] = &["output", "data", "document", "result"];

const MAX_ENVELOPE_DEPTH: usize = 3;

const DEFAULT_PRAYER_HEADING: &str = "PRAYER";

impl DocumentModel {
    /// See [`from_reply`]
    pub fn from_reply(reply: Value) -> Result<Self, ModelError> {
        from_reply(reply)
    }
}

/// Decode a webhook reply into a validated model
///
/// Array replies use their first element; bare objects are used as-is.
pub fn from_reply(reply: Value) -> Result<DocumentModel, ModelError> {
    let obj = unwrap_reply(reply)?;
    from_object(&obj)
}

/// Decode an already unwrapped model object
pub fn from_object(obj: &Map<String, Value>) -> Result<DocumentModel, ModelError> {
    let court = obj
        .get("courtDetails")
        .or_else(|| obj.get("court"))
        .and_then(Value::as_object)
        .map(parse_court)
        .unwrap_or_default();

    let parties = parse_parties(obj)?;

    let title = first_text(obj, &["applicationTitle", "title", "documentTitle"]);
    let subtitle = first_text(obj, &["applicationSubtitle", "subtitle"]);
    let body = parse_body(obj)?;
    let prayer = match obj.get("prayer") {
        Some(value) => parse_prayer(value)?,
        None => None,
    };
    let footer = parse_footer(obj);

    debug!(
        groups = parties.len(),
        paragraphs = body.paragraphs.len(),
        has_prayer = prayer.is_some(),
        "Decoded document model"
    );

    Ok(DocumentModel {
        court,
        parties,
        title,
        subtitle,
        body,
        prayer,
        footer,
    })
}

/// Peel arrays, JSON-in-a-string and envelope objects off a reply
pub fn unwrap_reply(reply: Value) -> Result<Map<String, Value>, ModelError> {
    let mut current = reply;

    for _ in 0..=MAX_ENVELOPE_DEPTH {
        current = match current {
            Value::Array(mut items) => {
                if items.is_empty() {
                    return Err(ModelError::EmptyReply);
                }
                items.swap_remove(0)
            }
            Value::String(text) => serde_json::from_str::<Value>(text.trim())
                .map_err(|_| ModelError::NotAnObject("a string"))?,
            Value::Object(mut obj) => {
                if MODEL_KEYS.iter().any(|k| obj.contains_key(*k)) {
                    return Ok(obj);
                }
                let envelope = ENVELOPE_KEYS.iter().find(|k| {
                    matches!(
                        obj.get(**k),
                        Some(Value::Object(_) | Value::Array(_) | Value::String(_))
                    )
                });
                match envelope {
                    Some(key) => match obj.remove(*key) {
                        Some(inner) => inner,
                        None => return Ok(obj),
                    },
                    None => return Ok(obj),
                }
            }
            Value::Null => return Err(ModelError::NotAnObject("null")),
            Value::Bool(_) => return Err(ModelError::NotAnObject("a boolean")),
            Value::Number(_) => return Err(ModelError::NotAnObject("a number")),
        };
    }

    match current {
        Value::Object(obj) => Ok(obj),
        _ => Err(ModelError::NotAnObject("a nested envelope")),
    }
}

fn parse_court(obj: &Map<String, Value>) -> CourtDetails {
    CourtDetails {
        court_name: first_text(obj, &["courtName", "name"]),
        court_type: first_text(obj, &["courtType", "type"]),
        district: first_text(obj, &["district", "city"]),
        state: first_text(obj, &["state"]),
        case_number: first_text(
            obj,
            &[
                "caseNumber",
                "suitNumber",
                "petitionNumber",
                "complaintNumber",
                "applicationNumber",
                "caseNo",
                "number",
            ],
        ),
        year: first_text(obj, &["year", "caseYear", "suitYear", "petitionYear"]),
    }
}

fn parse_parties(obj: &Map<String, Value>) -> Result<Vec<PartyGroup>, ModelError> {
    let mut groups = match obj.get("parties") {
        Some(Value::Object(parties)) => groups_from_role_map(parties, true)?,
        Some(Value::Array(items)) => groups_from_tagged_list(items)?,
        Some(Value::Null) | None => groups_from_role_map(obj, false)?,
        Some(_) => return Err(ModelError::invalid("parties", "an object or array")),
    };

    if groups.is_empty() {
        return Err(ModelError::MissingParties);
    }

    // Moving side first, original order within a side
    groups.sort_by_key(|g| g.role.side());
    Ok(groups)
}

/// `{ "applicant": {...}, "respondents": [...] }`
///
/// When `strict` is false the map is the model root, so keys that are not
/// roles are simply other model fields.
fn groups_from_role_map(
    map: &Map<String, Value>,
    strict: bool,
) -> Result<Vec<PartyGroup>, ModelError> {
    let mut groups: Vec<PartyGroup> = Vec::new();

    for (key, value) in map {
        let Some(role) = PartyRole::from_key(key) else {
            if strict {
                warn!(key = %key, "Ignoring unrecognised party key");
            }
            continue;
        };

        // A root-level "state" is the court's state, not a party
        if !strict && role == PartyRole::State && value.is_string() {
            continue;
        }

        let members = parse_members(key, value)?;
        if members.is_empty() {
            return Err(ModelError::EmptyPartyGroup(key.clone()));
        }
        push_members(&mut groups, role, members);
    }

    Ok(groups)
}

/// `[ { "role": "applicant", "name": ... }, ... ]`
fn groups_from_tagged_list(items: &[Value]) -> Result<Vec<PartyGroup>, ModelError> {
    let mut groups: Vec<PartyGroup> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let entry = item
            .as_object()
            .ok_or_else(|| ModelError::invalid(format!("parties[{}]", index), "an object"))?;
        let raw_role = first_text(entry, &["role", "type", "partyType"])
            .ok_or_else(|| ModelError::invalid(format!("parties[{}].role", index), "a string"))?;
        let role =
            PartyRole::from_key(&raw_role).ok_or_else(|| ModelError::UnknownRole(raw_role))?;

        if let Some(member) = parse_member(entry) {
            push_members(&mut groups, role, vec![member]);
        }
    }

    if let Some(empty) = groups.iter().find(|g| g.members.is_empty()) {
        return Err(ModelError::EmptyPartyGroup(empty.role.key().to_string()));
    }

    Ok(groups)
}

fn push_members(groups: &mut Vec<PartyGroup>, role: PartyRole, members: Vec<Party>) {
    match groups.iter_mut().find(|g| g.role == role) {
        Some(group) => group.members.extend(members),
        None => groups.push(PartyGroup { role, members }),
    }
}

fn parse_members(key: &str, value: &Value) -> Result<Vec<Party>, ModelError> {
    match value {
        Value::Object(entry) => Ok(parse_member(entry).into_iter().collect()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match item {
                Value::Object(entry) => parse_member(entry).map(Ok),
                Value::String(name) => clean(name).map(|n| Ok(Party::named(n))),
                Value::Null => None,
                _ => Some(Err(ModelError::invalid(
                    format!("{}[{}]", key, i),
                    "an object or name",
                ))),
            })
            .collect(),
        Value::String(name) => Ok(clean(name).map(Party::named).into_iter().collect()),
        Value::Null => Ok(Vec::new()),
        _ => Err(ModelError::invalid(key, "an object, array or name")),
    }
}

/// A member without a name is dropped
fn parse_member(entry: &Map<String, Value>) -> Option<Party> {
    let name = first_text(entry, &["name", "fullName", "partyName"])?;

    Some(Party {
        name,
        guardian_name: first_text(
            entry,
            &[
                "guardianName",
                "fatherName",
                "fatherOrHusbandName",
                "husbandName",
                "parentName",
            ],
        ),
        relation: first_text(entry, &["relation", "guardianRelation", "relationship"]),
        address: first_text(entry, &["address", "residence", "fullAddress"]),
        occupation: first_text(entry, &["occupation", "profession"]),
        age: first_text(entry, &["age"]),
    })
}

fn parse_body(obj: &Map<String, Value>) -> Result<Body, ModelError> {
    let container = obj.get("applicationBody").and_then(Value::as_object);

    let lookup = |key: &str| -> Option<&Value> {
        container
            .and_then(|c| c.get(key))
            .or_else(|| obj.get(key))
            .filter(|v| !v.is_null())
    };

    let (label, field, value) = if let Some(v) = lookup("grounds") {
        (BodyLabel::Grounds, "grounds", v)
    } else if let Some(v) = lookup("facts") {
        (BodyLabel::Facts, "facts", v)
    } else {
        return Ok(Body::default());
    };

    Ok(Body {
        label,
        paragraphs: text_list(field, value)?,
    })
}

fn parse_prayer(value: &Value) -> Result<Option<Prayer>, ModelError> {
    let prayer = match value {
        Value::Null => None,
        Value::String(text) => clean(text).map(|text| Prayer {
            heading: DEFAULT_PRAYER_HEADING.to_string(),
            relief: Relief::Text(text),
        }),
        Value::Array(_) => {
            let items = text_list("prayer", value)?;
            (!items.is_empty()).then(|| Prayer {
                heading: DEFAULT_PRAYER_HEADING.to_string(),
                relief: Relief::Items(items),
            })
        }
        Value::Object(obj) => {
            let heading = first_text(obj, &["heading", "title"])
                .unwrap_or_else(|| DEFAULT_PRAYER_HEADING.to_string());

            let items = match ["items", "reliefs", "points", "clauses"]
                .iter()
                .find_map(|k| obj.get(*k).filter(|v| !v.is_null()).map(|v| (*k, v)))
            {
                Some((key, v)) => text_list(&format!("prayer.{}", key), v)?,
                None => Vec::new(),
            };

            if !items.is_empty() {
                Some(Prayer {
                    heading,
                    relief: Relief::Items(items),
                })
            } else {
                first_text(obj, &["text", "content", "body"]).map(|text| Prayer {
                    heading,
                    relief: Relief::Text(text),
                })
            }
        }
        _ => return Err(ModelError::invalid("prayer", "an object, array or text")),
    };

    Ok(prayer)
}

fn parse_footer(obj: &Map<String, Value>) -> Footer {
    let empty = Map::new();
    let footer = obj
        .get("footer")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    Footer {
        place: first_text(footer, &["place", "city"]),
        date: first_text(footer, &["date", "dated"]),
        advocate_name: first_text(footer, &["advocateName", "advocate", "counsel"]),
        closing_note: first_text(footer, &["closingNote", "note", "closing"]),
        verification: first_text(footer, &["verification", "verificationText"])
            .or_else(|| first_text(obj, &["verification", "verificationText"])),
    }
}

/// Ordered non-blank strings from an array (or a single string)
fn text_list(field: &str, value: &Value) -> Result<Vec<String>, ModelError> {
    match value {
        Value::String(text) => Ok(clean(text).into_iter().collect()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let text = match item {
                    Value::Object(o) => first_text(o, &["text", "content", "paragraph", "ground"]),
                    Value::Null => None,
                    other => scalar_text(other),
                };
                match (text, item) {
                    (Some(t), _) => out.push(t),
                    (None, Value::Object(_) | Value::Null | Value::String(_)) => {}
                    (None, _) => {
                        return Err(ModelError::invalid(format!("{}[{}]", field, i), "text"))
                    }
                }
            }
            Ok(out)
        }
        _ => Err(ModelError::invalid(field, "a list of paragraphs")),
    }
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| obj.get(*k).and_then(scalar_text))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => clean(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn clean(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
