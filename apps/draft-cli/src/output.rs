//! Reading inputs and writing artifacts

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use draft_model::{FormRecord, FormSchema, FormSection};
use portal_core::Artifact;
use serde_json::Value;

/// `name=value`, for `--set`
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got '{}'", raw)),
    }
}

/// A flat JSON object of field values; numbers and booleans are stringified
pub fn record_from_json(value: &Value) -> anyhow::Result<FormRecord> {
    let Some(obj) = value.as_object() else {
        bail!("Field values must be a JSON object");
    };

    let mut record = FormRecord::default();
    for (name, value) in obj {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            Value::Array(_) | Value::Object(_) => {
                bail!("Field '{}' must be a plain value", name)
            }
        };
        record.set(name.clone(), text);
    }
    Ok(record)
}

pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

pub fn write_artifact(dir: &Path, artifact: &Artifact) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(&artifact.filename);
    fs::write(&path, &artifact.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Field list grouped by section, required fields starred
pub fn format_fields(schema: &FormSchema) -> String {
    let mut out = String::new();
    let mut current: Option<FormSection> = None;

    for field in &schema.fields {
        if current != Some(field.section) {
            if current.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "{}", field.section.heading(schema.kind));
            current = Some(field.section);
        }
        let marker = if field.required { "*" } else { " " };
        let _ = writeln!(out, "  {} {:<24} {}", marker, field.name, field.label);
    }
    out
}
