use std::path::PathBuf;

use clap::Parser;
use draft_model::{DocumentKind, FormSchema};
use portal_core::PortalConfig;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

use crate::commands::{format_kinds, parse_kind, render};
use crate::output::{format_fields, parse_assignment, record_from_json};
use crate::{Args, Command, Format};

fn bail_reply() -> serde_json::Value {
    json!({
        "courtDetails": { "courtName": "Sessions Judge", "district": "Pune", "year": 2024 },
        "parties": {
            "applicant": { "name": "Ramesh Kumar", "age": 34 },
            "state": { "name": "State of Maharashtra" }
        },
        "applicationTitle": "APPLICATION FOR REGULAR BAIL",
        "applicationBody": { "grounds": ["First ground", "Second ground"] },
        "prayer": { "items": ["Release the applicant on bail"] },
        "footer": { "place": "Pune", "advocateName": "Adv. Meera Joshi" }
    })
}

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("lexdraft-{}", uuid::Uuid::new_v4()))
}

#[test]
fn test_parse_assignment() {
    assert_eq!(
        parse_assignment("applicantName=Ramesh Kumar"),
        Ok(("applicantName".to_string(), "Ramesh Kumar".to_string()))
    );
    // Only the first '=' separates
    assert_eq!(
        parse_assignment("facts=a=b"),
        Ok(("facts".to_string(), "a=b".to_string()))
    );
    assert!(parse_assignment("novalue").is_err());
    assert!(parse_assignment("=value").is_err());
}

#[test]
fn test_record_from_json() {
    let record = record_from_json(&json!({
        "applicantName": "Ramesh Kumar",
        "applicantAge": 34,
        "firNumber": null
    }))
    .unwrap();

    assert_eq!(record.get("applicantName"), Some("Ramesh Kumar"));
    assert_eq!(record.get("applicantAge"), Some("34"));
    assert_eq!(record.get("firNumber"), Some(""));

    assert!(record_from_json(&json!(["not", "an", "object"])).is_err());
    assert!(record_from_json(&json!({ "nested": { "a": 1 } })).is_err());
}

#[test]
fn test_format_fields_marks_required() {
    let schema = FormSchema::for_kind(DocumentKind::BailApplication);
    let listing = format_fields(&schema);

    for field in &schema.fields {
        let line = listing
            .lines()
            .find(|l| l.split_whitespace().any(|w| w == field.name))
            .unwrap();
        assert_eq!(line.trim_start().starts_with('*'), field.required);
    }
}

#[test]
fn test_parse_kind() {
    assert_eq!(
        parse_kind("bail-application").unwrap(),
        DocumentKind::BailApplication
    );
    let err = parse_kind("divorce").unwrap_err().to_string();
    assert!(err.contains("lexdraft kinds"));
}

#[test]
fn test_kinds_listing_without_base_url() {
    let listing = format_kinds(&PortalConfig::default());
    assert_eq!(listing.lines().count(), DocumentKind::ALL.len());
    assert!(listing.lines().all(|l| l.trim_end().ends_with('-')));
}

#[test]
fn test_kinds_listing_derives_urls() {
    let config = PortalConfig::default()
        .with_overrides(|key| {
            (key == portal_core::config::ENV_WEBHOOK_BASE)
                .then(|| "https://hooks.test/webhook/".to_string())
        })
        .unwrap();
    let listing = format_kinds(&config);
    assert!(listing.contains("https://hooks.test/webhook/bail-application"));
}

#[test]
fn test_args_render_defaults() {
    let args = Args::try_parse_from([
        "lexdraft",
        "render",
        "--kind",
        "bail-application",
        "reply.json",
    ])
    .unwrap();

    assert_eq!(args.store, PathBuf::from(".lexdraft/session.json"));
    match args.command {
        Command::Render {
            kind,
            model,
            out,
            format,
            verify,
        } => {
            assert_eq!(kind, "bail-application");
            assert_eq!(model, PathBuf::from("reply.json"));
            assert_eq!(out, PathBuf::from("."));
            assert_eq!(format, Format::Both);
            assert!(!verify);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_args_submit_repeated_set() {
    let args = Args::try_parse_from([
        "lexdraft",
        "-v",
        "submit",
        "-k",
        "bail-application",
        "--set",
        "applicantName=Ramesh",
        "--set",
        "applicantAge=34",
        "-f",
        "pdf",
    ])
    .unwrap();

    assert!(args.verbose);
    let Command::Submit { set, format, .. } = args.command else {
        panic!("expected submit");
    };
    assert_eq!(
        set,
        vec![
            ("applicantName".to_string(), "Ramesh".to_string()),
            ("applicantAge".to_string(), "34".to_string()),
        ]
    );
    assert!(format.pdf() && !format.docx());
}

#[test]
fn test_args_reject_bad_assignment() {
    let result = Args::try_parse_from(["lexdraft", "submit", "-k", "x", "--set", "oops"]);
    assert!(result.is_err());
}

#[tokio::test]
async fn test_render_writes_both_artifacts() {
    let dir = scratch_dir();
    std::fs::create_dir_all(&dir).unwrap();
    let reply = dir.join("reply.json");
    std::fs::write(&reply, bail_reply().to_string()).unwrap();

    let out = dir.join("out");
    render(
        &PortalConfig::default(),
        "bail-application",
        &reply,
        &out,
        Format::Both,
        true,
    )
    .await
    .unwrap();

    let pdf = out.join("Ramesh_Kumar_Bail_Application.pdf");
    let docx = out.join("Ramesh_Kumar_Bail_Application.docx");
    assert!(std::fs::read(&pdf).unwrap().starts_with(b"%PDF"));
    assert!(std::fs::read(&docx).unwrap().starts_with(b"PK"));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_render_rejects_non_model() {
    let dir = scratch_dir();
    std::fs::create_dir_all(&dir).unwrap();
    let reply = dir.join("reply.json");
    std::fs::write(&reply, "\"just text\"").unwrap();

    let result = render(
        &PortalConfig::default(),
        "bail-application",
        &reply,
        &dir,
        Format::Pdf,
        false,
    )
    .await;
    assert!(result.is_err());

    std::fs::remove_dir_all(&dir).ok();
}

proptest! {
    /// Whatever follows the first '=' is kept verbatim
    #[test]
    fn assignment_keeps_value(name in "[a-zA-Z]{1,16}", value in "[^\n]{0,32}") {
        let (n, v) = parse_assignment(&format!("{}={}", name, value)).unwrap();
        prop_assert_eq!(n, name);
        prop_assert_eq!(v, value);
    }
}
