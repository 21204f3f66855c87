//! Rendered PDFs read back as text

use draft_model::DocumentModel;
use draft_pdf::{render_pdf, render_pdf_with, LayoutOptions, Paper, PdfVerifier};
use serde_json::json;

fn bail_reply() -> serde_json::Value {
    json!([{
        "courtDetails": {
            "courtName": "Sessions Judge",
            "district": "Pune",
            "state": "Maharashtra",
            "year": "2024"
        },
        "parties": {
            "applicant": { "name": "Ramesh Kumar", "fatherName": "Suresh Kumar", "age": 34 },
            "state": { "name": "State of Maharashtra" }
        },
        "applicationTitle": "APPLICATION FOR REGULAR BAIL",
        "applicationBody": { "grounds": ["A", "B", "C"] },
        "prayer": {
            "heading": "PRAYER",
            "items": ["Release the applicant on bail", "Pass any other order"]
        },
        "footer": { "place": "Pune", "date": "2024-03-01", "advocateName": "Adv. Meera Joshi" }
    }])
}

#[test]
fn grounds_render_numbered_in_order() {
    let model = DocumentModel::from_reply(bail_reply()).unwrap();
    let rendered = render_pdf(&model).unwrap();
    let verifier = PdfVerifier::from_pdf(&rendered.bytes).unwrap();

    verifier.check_numbered(&model.body.paragraphs).unwrap();
    assert!(verifier.contains("VERSUS"));
    assert!(verifier.contains("APPLICATION FOR REGULAR BAIL"));
}

#[test]
fn prayer_items_render_lettered() {
    let model = DocumentModel::from_reply(bail_reply()).unwrap();
    let rendered = render_pdf(&model).unwrap();
    let verifier = PdfVerifier::from_pdf(&rendered.bytes).unwrap();

    verifier
        .check_sequence(
            &["(a)".to_string(), "(b)".to_string()],
            &[
                "Release the applicant on bail".to_string(),
                "Pass any other order".to_string(),
            ],
        )
        .unwrap();
}

#[test]
fn missing_prayer_renders() {
    let mut reply = bail_reply();
    reply[0].as_object_mut().unwrap().remove("prayer");
    let model = DocumentModel::from_reply(reply).unwrap();

    let rendered = render_pdf(&model).unwrap();
    let verifier = PdfVerifier::from_pdf(&rendered.bytes).unwrap();
    assert!(!verifier.contains("PRAYER"));
}

#[test]
fn long_documents_paginate() {
    let grounds: Vec<String> = (0..80)
        .map(|i| format!("Ground number {} stated at some length for pagination.", i))
        .collect();
    let mut reply = bail_reply();
    reply[0]["applicationBody"]["grounds"] = json!(grounds);
    let model = DocumentModel::from_reply(reply).unwrap();

    let options = LayoutOptions {
        paper: Paper::Legal,
        ..LayoutOptions::default()
    };
    let rendered = render_pdf_with(&model, &options).unwrap();
    assert!(rendered.page_count > 1);
}

#[cfg(feature = "server")]
#[tokio::test]
async fn async_render_matches_sync() {
    let model = DocumentModel::from_reply(bail_reply()).unwrap();
    let rendered = draft_pdf::render_pdf_with_timeout(&model, &LayoutOptions::default(), 30_000)
        .await
        .unwrap();
    assert_eq!(rendered.page_count, render_pdf(&model).unwrap().page_count);
}
