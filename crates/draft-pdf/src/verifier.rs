//! Read rendered PDFs back as text
//!
//! Used by tests and by `draft-cli render --verify` to confirm that a
//! rendered document actually contains its numbered paragraphs, in order.

use lazy_static::lazy_static;
use pdf_extract::extract_text_from_mem;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerifyError {
    #[error("PDF text extraction failed: {0}")]
    Extraction(String),

    #[error("'{marker} {text}' not found after position {after}")]
    Missing {
        marker: String,
        text: String,
        after: usize,
    },
}

/// Text pulled out of a PDF, whitespace collapsed to single spaces
#[derive(Debug, Clone)]
pub struct PdfVerifier {
    text: String,
}

impl PdfVerifier {
    pub fn from_pdf(bytes: &[u8]) -> Result<Self, VerifyError> {
        let raw = extract_text_from_mem(bytes).map_err(|e| VerifyError::Extraction(e.to_string()))?;
        Ok(Self::from_text(&raw))
    }

    pub fn from_text(raw: &str) -> Self {
        Self {
            text: WHITESPACE.replace_all(raw.trim(), " ").into_owned(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(&WHITESPACE.replace_all(needle.trim(), " ").into_owned())
    }

    /// Check `"1. first"`, `"2. second"`, ... appear in this order
    pub fn check_numbered(&self, paragraphs: &[String]) -> Result<(), VerifyError> {
        let markers: Vec<String> = (1..=paragraphs.len()).map(|n| format!("{}.", n)).collect();
        self.check_sequence(&markers, paragraphs)
    }

    /// Check each `marker text` pair appears after the previous one
    pub fn check_sequence(&self, markers: &[String], texts: &[String]) -> Result<(), VerifyError> {
        let mut cursor = 0;

        for (marker, text) in markers.iter().zip(texts) {
            let needle = format!(
                "{} {}",
                marker,
                WHITESPACE.replace_all(text.trim(), " ")
            );
            match self.text[cursor..].find(&needle) {
                Some(offset) => cursor += offset + needle.len(),
                None => {
                    return Err(VerifyError::Missing {
                        marker: marker.clone(),
                        text: text.clone(),
                        after: cursor,
                    })
                }
            }
        }

        Ok(())
    }
}
