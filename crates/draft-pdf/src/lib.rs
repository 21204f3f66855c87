//! PDF renderer adapter for court documents
//!
//! A [`DocumentModel`] is first turned into a [`PageLayout`] (pure, easy to
//! test), then compiled by Typst in an in-memory world with embedded fonts.
//!
//! # Feature Flags
//!
//! - `server` (default): enables [`render_pdf_with_timeout`] (requires tokio)
//! - `wasm`: browser builds, synchronous rendering only

pub mod compiler;
pub mod layout;
pub mod templates;
pub mod verifier;
pub mod world;

pub use compiler::{Diagnostic, RenderError, RenderedPdf};
pub use layout::{build_layout, Block, LayoutOptions, PageLayout, Paper, Row};
pub use verifier::{PdfVerifier, VerifyError};

use draft_model::DocumentModel;

pub const PDF_MIME: &str = "application/pdf";

/// Render with default layout options
pub fn render_pdf(model: &DocumentModel) -> Result<RenderedPdf, RenderError> {
    render_pdf_with(model, &LayoutOptions::default())
}

pub fn render_pdf_with(
    model: &DocumentModel,
    options: &LayoutOptions,
) -> Result<RenderedPdf, RenderError> {
    let layout = build_layout(model, options);
    tracing::info!(blocks = layout.blocks.len(), "Rendering PDF");
    compiler::render_layout(&layout)
}

/// Render on a blocking thread with a deadline
#[cfg(feature = "server")]
pub async fn render_pdf_with_timeout(
    model: &DocumentModel,
    options: &LayoutOptions,
    timeout_ms: u64,
) -> Result<RenderedPdf, RenderError> {
    let layout = build_layout(model, options);
    tracing::info!(blocks = layout.blocks.len(), timeout_ms, "Rendering PDF");
    compiler::render_layout_with_timeout(layout, timeout_ms).await
}
