//! Core rendering: layout in, PDF bytes out

use typst::diag::{Severity, SourceDiagnostic};

use super::errors::{Diagnostic, RenderError};
use crate::layout::PageLayout;
use crate::templates;
use crate::world::VirtualWorld;

/// A compiled document
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub warnings: Vec<Diagnostic>,
}

/// Compile a layout on the current thread
pub fn render_layout(layout: &PageLayout) -> Result<RenderedPdf, RenderError> {
    let world = build_world(layout)?;
    let warned = typst::compile(&world);
    let warnings = to_diagnostics(&warned.warnings);

    let document = match warned.output {
        Ok(document) => document,
        Err(errors) => {
            let diagnostics = to_diagnostics(&errors);
            tracing::warn!(errors = diagnostics.len(), "Court document failed to compile");
            return Err(RenderError::Compile(diagnostics));
        }
    };

    let bytes = typst_pdf::pdf(&document, &typst_pdf::PdfOptions::default())
        .map_err(|errors| RenderError::Export(join_messages(&errors)))?;

    // Bound typst's memoization cache between renders
    comemo::evict(10);

    tracing::debug!(
        pages = document.pages.len(),
        bytes = bytes.len(),
        warnings = warnings.len(),
        "Rendered court document"
    );

    Ok(RenderedPdf {
        bytes,
        page_count: document.pages.len(),
        warnings,
    })
}

/// Compile on a blocking thread, giving up after `timeout_ms`
#[cfg(feature = "server")]
pub async fn render_layout_with_timeout(
    layout: PageLayout,
    timeout_ms: u64,
) -> Result<RenderedPdf, RenderError> {
    let result = tokio::time::timeout(
        std::time::Duration::from_millis(timeout_ms),
        tokio::task::spawn_blocking(move || render_layout(&layout)),
    )
    .await;

    match result {
        Ok(Ok(rendered)) => rendered,
        Ok(Err(join_error)) => Err(RenderError::Task(join_error.to_string())),
        Err(_elapsed) => Err(RenderError::Timeout(timeout_ms)),
    }
}

fn build_world(layout: &PageLayout) -> Result<VirtualWorld, RenderError> {
    let mut inputs = serde_json::Map::new();
    inputs.insert("layout".to_string(), layout.to_input());

    VirtualWorld::new(
        templates::ENTRY_POINT,
        &[(templates::COURT_DOCUMENT_PATH, templates::COURT_DOCUMENT)],
        &inputs,
    )
}

fn to_diagnostics(diagnostics: &[SourceDiagnostic]) -> Vec<Diagnostic> {
    diagnostics
        .iter()
        .map(|diag| {
            let mut diagnostic = Diagnostic::error(diag.message.to_string());
            if !diag.hints.is_empty() {
                let hint = diag
                    .hints
                    .iter()
                    .map(|h| h.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                diagnostic = diagnostic.with_hint(hint);
            }
            match diag.severity {
                Severity::Error => diagnostic,
                Severity::Warning => diagnostic.as_warning(),
            }
        })
        .collect()
}

fn join_messages(diagnostics: &[SourceDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.message.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Block, Paper};

    fn layout(blocks: Vec<Block>) -> PageLayout {
        PageLayout {
            paper: Paper::A4,
            font_size: 12.0,
            blocks,
        }
    }

    #[test]
    fn test_render_minimal_layout() {
        let rendered = render_layout(&layout(vec![Block::Paragraph {
            text: "Hello".to_string(),
        }]))
        .unwrap();

        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(rendered.page_count, 1);
    }

    #[test]
    fn test_markup_characters_are_literal() {
        let rendered = render_layout(&layout(vec![Block::Paragraph {
            text: "Section 420 #IPC *not bold* [x] $5 @ref".to_string(),
        }]));
        assert!(rendered.is_ok());
    }

    #[test]
    fn test_empty_layout_renders_blank_page() {
        let rendered = render_layout(&layout(vec![])).unwrap();
        assert_eq!(rendered.page_count, 1);
    }

    #[cfg(feature = "server")]
    #[tokio::test]
    async fn test_render_with_timeout() {
        let rendered = render_layout_with_timeout(
            layout(vec![Block::Heading {
                text: "IN THE COURT OF THE DISTRICT JUDGE".to_string(),
                level: 1,
            }]),
            30_000,
        )
        .await
        .unwrap();
        assert!(rendered.page_count >= 1);
    }
}
