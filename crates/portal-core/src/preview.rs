//! Preview modal and client-side exports
//!
//! Opening renders the PDF once; the inline preview and the PDF download
//! share those bytes. The Word document is built on demand.

use draft_docx::{build_document_with, download_filename, write_docx, DOCX_MIME};
use draft_model::{DocumentKind, DocumentModel};
use draft_pdf::{render_pdf_with, RenderedPdf, PDF_MIME};
use tracing::info;

use crate::config::RenderConfig;
use crate::error::PortalError;

/// A file ready to hand to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum PreviewState {
    Closed,
    Open {
        model: DocumentModel,
        kind: DocumentKind,
        pdf: RenderedPdf,
    },
}

pub struct PreviewModal {
    render: RenderConfig,
    state: PreviewState,
}

impl PreviewModal {
    pub fn new(render: RenderConfig) -> Self {
        Self {
            render,
            state: PreviewState::Closed,
        }
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PreviewState::Open { .. })
    }

    pub fn model(&self) -> Option<&DocumentModel> {
        match &self.state {
            PreviewState::Open { model, .. } => Some(model),
            PreviewState::Closed => None,
        }
    }

    /// Bytes for the inline viewer
    pub fn pdf(&self) -> Option<&RenderedPdf> {
        match &self.state {
            PreviewState::Open { pdf, .. } => Some(pdf),
            PreviewState::Closed => None,
        }
    }

    /// Render and show; a failed render leaves the modal closed
    pub fn open(&mut self, model: DocumentModel, kind: DocumentKind) -> Result<(), PortalError> {
        let pdf = render_pdf_with(&model, &self.render.layout_options(kind))?;
        self.show(model, kind, pdf);
        Ok(())
    }

    /// Like [`PreviewModal::open`], compiling on a blocking thread with a deadline
    #[cfg(feature = "native")]
    pub async fn open_with_timeout(
        &mut self,
        model: DocumentModel,
        kind: DocumentKind,
        timeout_ms: u64,
    ) -> Result<(), PortalError> {
        let options = self.render.layout_options(kind);
        let pdf = draft_pdf::render_pdf_with_timeout(&model, &options, timeout_ms).await?;
        self.show(model, kind, pdf);
        Ok(())
    }

    fn show(&mut self, model: DocumentModel, kind: DocumentKind, pdf: RenderedPdf) {
        info!(kind = kind.slug(), pages = pdf.page_count, "Preview opened");
        self.state = PreviewState::Open { model, kind, pdf };
    }

    pub fn export_pdf(&self) -> Result<Artifact, PortalError> {
        let PreviewState::Open { model, kind, pdf } = &self.state else {
            return Err(PortalError::OutOfStep("export_pdf"));
        };
        Ok(Artifact {
            filename: download_filename(model, kind.file_stem(), "pdf"),
            mime: PDF_MIME,
            bytes: pdf.bytes.clone(),
        })
    }

    pub fn export_docx(&self) -> Result<Artifact, PortalError> {
        let PreviewState::Open { model, kind, .. } = &self.state else {
            return Err(PortalError::OutOfStep("export_docx"));
        };
        let document = build_document_with(model, &self.render.build_options(*kind));
        let bytes = write_docx(&document)?;
        info!(kind = kind.slug(), bytes = bytes.len(), "Word document built");
        Ok(Artifact {
            filename: download_filename(model, kind.file_stem(), "docx"),
            mime: DOCX_MIME,
            bytes,
        })
    }

    /// Discard the model
    pub fn close(&mut self) {
        self.state = PreviewState::Closed;
    }
}
