//! Typst compilation of page layouts

pub mod errors;
pub mod render;

pub use errors::{Diagnostic, DiagnosticSeverity, RenderError};
#[cfg(feature = "server")]
pub use render::render_layout_with_timeout;
pub use render::{render_layout, RenderedPdf};
