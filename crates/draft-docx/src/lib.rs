//! Word (.docx) builder for court documents
//!
//! [`build_document`] maps a model onto a small WordprocessingML object
//! graph; [`write_docx`] packages it. Both run entirely in memory, so the
//! same code serves the browser and the command line.

pub mod builder;
pub mod error;
pub mod filename;
pub mod package;
pub mod types;
pub mod xml;

pub use builder::{build_document, build_document_with, BuildOptions};
pub use error::DocxError;
pub use filename::download_filename;
pub use package::{write_docx, DOCX_MIME};
pub use types::{
    Alignment, BodyElement, DocxDocument, NumberFormat, NumberingDefinition, Paragraph, Run,
    Table, TableCell, TableRow,
};
