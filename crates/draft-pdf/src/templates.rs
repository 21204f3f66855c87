//! Embedded Typst sources

/// Court document layout, mounted beside the generated entry point
pub const COURT_DOCUMENT: &str = include_str!("../templates/court_document.typ");

/// Virtual path the entry point imports the layout from
pub const COURT_DOCUMENT_PATH: &str = "/court_document.typ";

/// Family the template sets for body text
pub const BODY_FONT: &str = "Libertinus Serif";

/// Entry point: hand `sys.inputs.layout` to the layout function
pub const ENTRY_POINT: &str = r#"#import "court_document.typ": court-document
#court-document(sys.inputs.at("layout"))
"#;
