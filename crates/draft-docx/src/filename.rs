//! Download filenames

use draft_model::DocumentModel;

const FALLBACK_NAME: &str = "Document";

/// `<First_Party_Name>_<stem>.<ext>`
///
/// Whitespace runs in the name collapse to one underscore; characters that
/// are unsafe in filenames on common platforms are dropped.
pub fn download_filename(model: &DocumentModel, stem: &str, ext: &str) -> String {
    let name = model
        .first_party_name()
        .map(sanitize)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_string());

    format!("{}_{}.{}", name, stem, ext.trim_start_matches('.'))
}

fn sanitize(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
                .filter(|c| !c.is_control())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
