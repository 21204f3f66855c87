//! Sandboxed file table backing the Typst world
//!
//! Holds the generated entry point and the embedded template library.
//! Nothing here ever touches the real filesystem.

use std::collections::HashMap;

use typst::foundations::Bytes;
use typst::syntax::{FileId, Source, VirtualPath};

use crate::compiler::errors::RenderError;

const MAIN_PATH: &str = "/main.typ";

#[derive(Debug, Default)]
pub struct VirtualFilesystem {
    files: HashMap<FileId, Bytes>,
}

impl VirtualFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount the entry point and return its id
    pub fn mount_main(&mut self, content: &str) -> FileId {
        let id = file_id(MAIN_PATH);
        self.files.insert(id, Bytes::from(content.as_bytes().to_vec()));
        id
    }

    /// Mount a supporting file at a rooted virtual path
    pub fn mount_file(&mut self, path: &str, content: Bytes) -> Result<FileId, RenderError> {
        if path.split('/').any(|segment| segment == "..") {
            return Err(RenderError::Input(format!(
                "Path traversal is not allowed: {}",
                path
            )));
        }

        let id = file_id(&normalize_path(path));
        self.files.insert(id, content);
        Ok(id)
    }

    pub fn source(&self, id: FileId) -> Option<Source> {
        let bytes = self.files.get(&id)?;
        let text = std::str::from_utf8(bytes).ok()?;
        Some(Source::new(id, text.to_string()))
    }

    pub fn file(&self, id: FileId) -> Option<Bytes> {
        self.files.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn file_id(path: &str) -> FileId {
    FileId::new(None, VirtualPath::new(path))
}

fn normalize_path(path: &str) -> String {
    let joined = path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}", joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_main() {
        let mut fs = VirtualFilesystem::new();
        let id = fs.mount_main("Hello");
        assert_eq!(fs.source(id).unwrap().text(), "Hello");
    }

    #[test]
    fn test_paths_normalized() {
        let mut fs = VirtualFilesystem::new();
        let a = fs
            .mount_file("lib//court.typ", Bytes::from_static(b"x"))
            .unwrap();
        let b = fs
            .mount_file("/./lib/court.typ", Bytes::from_static(b"y"))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(fs.len(), 1);
    }

    #[test]
    fn test_path_traversal_blocked() {
        let mut fs = VirtualFilesystem::new();
        let result = fs.mount_file("../../etc/passwd", Bytes::from_static(&[]));
        assert!(matches!(result, Err(RenderError::Input(_))));
    }
}
