use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("Failed to write package part '{part}': {source}")]
    Zip {
        part: &'static str,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("IO error while packaging: {0}")]
    Io(#[from] std::io::Error),
}
