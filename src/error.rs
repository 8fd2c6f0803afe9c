use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum LinkError {
    #[error("invalid UniProt accession: {0}")]
    InvalidAccession(String),

    #[error("chunk size must be between 1 and {max}, got {got}")]
    InvalidChunkSize { got: usize, max: usize },

    #[error("required column '{column}' missing from {path}")]
    MissingColumn { column: String, path: Utf8PathBuf },

    #[error("failed to read table {path}: {message}")]
    TableRead { path: Utf8PathBuf, message: String },

    #[error("failed to write table {path}: {message}")]
    TableWrite { path: Utf8PathBuf, message: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("uniprot request failed: {0}")]
    UniprotHttp(String),

    #[error("uniprot returned status {status}: {message}")]
    UniprotStatus { status: u16, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
