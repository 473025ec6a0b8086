use std::path::PathBuf;

use thiserror::Error;

/// failures talking to the LLM oracle. transport and server-side errors are
/// retried by the client; a malformed reply is surfaced as-is
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("oracle returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed oracle response: {0}")]
    Malformed(String),
}

/// a SMILES string from which no stable asset stem can be derived. terminal
/// for that molecule, not for the whole request
#[derive(Debug, Error)]
pub enum StemError {
    #[error("empty SMILES string")]
    Empty,

    #[error("malformed SMILES string: {0:?}")]
    Malformed(String),
}

/// a pre-generated asset file expected on disk is missing. kept distinct from
/// [`StemError`] so operators can tell bad chemistry apart from a missing
/// render
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset file not found at {}", .0.display())]
    NotFound(PathBuf),
}

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("no binding table for {0:?}")]
    Missing(String),

    #[error("failed to read binding table {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse binding table {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// whole-request failures. per-molecule problems are logged and skipped
/// instead of aborting the request
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("molecule extraction failed: {0}")]
    Extraction(#[source] OracleError),

    #[error("SMILES resolution failed for {name:?}: {source}")]
    Resolution {
        name: String,
        #[source]
        source: OracleError,
    },
}
