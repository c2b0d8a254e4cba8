//! hx-input: simulation results document format and validation.

pub mod load;
pub mod record;
pub mod schema;

use std::path::Path;

pub use load::load;
pub use record::*;
pub use schema::RawDocument;

pub type LoadResult<T> = Result<T, LoadError>;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Malformed input at {path}: {reason}")]
    MalformedInput { path: String, reason: String },

    #[error("Unsupported input format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Document encodings accepted by [`load_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => Ok(InputFormat::Json),
            "yaml" | "yml" => Ok(InputFormat::Yaml),
            _ => Err(LoadError::UnsupportedFormat { extension }),
        }
    }
}

pub fn from_json_str(content: &str) -> LoadResult<SimulationDocument> {
    let raw: RawDocument = serde_json::from_str(content)?;
    load(raw)
}

pub fn from_yaml_str(content: &str) -> LoadResult<SimulationDocument> {
    let raw: RawDocument = serde_yaml::from_str(content)?;
    load(raw)
}

pub fn from_str(content: &str, format: InputFormat) -> LoadResult<SimulationDocument> {
    match format {
        InputFormat::Json => from_json_str(content),
        InputFormat::Yaml => from_yaml_str(content),
    }
}

pub fn load_path(path: &Path) -> LoadResult<SimulationDocument> {
    let format = InputFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    from_str(&content, format)
}
