use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Custom error types for the roundtrip harness
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid run parameters: {0}")]
    InvalidParameters(String),

    #[error("Failed to read template '{path}': {source}")]
    TemplateRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed template '{path}': {detail}")]
    TemplateSyntax { path: PathBuf, detail: String },

    #[error("Unresolved placeholder '{name}' in template '{path}'")]
    UnresolvedPlaceholder { name: String, path: PathBuf },

    #[error("Failed to write rendered configuration '{path}': {source}")]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Pipeline stage '{stage}' unavailable: {reason}")]
    PipelineBuild { stage: String, reason: String },

    #[error("Pipeline error: {0}")]
    PipelineRuntime(String),

    #[error("Failed to start '{tool}': {source}")]
    CommandStart {
        tool: String,
        source: std::io::Error,
    },

    #[error("External tool '{tool}' failed with {status}")]
    ExternalTool { tool: String, status: ExitStatus },
}

/// Result type for roundtrip operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;
