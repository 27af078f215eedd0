use thiserror::Error;

/// Errors shared across the cadence workspace.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration file or environment override could not be loaded.
    #[error("Config error: {0}")]
    Config(String),

    /// The report-generation collaborator failed to produce a summary.
    #[error("Report generation failed: {0}")]
    Generation(String),

    /// The dispatch collaborator failed to deliver a summary.
    #[error("Report dispatch failed: {0}")]
    Dispatch(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
