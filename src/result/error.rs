//! PipelineError is the error both the transformation function and the full load job fail with.
//! Repository, configuration and encoding errors are mapped to it, usually with some context.

use common::config::ConfigError;
use lambda_runtime::Error as LambdaRuntimeError;

pub type Result<T> = std::result::Result<T, PipelineError>;
pub type LambdaRuntimeResult = std::result::Result<(), LambdaRuntimeError>;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),
    #[error("{0:#}")]
    Unknown(anyhow::Error),
}

impl From<anyhow::Error> for PipelineError {
    fn from(e: anyhow::Error) -> Self {
        Self::Unknown(e)
    }
}

impl From<ConfigError> for PipelineError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Invalid(message) => Self::Validation(message),
            e => Self::Unknown(anyhow::anyhow!(e)),
        }
    }
}
