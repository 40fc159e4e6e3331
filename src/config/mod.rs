use serde::{self, Deserialize};
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;

use crate::result::error::PipelineError;

#[derive(Deserialize, Clone, Debug)]
pub struct LoggingConfig {
    /// Minimum level of the emitted logs: off, error, warn, info, debug or trace.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, PipelineError> {
        LevelFilter::from_str(&self.log_level).map_err(|_| {
            PipelineError::Validation(format!(r#"invalid log level "{}""#, self.log_level))
        })
    }
}
