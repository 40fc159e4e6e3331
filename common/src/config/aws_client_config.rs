use super::ConfigError;
use rusoto_core::region::Region;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Deserialize, Debug, Clone)]
pub struct AwsClientConfig {
    /// Current AWS region.
    aws_region: String,

    /// Only used for development. LocalStack endpoint
    #[serde(default)]
    pub localstack_test_mode_endpoint: Option<String>,
}

impl AwsClientConfig {
    pub fn new(aws_region: String, localstack_test_mode_endpoint: Option<String>) -> Self {
        Self {
            aws_region,
            localstack_test_mode_endpoint,
        }
    }

    /// Region of the account the process runs in.
    pub fn region(&self) -> Result<Region, ConfigError> {
        self.region_named(&self.aws_region)
    }

    /// Resolves any region name, honoring the LocalStack endpoint when one is set.
    pub fn region_named(&self, name: &str) -> Result<Region, ConfigError> {
        if let Some(endpoint) = self.localstack_test_mode_endpoint.clone() {
            Ok(Region::Custom {
                name: name.to_owned(),
                endpoint,
            })
        } else {
            Region::from_str(name).map_err(|e| {
                ConfigError::Invalid(format!(r#"Unable to parse AWS region "{name}": {e}"#))
            })
        }
    }
}
