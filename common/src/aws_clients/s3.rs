use crate::config::aws_client_config::AwsClientConfig;
use crate::config::ConfigError;
use rusoto_s3::S3Client;

pub fn get_s3_client(config: &AwsClientConfig) -> Result<S3Client, ConfigError> {
    Ok(S3Client::new(config.region()?))
}
