use crate::config::aws_client_config::AwsClientConfig;
use anyhow::{anyhow, Context};
use rusoto_core::credential::AutoRefreshingProvider;
use rusoto_core::HttpClient;
use rusoto_dynamodb::DynamoDbClient;
use rusoto_sts::{StsAssumeRoleSessionCredentialsProvider, StsClient};

const ASSUMED_ROLE_SESSION_NAME: &str = "ddb-full-load";

/// Builds a DynamoDB client for a table owned by another account.
///
/// Credentials come from assuming `role_arn` through STS in the local region and are
/// refreshed automatically when they expire. Requests go to `table_region`.
pub fn get_cross_account_dynamodb_client(
    config: &AwsClientConfig,
    role_arn: &str,
    table_region: &str,
) -> anyhow::Result<DynamoDbClient> {
    let sts_client = StsClient::new(config.region()?);
    let provider = StsAssumeRoleSessionCredentialsProvider::new(
        sts_client,
        role_arn.to_owned(),
        ASSUMED_ROLE_SESSION_NAME.to_owned(),
        None,
        None,
        None,
        None,
    );
    let credentials = AutoRefreshingProvider::new(provider)
        .map_err(|e| anyhow!(e).context(format!("unable to assume role {role_arn}")))?;
    let dispatcher = HttpClient::new().context("unable to build the http client")?;

    Ok(DynamoDbClient::new_with(
        dispatcher,
        credentials,
        config.region_named(table_region)?,
    ))
}
