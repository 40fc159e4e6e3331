use std::sync::Arc;

use common::aws_clients::dynamodb::get_cross_account_dynamodb_client;
use common::aws_clients::s3::get_s3_client;
use common::config::aws_client_config::AwsClientConfig;
use common::config::ConfigLoader;
use ddb_streaming_datalake::config::LoggingConfig;
use ddb_streaming_datalake::export::{ExportJobParameters, FullLoadConfig, FullLoadJob};
use ddb_streaming_datalake::logging::init_tracing;
use repositories::data_lake::data_lake_repository_impl::DataLakeRepositoryImpl;
use repositories::table_snapshot::table_snapshot_repository_impl::TableSnapshotRepositoryImpl;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logging_config = ConfigLoader::load_default::<LoggingConfig>()?;
    let _guard = init_tracing(logging_config.level_filter()?).map_err(|e| anyhow::anyhow!(e))?;

    let full_load_config = ConfigLoader::load_default::<FullLoadConfig>()?;
    let parameters = ExportJobParameters::try_from(full_load_config)?;
    let aws_client_config = ConfigLoader::load_default::<AwsClientConfig>()?;

    tracing::info!(
        table = parameters.table_name,
        role_arn = parameters.role_arn,
        worker_type = %parameters.worker_type,
        workers = parameters.workers,
        output_path = parameters.output_path(),
        "Full load started"
    );

    let dynamodb_client = get_cross_account_dynamodb_client(
        &aws_client_config,
        &parameters.role_arn,
        &parameters.table_region,
    )?;
    let s3_client = get_s3_client(&aws_client_config)?;

    let table = TableSnapshotRepositoryImpl::new(parameters.table_name.clone(), dynamodb_client);
    let data_lake = DataLakeRepositoryImpl::new(parameters.bucket_name.clone(), s3_client);

    let summary = FullLoadJob::new(parameters, Arc::new(table), Arc::new(data_lake))
        .run()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Full load failed: {e}");
            e
        })?;

    tracing::info!(
        rows = summary.rows,
        files = summary.files,
        split_hint = %summary.split_hint,
        "Exported table to {}",
        summary.output_path
    );

    Ok(())
}
