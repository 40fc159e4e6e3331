use std::num::NonZeroUsize;

use model::worker::{SplitHint, WorkerType};
use serde::Deserialize;

use crate::result::error::PipelineError;

const DEFAULT_MAX_CONCURRENT_SEGMENTS: usize = 16;
const FULL_LOAD_SUFFIX: &str = "full_load";

/// Invocation parameters of the full load job, read from the environment.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct FullLoadConfig {
    /// Name of the table to export.
    pub producer_dynamodb_name: String,

    /// Account owning the table.
    pub producer_account_id: String,

    /// Role of the producer account allowed to read the table.
    pub producer_dynamodb_read_role_name: String,

    /// Region of the table.
    pub producer_region: String,

    /// Data lake bucket.
    pub s3_bucket_name: String,

    /// Prefix of the export inside the bucket, the files land under `{prefix}/full_load`.
    pub s3_prefix: String,

    /// Compute tier of the job workers, drives the scan parallelism.
    pub worker_type: String,

    /// Number of workers of the job, as an integer string.
    pub num_workers: String,

    /// Number of Parquet files to write. Defaults to the available CPU parallelism.
    #[serde(default)]
    pub output_partitions: Option<usize>,

    /// Maximum number of scan segments read at the same time.
    #[serde(default)]
    pub max_concurrent_segments: Option<usize>,
}

/// Validated parameters of one export run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJobParameters {
    pub table_name: String,
    pub table_region: String,
    pub role_arn: String,
    pub bucket_name: String,
    pub prefix: String,
    pub worker_type: WorkerType,
    pub workers: i64,
    pub split_hint: SplitHint,
    pub output_partitions: usize,
    pub max_concurrent_segments: usize,
}

pub fn role_arn(account_id: &str, role_name: &str) -> String {
    format!("arn:aws:iam::{account_id}:role/{role_name}")
}

fn required(name: &str, value: String) -> Result<String, PipelineError> {
    if value.trim().is_empty() {
        return Err(PipelineError::Validation(format!("{name} must not be empty")));
    }
    Ok(value)
}

fn positive(name: &str, value: Option<usize>, default: usize) -> Result<usize, PipelineError> {
    match value {
        Some(0) => Err(PipelineError::Validation(format!(
            "{name} must be greater than zero"
        ))),
        Some(value) => Ok(value),
        None => Ok(default),
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

impl TryFrom<FullLoadConfig> for ExportJobParameters {
    type Error = PipelineError;

    fn try_from(config: FullLoadConfig) -> Result<Self, Self::Error> {
        let account_id = required("PRODUCER_ACCOUNT_ID", config.producer_account_id)?;
        let role_name = required(
            "PRODUCER_DYNAMODB_READ_ROLE_NAME",
            config.producer_dynamodb_read_role_name,
        )?;
        let num_workers = required("NUM_WORKERS", config.num_workers)?;
        let workers = num_workers.trim().parse::<i64>().map_err(|_| {
            PipelineError::Validation(format!(
                r#"NUM_WORKERS must be an integer, got "{num_workers}""#
            ))
        })?;
        let worker_type = WorkerType::parse(&required("WORKER_TYPE", config.worker_type)?);
        let split_hint = worker_type.split_hint(workers).ok_or_else(|| {
            PipelineError::Validation(format!(
                "NUM_WORKERS {workers} is out of range for worker type {worker_type}"
            ))
        })?;

        Ok(Self {
            table_name: required("PRODUCER_DYNAMODB_NAME", config.producer_dynamodb_name)?,
            table_region: required("PRODUCER_REGION", config.producer_region)?,
            role_arn: role_arn(&account_id, &role_name),
            bucket_name: required("S3_BUCKET_NAME", config.s3_bucket_name)?,
            prefix: config.s3_prefix.trim_matches('/').to_owned(),
            worker_type,
            workers,
            split_hint,
            output_partitions: positive(
                "OUTPUT_PARTITIONS",
                config.output_partitions,
                available_parallelism(),
            )?,
            max_concurrent_segments: positive(
                "MAX_CONCURRENT_SEGMENTS",
                config.max_concurrent_segments,
                DEFAULT_MAX_CONCURRENT_SEGMENTS,
            )?,
        })
    }
}

impl ExportJobParameters {
    /// Key prefix of the export inside the bucket, without trailing slash.
    pub fn output_prefix(&self) -> String {
        if self.prefix.is_empty() {
            FULL_LOAD_SUFFIX.to_owned()
        } else {
            format!("{}/{FULL_LOAD_SUFFIX}", self.prefix)
        }
    }

    pub fn output_path(&self) -> String {
        format!("s3://{}/{}", self.bucket_name, self.output_prefix())
    }
}
