//! Reshapes DynamoDB change records flowing through the delivery stream into flat JSON
//! lines for the data lake.
//!
//! Every record is handled on its own: a record that cannot be decoded or does not
//! describe a supported change is returned as `ProcessingFailed` with its original data,
//! the rest of the batch is still transformed.

use aws_lambda_events::encodings::Base64Data;
use aws_lambda_events::event::firehose::{
    KinesisFirehoseEvent, KinesisFirehoseResponse, KinesisFirehoseResponseRecord,
    KinesisFirehoseResponseRecordMetadata,
};
use chrono::{DateTime, Utc};
use model::change_event::{ChangeEvent, ChangeEventError, FlattenedRecord};

/// Format of the injected `ingestion_timestamp` column, e.g. `2024-03-01 12:00:00.123456`.
pub const INGESTION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Result values accepted by the delivery stream.
pub const RESULT_OK: &str = "Ok";
pub const RESULT_PROCESSING_FAILED: &str = "ProcessingFailed";

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("payload is not a change event: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    ChangeEvent(#[from] ChangeEventError),
}

/// Encoded JSON line, or the reason the record could not be transformed.
pub type RecordOutcome = Result<Vec<u8>, RecordError>;

pub fn format_ingestion_timestamp(ingested_at: DateTime<Utc>) -> String {
    ingested_at.format(INGESTION_TIMESTAMP_FORMAT).to_string()
}

pub fn decode_change_event(data: &[u8]) -> Result<ChangeEvent, RecordError> {
    let payload = std::str::from_utf8(data)?;
    tracing::debug!(payload, "Decoded record payload");

    Ok(serde_json::from_str(payload)?)
}

/// JSON line, newline terminated.
pub fn encode_record(record: &FlattenedRecord) -> Result<Vec<u8>, RecordError> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');

    Ok(line)
}

pub fn transform_record(data: &[u8], ingested_at: DateTime<Utc>) -> RecordOutcome {
    let record = decode_change_event(data)?.flatten(&format_ingestion_timestamp(ingested_at))?;
    encode_record(&record)
}

fn response_record(
    record_id: Option<String>,
    result: &str,
    data: Base64Data,
) -> KinesisFirehoseResponseRecord {
    KinesisFirehoseResponseRecord {
        record_id,
        result: Some(result.to_owned()),
        data,
        metadata: KinesisFirehoseResponseRecordMetadata {
            partition_keys: std::collections::HashMap::new(),
        },
    }
}

/// Transforms a whole batch. `clock` is read once per record.
pub fn transform_batch<C>(event: KinesisFirehoseEvent, clock: C) -> KinesisFirehoseResponse
where
    C: Fn() -> DateTime<Utc>,
{
    let total = event.records.len();
    let mut failed = 0;

    let records = event
        .records
        .into_iter()
        .map(|record| match transform_record(&record.data.0, clock()) {
            Ok(line) => response_record(record.record_id, RESULT_OK, Base64Data(line)),
            Err(e) => {
                failed += 1;
                tracing::warn!(
                    record_id = ?record.record_id,
                    error = %e,
                    "Unable to transform record: {e}"
                );
                response_record(record.record_id, RESULT_PROCESSING_FAILED, record.data)
            }
        })
        .collect();

    tracing::info!(
        total,
        failed,
        "Successfully processed {} of {total} records.",
        total - failed
    );

    KinesisFirehoseResponse { records }
}
