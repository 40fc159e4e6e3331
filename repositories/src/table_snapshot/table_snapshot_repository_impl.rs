use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use async_trait::async_trait;
use model::change_event::Image;
use rusoto_core::RusotoError;
use rusoto_dynamodb::{AttributeValue, DescribeTableError, DescribeTableInput, DynamoDb, ScanInput};

use super::{TableSnapshotRepository, TableSnapshotRepositoryError, ON_DEMAND_READ_CAPACITY};

const RETURN_CONSUMED_CAPACITY_TOTAL: &str = "TOTAL";

pub struct TableSnapshotRepositoryImpl<T: DynamoDb + Sync + Send> {
    table_name: String,
    dynamodb_client: T,
}

impl<T: DynamoDb + Sync + Send> TableSnapshotRepositoryImpl<T> {
    pub fn new(table_name: String, dynamodb_client: T) -> Self {
        Self {
            table_name,
            dynamodb_client,
        }
    }

    fn build_scan_input(
        &self,
        segment: i64,
        total_segments: i64,
        exclusive_start_key: Option<HashMap<String, AttributeValue>>,
    ) -> ScanInput {
        build_scan_input(
            &self.table_name,
            segment,
            total_segments,
            exclusive_start_key,
        )
    }
}

fn build_scan_input(
    table_name: &str,
    segment: i64,
    total_segments: i64,
    exclusive_start_key: Option<HashMap<String, AttributeValue>>,
) -> ScanInput {
    ScanInput {
        table_name: table_name.to_owned(),
        segment: Some(segment),
        total_segments: Some(total_segments),
        exclusive_start_key,
        return_consumed_capacity: Some(RETURN_CONSUMED_CAPACITY_TOTAL.to_owned()),
        ..ScanInput::default()
    }
}

fn image_from_item(item: HashMap<String, AttributeValue>) -> Image {
    item.into_iter()
        .map(|(column, value)| (column, serde_dynamo::AttributeValue::from(value)))
        .collect()
}

/// Time left to wait after a page so that `consumed` units over the elapsed time
/// stay within `read_units_per_second`.
pub fn throttle_delay(consumed: f64, read_units_per_second: f64, elapsed: Duration) -> Duration {
    if consumed <= 0.0 || read_units_per_second <= 0.0 {
        return Duration::ZERO;
    }

    Duration::from_secs_f64(consumed / read_units_per_second).saturating_sub(elapsed)
}

#[async_trait]
impl<T: DynamoDb + Sync + Send> TableSnapshotRepository for TableSnapshotRepositoryImpl<T> {
    async fn read_capacity(&self) -> Result<f64, TableSnapshotRepositoryError> {
        let output = self
            .dynamodb_client
            .describe_table(DescribeTableInput {
                table_name: self.table_name.clone(),
            })
            .await
            .map_err(|e| match e {
                RusotoError::Service(DescribeTableError::ResourceNotFound(message)) => {
                    TableSnapshotRepositoryError::TableNotFound(format!(
                        "table {} not found: {message}",
                        self.table_name
                    ))
                }
                e => TableSnapshotRepositoryError::Unknown(
                    anyhow!(e).context(format!("Error describing table {}", self.table_name)),
                ),
            })?;

        let provisioned = output
            .table
            .and_then(|table| table.provisioned_throughput)
            .and_then(|throughput| throughput.read_capacity_units)
            .filter(|units| *units > 0);

        Ok(provisioned
            .map(|units| units as f64)
            .unwrap_or(ON_DEMAND_READ_CAPACITY))
    }

    async fn scan_segment(
        &self,
        segment: i64,
        total_segments: i64,
        read_units_per_second: f64,
    ) -> Result<Vec<Image>, TableSnapshotRepositoryError> {
        let mut images = Vec::new();
        let mut exclusive_start_key = None;
        let mut pages = 0;

        loop {
            let started = Instant::now();
            let output = self
                .dynamodb_client
                .scan(self.build_scan_input(segment, total_segments, exclusive_start_key.take()))
                .await
                .map_err(|e| {
                    TableSnapshotRepositoryError::Unknown(anyhow!(e).context(format!(
                        "Error scanning segment {segment}/{total_segments} of table {}",
                        self.table_name
                    )))
                })?;
            pages += 1;

            images.extend(output.items.unwrap_or_default().into_iter().map(image_from_item));

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }

            let consumed = output
                .consumed_capacity
                .and_then(|capacity| capacity.capacity_units)
                .unwrap_or_default();
            let delay = throttle_delay(consumed, read_units_per_second, started.elapsed());
            if !delay.is_zero() {
                tracing::debug!(
                    segment,
                    consumed,
                    delay_ms = delay.as_millis() as u64,
                    "Pacing scan"
                );
                tokio::time::sleep(delay).await;
            }
        }

        tracing::info!(
            segment,
            total_segments,
            pages,
            items = images.len(),
            "Scanned segment {segment} of table {}",
            self.table_name
        );

        Ok(images)
    }
}
