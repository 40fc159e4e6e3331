use std::sync::Arc;

use anyhow::anyhow;
use futures::stream::{self, StreamExt, TryStreamExt};
use model::change_event::{flatten_image, Image};
use model::worker::SplitHint;
use repositories::data_lake::DataLakeRepository;
use repositories::table_snapshot::TableSnapshotRepository;
use uuid::Uuid;

use super::parameters::ExportJobParameters;
use super::parquet::{encode_parquet, snapshot_schema, Row};
use crate::result::error::PipelineError;

/// Share of the table read capacity the export is allowed to consume.
pub const THROUGHPUT_READ_PERCENT: f64 = 1.2;

/// Marker object written once every part file is in place.
pub const SUCCESS_MARKER: &str = "_SUCCESS";

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub rows: usize,
    pub files: usize,
    pub split_hint: SplitHint,
    pub output_path: String,
}

pub struct FullLoadJob {
    parameters: ExportJobParameters,
    table: Arc<dyn TableSnapshotRepository>,
    data_lake: Arc<dyn DataLakeRepository>,
    run_id: String,
}

impl FullLoadJob {
    pub fn new(
        parameters: ExportJobParameters,
        table: Arc<dyn TableSnapshotRepository>,
        data_lake: Arc<dyn DataLakeRepository>,
    ) -> Self {
        Self {
            parameters,
            table,
            data_lake,
            run_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    pub fn part_key(&self, index: usize) -> String {
        format!(
            "{}/part-{index:05}-{}.snappy.parquet",
            self.parameters.output_prefix(),
            self.run_id
        )
    }

    pub async fn run(&self) -> Result<ExportSummary, PipelineError> {
        let parameters = &self.parameters;

        if parameters.worker_type.dedicated_ratio().is_none() {
            tracing::warn!(
                worker_type = %parameters.worker_type,
                "No dedicated split ratio for worker type, using the default one"
            );
        }
        let split_hint = parameters.split_hint;

        let capacity = self
            .table
            .read_capacity()
            .await
            .map_err(|e| anyhow!(e).context("unable to read table capacity"))?;
        let segments = split_hint.scan_segments();
        let concurrency = parameters
            .max_concurrent_segments
            .min(segments as usize)
            .max(1);
        let read_units_per_segment = capacity * THROUGHPUT_READ_PERCENT / concurrency as f64;

        tracing::info!(
            table = parameters.table_name,
            %split_hint,
            segments,
            concurrency,
            capacity,
            "Starting table scan"
        );

        let images = self
            .read_table(segments, concurrency, read_units_per_segment)
            .await?;
        let rows: Vec<Row> = images.into_iter().map(flatten_image).collect();
        let total_rows = rows.len();

        let output_prefix = parameters.output_prefix();
        let purged = self
            .data_lake
            .purge_prefix(&format!("{output_prefix}/"))
            .await
            .map_err(|e| anyhow!(e).context("unable to purge output path"))?;
        tracing::info!(purged, output_prefix, "Purged previous export");

        let schema = snapshot_schema(&rows);
        let mut files = 0;
        for (index, partition) in repartition(rows, parameters.output_partitions)
            .into_iter()
            .enumerate()
            .filter(|(_, partition)| !partition.is_empty())
        {
            let body = encode_parquet(&partition, schema.clone())
                .map_err(|e| e.context(format!("unable to encode partition {index}")))?;
            let key = self.part_key(index);
            self.data_lake
                .put_object(&key, body)
                .await
                .map_err(|e| anyhow!(e).context(format!("unable to write {key}")))?;

            tracing::debug!(key, rows = partition.len(), "Wrote part file");
            files += 1;
        }

        self.data_lake
            .put_object(&format!("{output_prefix}/{SUCCESS_MARKER}"), Vec::new())
            .await
            .map_err(|e| anyhow!(e).context("unable to commit export"))?;

        let summary = ExportSummary {
            rows: total_rows,
            files,
            split_hint,
            output_path: parameters.output_path(),
        };
        tracing::info!(
            rows = summary.rows,
            files = summary.files,
            output_path = summary.output_path,
            "Full load finished"
        );

        Ok(summary)
    }

    async fn read_table(
        &self,
        segments: i64,
        concurrency: usize,
        read_units_per_segment: f64,
    ) -> Result<Vec<Image>, PipelineError> {
        let pages: Vec<Vec<Image>> = stream::iter(0..segments)
            .map(|segment| async move {
                self.table
                    .scan_segment(segment, segments, read_units_per_segment)
                    .await
                    .map_err(|e| anyhow!(e).context(format!("unable to scan segment {segment}")))
            })
            .buffered(concurrency)
            .try_collect()
            .await?;

        Ok(pages.into_iter().flatten().collect())
    }
}

/// Round-robin distribution of `rows` over `partitions` buckets.
pub fn repartition<T>(rows: Vec<T>, partitions: usize) -> Vec<Vec<T>> {
    let partitions = partitions.max(1);
    let mut buckets: Vec<Vec<T>> = (0..partitions).map(|_| Vec::new()).collect();
    for (index, row) in rows.into_iter().enumerate() {
        buckets[index % partitions].push(row);
    }
    buckets
}
