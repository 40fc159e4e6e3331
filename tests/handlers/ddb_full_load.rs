use std::sync::Arc;

use arrow::array::{Array, StringArray};
use ddb_streaming_datalake::export::{ExportJobParameters, FullLoadConfig, FullLoadJob};
use model::worker::SplitHint;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rstest::{fixture, rstest};

use crate::fixtures::repositories::{recording_data_lake, table};

#[fixture]
fn config() -> FullLoadConfig {
    FullLoadConfig {
        producer_dynamodb_name: "orders".to_owned(),
        producer_account_id: "123456789012".to_owned(),
        producer_dynamodb_read_role_name: "ddb-read-role".to_owned(),
        producer_region: "ap-northeast-1".to_owned(),
        s3_bucket_name: "datalake".to_owned(),
        s3_prefix: "dynamodb/aws21/".to_owned(),
        worker_type: "G.2X".to_owned(),
        num_workers: "2".to_owned(),
        output_partitions: Some(4),
        max_concurrent_segments: Some(8),
    }
}

fn read_ids(body: &[u8]) -> Vec<String> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes::Bytes::from(body.to_vec()))
        .unwrap()
        .build()
        .unwrap();

    reader
        .flat_map(|batch| {
            let batch = batch.unwrap();
            let ids = batch
                .column_by_name("id")
                .unwrap()
                .as_any()
                .downcast_ref::<StringArray>()
                .unwrap()
                .clone();
            (0..ids.len())
                .map(|i| ids.value(i).to_owned())
                .collect::<Vec<_>>()
        })
        .collect()
}

#[rstest]
#[tokio::test]
async fn full_load_exports_every_item(config: FullLoadConfig) {
    let parameters = ExportJobParameters::try_from(config).unwrap();
    let (data_lake, written) = recording_data_lake();

    // G.2X with 2 workers: 16 segments of 3 items.
    let summary = FullLoadJob::new(parameters, Arc::new(table(500.0, 3)), Arc::new(data_lake))
        .with_run_id("0f0b1c")
        .run()
        .await
        .unwrap();

    assert_eq!(SplitHint(16), summary.split_hint);
    assert_eq!(48, summary.rows);
    assert_eq!(4, summary.files);
    assert_eq!("s3://datalake/dynamodb/aws21/full_load", summary.output_path);

    let written = written.lock().unwrap();
    let keys: Vec<&str> = written.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(
        vec![
            "purge:dynamodb/aws21/full_load/",
            "dynamodb/aws21/full_load/part-00000-0f0b1c.snappy.parquet",
            "dynamodb/aws21/full_load/part-00001-0f0b1c.snappy.parquet",
            "dynamodb/aws21/full_load/part-00002-0f0b1c.snappy.parquet",
            "dynamodb/aws21/full_load/part-00003-0f0b1c.snappy.parquet",
            "dynamodb/aws21/full_load/_SUCCESS",
        ],
        keys
    );

    let mut ids: Vec<String> = written[1..5]
        .iter()
        .flat_map(|(_, body)| read_ids(body))
        .collect();
    ids.sort();
    let mut expected: Vec<String> = (0..48).map(|id| format!("item-{id}")).collect();
    expected.sort();
    assert_eq!(expected, ids);
}

#[rstest]
#[tokio::test]
async fn every_part_shares_the_snapshot_schema(mut config: FullLoadConfig) {
    config.output_partitions = Some(2);
    let parameters = ExportJobParameters::try_from(config).unwrap();
    let (data_lake, written) = recording_data_lake();

    FullLoadJob::new(parameters, Arc::new(table(500.0, 1)), Arc::new(data_lake))
        .run()
        .await
        .unwrap();

    let written = written.lock().unwrap();
    for (key, body) in written.iter().filter(|(key, _)| key.ends_with(".parquet")) {
        let builder =
            ParquetRecordBatchReaderBuilder::try_new(bytes::Bytes::from(body.clone())).unwrap();
        let columns: Vec<&str> = builder
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().as_str())
            .collect();
        assert_eq!(vec!["even", "id", "quantity"], columns, "{key}");
    }
}

#[rstest]
#[tokio::test]
async fn single_default_worker_still_scans_the_table(mut config: FullLoadConfig) {
    config.worker_type = "Standard".to_owned();
    config.num_workers = "1".to_owned();
    let parameters = ExportJobParameters::try_from(config).unwrap();
    let (data_lake, _) = recording_data_lake();

    let summary = FullLoadJob::new(parameters, Arc::new(table(500.0, 5)), Arc::new(data_lake))
        .run()
        .await
        .unwrap();

    assert_eq!(SplitHint(-4), summary.split_hint);
    assert_eq!(5, summary.rows);
}
