use aws_lambda_events::encodings::Base64Data;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ddb_streaming_datalake::transformation::{
    transform_batch, RESULT_OK, RESULT_PROCESSING_FAILED,
};
use rstest::rstest;
use serde_json::{json, Map, Value};

use crate::fixtures::change_events::{
    batch, encode_payload, firehose_record, fixed_clock, insert_event, modify_event,
    remove_event, INGESTED_AT,
};

fn decode_row(data: &Base64Data) -> Map<String, Value> {
    let line = std::str::from_utf8(&data.0).unwrap();
    let json = line.strip_suffix('\n').expect("line must be newline terminated");
    serde_json::from_str(json).unwrap()
}

#[rstest]
fn insert_is_flattened_from_new_image(insert_event: Value) {
    let request = batch(vec![firehose_record("1", encode_payload(&insert_event))]);

    let response = transform_batch(request, fixed_clock);

    assert_eq!(Some(RESULT_OK), response.records[0].result.as_deref());
    let row = decode_row(&response.records[0].data);
    assert_eq!(
        json!({
            "id": "1",
            "name": "a",
            "price": "12.50",
            "active": "True",
            "tags": "[\"new\",\"sale\"]",
            "Event": "INSERT",
            "ingestion_timestamp": INGESTED_AT
        }),
        Value::Object(row)
    );
}

#[rstest]
fn remove_is_flattened_from_old_image(remove_event: Value) {
    let request = batch(vec![firehose_record("1", encode_payload(&remove_event))]);

    let response = transform_batch(request, fixed_clock);

    let row = decode_row(&response.records[0].data);
    assert_eq!("2", row["id"]);
    assert_eq!("b", row["name"]);
    assert_eq!("REMOVE", row["Event"]);
}

#[rstest]
fn injected_columns_overwrite_item_attributes(modify_event: Value) {
    let request = batch(vec![firehose_record("1", encode_payload(&modify_event))]);

    let response = transform_batch(request, fixed_clock);

    let row = decode_row(&response.records[0].data);
    assert_eq!("MODIFY", row["Event"]);
    assert_eq!(INGESTED_AT, row["ingestion_timestamp"]);
    assert_eq!(r#"{"city":{"S":"Tokyo"}}"#, row["address"]);
}

#[rstest]
fn same_record_and_timestamp_encode_identically(insert_event: Value) {
    let data = encode_payload(&insert_event);

    let first = transform_batch(batch(vec![firehose_record("1", data.clone())]), fixed_clock);
    let second = transform_batch(batch(vec![firehose_record("1", data)]), fixed_clock);

    assert_eq!(first.records[0].data, second.records[0].data);
}

#[rstest]
fn batch_keeps_order_ids_and_isolates_failures(
    insert_event: Value,
    remove_event: Value,
    modify_event: Value,
) {
    let malformed = STANDARD.encode("{ not json");
    let not_utf8 = STANDARD.encode([0xff, 0xfe, 0xfd]);
    let unknown_event = encode_payload(&json!({
        "eventName": "TTL_EXPIRED",
        "dynamodb": { "OldImage": { "id": { "S": "9" } } }
    }));
    let request = batch(vec![
        firehose_record("r-1", encode_payload(&insert_event)),
        firehose_record("r-2", malformed.clone()),
        firehose_record("r-3", encode_payload(&remove_event)),
        firehose_record("r-4", unknown_event.clone()),
        firehose_record("r-5", encode_payload(&modify_event)),
        firehose_record("r-6", not_utf8.clone()),
    ]);

    let response = transform_batch(request, fixed_clock);

    let ids: Vec<Option<&str>> = response
        .records
        .iter()
        .map(|record| record.record_id.as_deref())
        .collect();
    assert_eq!(
        vec![
            Some("r-1"),
            Some("r-2"),
            Some("r-3"),
            Some("r-4"),
            Some("r-5"),
            Some("r-6")
        ],
        ids
    );

    let results: Vec<Option<&str>> = response
        .records
        .iter()
        .map(|record| record.result.as_deref())
        .collect();
    assert_eq!(
        vec![
            Some(RESULT_OK),
            Some(RESULT_PROCESSING_FAILED),
            Some(RESULT_OK),
            Some(RESULT_PROCESSING_FAILED),
            Some(RESULT_OK),
            Some(RESULT_PROCESSING_FAILED),
        ],
        results
    );
    assert_eq!(malformed, STANDARD.encode(&response.records[1].data.0));
    assert_eq!(unknown_event, STANDARD.encode(&response.records[3].data.0));
    assert_eq!(not_utf8, STANDARD.encode(&response.records[5].data.0));
}

#[test]
fn empty_batch_yields_empty_response() {
    let response = transform_batch(batch(vec![]), fixed_clock);
    assert!(response.records.is_empty());
}
