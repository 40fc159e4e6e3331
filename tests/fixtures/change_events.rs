use aws_lambda_events::event::firehose::KinesisFirehoseEvent;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use rstest::fixture;
use serde_json::{json, Value};

pub const INGESTED_AT: &str = "2024-03-01 12:00:00.000000";

pub fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Firehose record carrying `data`, which must already be base64 encoded.
pub fn firehose_record(record_id: &str, data: String) -> Value {
    json!({
        "recordId": record_id,
        "approximateArrivalTimestamp": 1_709_294_400_000_i64,
        "data": data
    })
}

pub fn encode_payload(payload: &Value) -> String {
    STANDARD.encode(payload.to_string())
}

pub fn batch(records: Vec<Value>) -> KinesisFirehoseEvent {
    serde_json::from_value(json!({
        "invocationId": "00540a87-5050-496a-84e4-e7d92bbaf5e2",
        "deliveryStreamArn": "arn:aws:firehose:ap-northeast-1:123456789012:deliverystream/ddb-streaming",
        "region": "ap-northeast-1",
        "records": records
    }))
    .unwrap()
}

#[fixture]
pub fn insert_event() -> Value {
    json!({
        "awsRegion": "ap-northeast-1",
        "eventID": "c4ca4238a0b923820dcc509a6f75849b",
        "eventName": "INSERT",
        "eventSource": "aws:dynamodb",
        "dynamodb": {
            "ApproximateCreationDateTime": 1709294400,
            "Keys": { "id": { "S": "1" } },
            "NewImage": {
                "id": { "S": "1" },
                "name": { "S": "a" },
                "price": { "N": "12.50" },
                "active": { "BOOL": true },
                "tags": { "SS": ["new", "sale"] }
            },
            "SizeBytes": 59,
            "StreamViewType": "NEW_AND_OLD_IMAGES"
        }
    })
}

#[fixture]
pub fn remove_event() -> Value {
    json!({
        "eventName": "REMOVE",
        "dynamodb": {
            "Keys": { "id": { "S": "2" } },
            "OldImage": { "id": { "S": "2" }, "name": { "S": "b" } }
        }
    })
}

#[fixture]
pub fn modify_event() -> Value {
    json!({
        "eventName": "MODIFY",
        "dynamodb": {
            "Keys": { "id": { "S": "3" } },
            "NewImage": {
                "id": { "S": "3" },
                "Event": { "S": "overwritten" },
                "address": { "M": { "city": { "S": "Tokyo" } } }
            },
            "OldImage": { "id": { "S": "3" } }
        }
    })
}
