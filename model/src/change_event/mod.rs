use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use self::attribute::{flat_string, flatten_image, Image};
pub use serde_dynamo::AttributeValue;

mod attribute;

/// Column injected with the name of the event that produced the record.
pub const EVENT_COLUMN: &str = "Event";
/// Column injected with the time the record went through the transformer.
pub const INGESTION_TIMESTAMP_COLUMN: &str = "ingestion_timestamp";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChangeEventError {
    #[error(r#"unsupported event name "{0}""#)]
    UnsupportedEventName(String),

    #[error("{event} event does not carry a {image}")]
    MissingImage {
        event: EventName,
        image: &'static str,
    },

    #[error("{image} is not a valid item: {reason}")]
    InvalidImage {
        image: &'static str,
        reason: String,
    },
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventName {
    Insert,
    Modify,
    Remove,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Insert => "INSERT",
            EventName::Modify => "MODIFY",
            EventName::Remove => "REMOVE",
        }
    }
}

impl Display for EventName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventName {
    type Err = ChangeEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(EventName::Insert),
            "MODIFY" => Ok(EventName::Modify),
            "REMOVE" => Ok(EventName::Remove),
            other => Err(ChangeEventError::UnsupportedEventName(other.to_owned())),
        }
    }
}

/// A DynamoDB change-data-capture record as delivered through the Kinesis stream.
///
/// The event name is kept as raw text so an unexpected value can be reported
/// per record instead of failing deserialization of the whole payload.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct ChangeEvent {
    pub event_name: String,
    pub dynamodb: StreamRecord,
}

/// Images stay raw until one is selected, so a malformed image the event does not
/// use cannot fail the record.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all(deserialize = "PascalCase"))]
pub struct StreamRecord {
    pub new_image: Option<Value>,
    pub old_image: Option<Value>,
}

impl ChangeEvent {
    /// Picks the row image that describes the event: the new image for inserts and
    /// modifications, the old one for removals.
    pub fn into_image(self) -> Result<(EventName, Image), ChangeEventError> {
        let event = EventName::from_str(&self.event_name)?;
        let (image, image_name) = match event {
            EventName::Insert | EventName::Modify => (self.dynamodb.new_image, "NewImage"),
            EventName::Remove => (self.dynamodb.old_image, "OldImage"),
        };

        let image = image.ok_or(ChangeEventError::MissingImage {
            event,
            image: image_name,
        })?;

        serde_json::from_value::<Image>(image)
            .map(|image| (event, image))
            .map_err(|e| ChangeEventError::InvalidImage {
                image: image_name,
                reason: e.to_string(),
            })
    }

    /// Flattens the selected image and tags it with the event name and ingestion time.
    pub fn flatten(self, ingestion_timestamp: &str) -> Result<FlattenedRecord, ChangeEventError> {
        let (event, image) = self.into_image()?;
        let mut columns = flatten_image(image);

        columns.insert(EVENT_COLUMN.to_owned(), event.as_str().to_owned());
        columns.insert(
            INGESTION_TIMESTAMP_COLUMN.to_owned(),
            ingestion_timestamp.to_owned(),
        );

        Ok(FlattenedRecord(columns))
    }
}

/// Row image with every value erased to a string, ready for the data lake.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct FlattenedRecord(BTreeMap<String, String>);

impl FlattenedRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<BTreeMap<String, String>> for FlattenedRecord {
    fn from(columns: BTreeMap<String, String>) -> Self {
        Self(columns)
    }
}
