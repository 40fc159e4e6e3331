//! Columnar encoding of the flattened snapshot rows.
//!
//! Every value of a flattened row is a string, so every column is a nullable `Utf8`
//! column. Items do not share a fixed set of attributes; the schema is the sorted
//! union of all attribute names and a missing attribute is written as null.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use arrow::array::{ArrayRef, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

pub type Row = BTreeMap<String, String>;

pub fn snapshot_schema<'a, I>(rows: I) -> SchemaRef
where
    I: IntoIterator<Item = &'a Row>,
{
    let columns: BTreeSet<&String> = rows.into_iter().flat_map(|row| row.keys()).collect();

    Arc::new(Schema::new(
        columns
            .into_iter()
            .map(|column| Field::new(column.as_str(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ))
}

/// Encodes `rows` as one Snappy compressed Parquet file.
pub fn encode_parquet(rows: &[Row], schema: SchemaRef) -> anyhow::Result<Vec<u8>> {
    let columns: Vec<ArrayRef> = schema
        .fields()
        .iter()
        .map(|field| {
            let mut builder = StringBuilder::new();
            for row in rows {
                builder.append_option(row.get(field.name()));
            }
            Arc::new(builder.finish()) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let properties = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(Vec::new(), schema, Some(properties))?;
    writer.write(&batch)?;

    Ok(writer.into_inner()?)
}
