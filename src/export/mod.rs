//! Full load of a producer table into the data lake as Parquet files.

pub mod job;
pub mod parameters;
pub mod parquet;

pub use job::{ExportSummary, FullLoadJob};
pub use parameters::{ExportJobParameters, FullLoadConfig};
