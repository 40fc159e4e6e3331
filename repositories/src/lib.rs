pub mod data_lake;
pub mod table_snapshot;
pub mod unknown_error;
