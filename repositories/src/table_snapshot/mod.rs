use crate::impl_unknown_error_trait;
use async_trait::async_trait;
use model::change_event::Image;

pub mod table_snapshot_repository_impl;

#[cfg(feature = "test_mocks")]
use mockall::mock;

/// Read capacity assumed for tables billed on demand, which report no provisioned units.
pub const ON_DEMAND_READ_CAPACITY: f64 = 40_000.0;

#[derive(Debug, thiserror::Error)]
pub enum TableSnapshotRepositoryError {
    #[error("{0:#}")]
    Unknown(anyhow::Error),
    #[error("{0}")]
    TableNotFound(String),
}

impl_unknown_error_trait!(TableSnapshotRepositoryError);

#[async_trait]
pub trait TableSnapshotRepository
where
    Self: Sync + Send,
{
    /// Read capacity units per second the table can serve.
    async fn read_capacity(&self) -> Result<f64, TableSnapshotRepositoryError>;

    /// Reads every item of one parallel-scan segment, pacing the requests so the
    /// consumed capacity stays under `read_units_per_second`.
    async fn scan_segment(
        &self,
        segment: i64,
        total_segments: i64,
        read_units_per_second: f64,
    ) -> Result<Vec<Image>, TableSnapshotRepositoryError>;
}

#[cfg(feature = "test_mocks")]
mock! {
    pub TableSnapshotRepository {}
    #[async_trait]
    impl TableSnapshotRepository for TableSnapshotRepository {
        async fn read_capacity(&self) -> Result<f64, TableSnapshotRepositoryError>;

        async fn scan_segment(
            &self,
            segment: i64,
            total_segments: i64,
            read_units_per_second: f64,
        ) -> Result<Vec<Image>, TableSnapshotRepositoryError>;
    }
}
