use crate::impl_unknown_error_trait;
use async_trait::async_trait;

pub mod data_lake_repository_impl;

#[cfg(feature = "test_mocks")]
use mockall::mock;

#[derive(Debug, thiserror::Error)]
pub enum DataLakeRepositoryError {
    #[error("{0:#}")]
    Unknown(anyhow::Error),
}

impl_unknown_error_trait!(DataLakeRepositoryError);

#[async_trait]
pub trait DataLakeRepository
where
    Self: Sync + Send,
{
    /// Deletes every object under `prefix`, returning how many were removed.
    async fn purge_prefix(&self, prefix: &str) -> Result<usize, DataLakeRepositoryError>;

    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), DataLakeRepositoryError>;
}

#[cfg(feature = "test_mocks")]
mock! {
    pub DataLakeRepository {}
    #[async_trait]
    impl DataLakeRepository for DataLakeRepository {
        async fn purge_prefix(&self, prefix: &str) -> Result<usize, DataLakeRepositoryError>;

        async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), DataLakeRepositoryError>;
    }
}
