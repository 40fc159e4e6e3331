use async_trait::async_trait;
use aws_lambda_events::event::firehose::{KinesisFirehoseEvent, KinesisFirehoseResponse};
use chrono::Utc;
use ddb_streaming_datalake::{
    lambda_main, lambda_structure::lambda_trait::Lambda, result::error::PipelineError,
    result::Result, transformation::transform_batch,
};

pub struct FirehoseTransformation;

#[async_trait]
impl Lambda for FirehoseTransformation {
    type PersistedMemory = ();
    type InputBody = KinesisFirehoseEvent;
    type Output = KinesisFirehoseResponse;
    type Error = PipelineError;

    async fn bootstrap() -> Result<Self::PersistedMemory> {
        Ok(())
    }

    async fn run(request: Self::InputBody, _state: &Self::PersistedMemory) -> Result<Self::Output> {
        Ok(transform_batch(request, Utc::now))
    }
}

lambda_main!(FirehoseTransformation);
