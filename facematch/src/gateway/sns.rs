use anyhow::anyhow;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::Client;

use crate::options::PipelineOptions;

use super::{GatewayError, GatewayResult, Notifier};

/// Fire-and-forget publish of plain text messages to a single topic
pub struct SnsNotifier {
    client: Client,
    topic_arn: String,
}

impl SnsNotifier {
    pub fn new(sdk: &SdkConfig, options: &PipelineOptions) -> Self {
        Self {
            client: Client::new(sdk),
            topic_arn: options.sns_topic.clone(),
        }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    #[tracing::instrument(skip(self))]
    async fn publish(&self, message: &str) -> GatewayResult<()> {
        let response = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(message)
            .send()
            .await
            .map_err(|e| GatewayError::UnableToPublish(anyhow!(e)))?;

        log::debug!(
            "Published notification [MessageId: {}]",
            response.message_id().unwrap_or("-")
        );

        Ok(())
    }
}
