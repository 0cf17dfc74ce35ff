use async_trait::async_trait;

use fw_defs::NotificationApi;

pub struct SnsNotifier {
    client: aws_sdk_sns::Client,
}

impl SnsNotifier {
    pub fn new(shared_config: &aws_config::SdkConfig) -> Self {
        SnsNotifier {
            client: aws_sdk_sns::Client::new(shared_config),
        }
    }
}

#[async_trait]
impl NotificationApi for SnsNotifier {
    async fn list_topics(&self) -> Result<Vec<String>, anyhow::Error> {
        let mut arns = vec![];
        let mut next_token: Option<String> = None;
        loop {
            let mut request = self.client.list_topics();
            if let Some(token) = &next_token {
                request = request.next_token(token);
            }
            let response = request.send().await?;
            arns.extend(
                response
                    .topics()
                    .iter()
                    .filter_map(|topic| topic.topic_arn().map(String::from)),
            );
            next_token = response.next_token().map(String::from);
            if next_token.is_none() {
                break;
            }
        }
        Ok(arns)
    }

    async fn publish(
        &self,
        topic_arn: &str,
        subject: &str,
        message: &str,
    ) -> Result<String, anyhow::Error> {
        let response = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await?;
        Ok(response.message_id().unwrap_or_default().to_string())
    }
}
