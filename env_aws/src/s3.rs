use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

use fw_defs::SnapshotStore;

/// S3-backed snapshot store. One object per (service, suffix) pair.
pub struct S3SnapshotStore {
    client: aws_sdk_s3::Client,
}

impl S3SnapshotStore {
    pub fn new(shared_config: &aws_config::SdkConfig) -> Self {
        S3SnapshotStore {
            client: aws_sdk_s3::Client::new(shared_config),
        }
    }
}

#[async_trait]
impl SnapshotStore for S3SnapshotStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, anyhow::Error> {
        let response = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(response) => response,
            Err(e) => {
                // a missing key is the normal first-run condition
                if e.as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false)
                {
                    return Ok(None);
                }
                return Err(e.into());
            }
        };
        let bytes = response.body.collect().await?.into_bytes();
        Ok(Some(bytes.to_vec()))
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<u16, anyhow::Error> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await?;
        Ok(200)
    }
}
