use async_trait::async_trait;
use serde_json::Value;

use crate::{
    AlarmPage, AlarmSpec, DashboardEntry, InstanceFilter, MonitorError, TagEntry,
};

/// Paginated discovery listing for one cloud service. Implementations return
/// raw response pages in the provider's wire shape; flattening the nested
/// collections is the caller's job because the nesting depth is
/// configuration, not code.
#[async_trait]
pub trait DiscoveryClient: Send + Sync {
    async fn discover_pages(
        &self,
        operation: &str,
        filters: &[InstanceFilter],
    ) -> Result<Vec<Value>, anyhow::Error>;

    /// Secondary per-resource tag lookup, for services whose discovery
    /// response does not embed tags.
    async fn lookup_tags(
        &self,
        operation: &str,
        resource_ref: &str,
    ) -> Result<Vec<TagEntry>, anyhow::Error>;
}

/// Builds the discovery client for a declared service name.
pub trait DiscoveryFactory: Send + Sync {
    fn client_for(&self, service: &str) -> Result<Box<dyn DiscoveryClient>, MonitorError>;
}

#[async_trait]
pub trait AlarmApi: Send + Sync {
    /// Idempotent upsert by alarm name.
    async fn put_metric_alarm(&self, spec: &AlarmSpec) -> Result<(), anyhow::Error>;

    /// One page of a prefix-scoped alarm listing; the cursor loop lives in
    /// the caller.
    async fn describe_alarms_page(
        &self,
        prefix: &str,
        next_token: Option<&str>,
    ) -> Result<AlarmPage, anyhow::Error>;

    /// The provider rejects batches above 100 names; callers stay below that.
    async fn delete_alarms(&self, names: &[String]) -> Result<(), anyhow::Error>;
}

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Idempotent upsert by dashboard name.
    async fn put_dashboard(&self, name: &str, body: &Value) -> Result<(), anyhow::Error>;

    async fn list_dashboards(&self, prefix: &str) -> Result<Vec<DashboardEntry>, anyhow::Error>;

    async fn delete_dashboards(&self, names: &[String]) -> Result<(), anyhow::Error>;
}

#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// ARNs of every live notification topic, used to validate configured
    /// destinations.
    async fn list_topics(&self) -> Result<Vec<String>, anyhow::Error>;

    async fn publish(
        &self,
        topic_arn: &str,
        subject: &str,
        message: &str,
    ) -> Result<String, anyhow::Error>;
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// A missing key is a normal "no prior snapshot" condition, not an error.
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, anyhow::Error>;

    /// Returns the store's status code for the write.
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<u16, anyhow::Error>;
}
