mod alarm;
mod dashboard;
mod errors;
mod instance;
mod provider;
mod service;
mod team;

pub use alarm::{AlarmDimension, AlarmPage, AlarmRecord, AlarmSpec};
pub use dashboard::{DashboardEntry, Widget};
pub use errors::MonitorError;
pub use instance::{Instance, TagEntry};
pub use provider::{
    AlarmApi, DashboardApi, DiscoveryClient, DiscoveryFactory, NotificationApi, SnapshotStore,
};
pub use service::{AlarmRule, ChartRule, InstanceFilter, MetricList, ServiceDefinition};
pub use team::TeamDefinition;
