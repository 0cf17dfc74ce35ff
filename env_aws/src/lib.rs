mod cloudwatch;
mod discovery;
mod s3;
mod sns;

pub use cloudwatch::CloudWatchMonitor;
pub use discovery::{AwsClientFactory, Ec2Discovery, LambdaDiscovery, RdsDiscovery, SERVICE_LIST};
pub use s3::S3SnapshotStore;
pub use sns::SnsNotifier;
