use lambda_runtime::{service_fn, Error, LambdaEvent};
use log::info;
use serde_json::{json, Value};

use fw_aws::{AwsClientFactory, CloudWatchMonitor, S3SnapshotStore, SnsNotifier};
use fw_common::logic::config;
use fw_common::{run_team, RunClients};

async fn func(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (_event, _context) = event.into_parts();

    let shared_config = aws_config::from_env().load().await;
    let factory = AwsClientFactory::new(shared_config.clone());
    let monitor = CloudWatchMonitor::new(&shared_config);
    let notifier = SnsNotifier::new(&shared_config);
    let snapshots = S3SnapshotStore::new(&shared_config);

    let clients = RunClients {
        discovery: &factory,
        alarms: &monitor,
        dashboards: &monitor,
        notifications: &notifier,
        snapshots: &snapshots,
    };

    let summary = run_team(&clients, &config::defs_path()).await?;
    info!(
        "Reconciled {} services for team '{}' ({} widgets)",
        summary.services_processed.len(),
        summary.team,
        summary.widget_count
    );

    let response = json!({
        "status": "successful",
        "summary": summary,
    });
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    fw_utils::setup_logging()?;

    let fun = service_fn(func);
    lambda_runtime::run(fun).await?;

    Ok(())
}
