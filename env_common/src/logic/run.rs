use std::path::Path;

use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;

use fw_defs::{
    AlarmApi, DashboardApi, DiscoveryFactory, Instance, MonitorError, NotificationApi,
    ServiceDefinition, SnapshotStore, TeamDefinition, Widget,
};
use fw_utils::get_timestamp;

use crate::logic::alarm::{self, AlarmScope};
use crate::logic::{config, dashboard, diff, discovery, identity, report, snapshot};

/// Clients for one reconciliation run. Constructed by the caller and passed
/// in so every collaborator can be substituted in tests.
pub struct RunClients<'a> {
    pub discovery: &'a dyn DiscoveryFactory,
    pub alarms: &'a dyn AlarmApi,
    pub dashboards: &'a dyn DashboardApi,
    pub notifications: &'a dyn NotificationApi,
    pub snapshots: &'a dyn SnapshotStore,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct RunSummary {
    pub team: String,
    pub services_processed: Vec<String>,
    pub services_skipped: Vec<String>,
    pub services_failed: Vec<String>,
    pub widget_count: usize,
    pub team_dashboard_pages: usize,
}

struct ServiceOutcome {
    service: String,
    widgets: Vec<Widget>,
}

/// Runs the full reconciliation for one team: every declared service in
/// order, then the team dashboard. A failing service is logged and skipped;
/// it never stops the loop, and state changes of already-completed services
/// stand.
pub async fn run_team(
    clients: &RunClients<'_>,
    defs_dir: &Path,
) -> Result<RunSummary, anyhow::Error> {
    let team_info = match config::load_team_file(defs_dir) {
        Some(team_info) => team_info,
        None => {
            warn!("No usable team definition, nothing to reconcile");
            return Ok(RunSummary::default());
        }
    };

    let mut summary = RunSummary {
        team: team_info.team.clone(),
        ..Default::default()
    };
    let mut all_widgets: Vec<Widget> = vec![];

    for svc_file in &team_info.monitor_defs {
        match run_service(clients, &team_info, defs_dir, svc_file).await {
            Ok(Some(outcome)) => {
                all_widgets.extend(outcome.widgets);
                summary.services_processed.push(outcome.service);
            }
            Ok(None) => {
                summary.services_skipped.push(svc_file.clone());
            }
            Err(e) => {
                // failures stay scoped to this service; the loop moves on
                let err = MonitorError::Transport(e);
                error!("Service run failed for {}: {}", svc_file, err);
                summary.services_failed.push(svc_file.clone());
            }
        }
    }
    summary.widget_count = all_widgets.len();

    // The team dashboard is scoped by team-level config only; it must not
    // depend on whichever service the loop visited last.
    if team_info.create_team_dashboard {
        match rebuild_team_dashboard(clients, &team_info, &all_widgets).await {
            Ok(pages) => summary.team_dashboard_pages = pages,
            Err(e) => error!("Team dashboard rebuild failed: {}", e),
        }
    }

    Ok(summary)
}

async fn rebuild_team_dashboard(
    clients: &RunClients<'_>,
    team_info: &TeamDefinition,
    widgets: &[Widget],
) -> Result<usize, anyhow::Error> {
    let name = team_info.dashboard_scope();
    dashboard::clear_dashboards(clients.dashboards, &name).await?;
    let entries = dashboard::generate_dashboard(clients.dashboards, &name, widgets).await?;
    Ok(entries.len())
}

/// One service's reconciliation pass. Ok(None) means the service was skipped
/// (unloadable definition or unsupported discovery); Err means a provider
/// call failed mid-flight and the service's remaining steps were abandoned.
async fn run_service(
    clients: &RunClients<'_>,
    team_info: &TeamDefinition,
    defs_dir: &Path,
    svc_file: &str,
) -> Result<Option<ServiceOutcome>, anyhow::Error> {
    let svc_info = match config::load_service_file(defs_dir, svc_file) {
        Some(svc_info) => svc_info,
        None => {
            warn!("Skipping unloadable service definition {}", svc_file);
            return Ok(None);
        }
    };

    let client = match clients.discovery.client_for(&svc_info.service) {
        Ok(client) => client,
        Err(MonitorError::UnsupportedService(service)) => {
            error!("Service unknown to the discovery API: {}", service);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let instances = discover_and_name(client.as_ref(), &svc_info).await?;
    info!(
        "Discovered {} instances for service {}",
        instances.len(),
        svc_info.service
    );

    let key = svc_info.snapshot_key();
    let previous = snapshot::load_instances(clients.snapshots, &team_info.bucket, &key).await?;
    let (removed, added) = diff::determine_deltas(instances.clone(), previous);

    // Alarms of removed instances go first, so a rename never leaves both
    // the old and new alarm set behind.
    if let Some(removed_insts) = &removed {
        if !removed_insts.is_empty() {
            let stale = alarm::get_service_alarms(
                clients.alarms,
                &svc_info.alarm_prefix,
                &svc_info.service,
                AlarmScope::Instances(removed_insts.as_slice()),
            )
            .await?;
            alarm::delete_service_alarms(clients.alarms, &stale).await?;
        }
    }

    // Creates are idempotent upserts, so only the added side needs calls;
    // the authoritative post-state comes from the full-scope re-query.
    let alarms =
        alarm::create_instance_alarms(clients.alarms, clients.notifications, &added, &svc_info)
            .await?;

    let status =
        snapshot::save_instances(clients.snapshots, &instances, &team_info.bucket, &key).await?;
    if status != 200 {
        warn!("Snapshot write for {} returned status {}", key, status);
    }

    if team_info.send_report {
        if let Some(report_arn) = &svc_info.report_arn {
            if let Some(body) = report::format_report(
                instances.len(),
                &added,
                removed.as_deref(),
                &svc_info.service,
            ) {
                report::send_report(clients.notifications, &body, report_arn, &get_timestamp())
                    .await?;
            }
        }
    }

    let widgets = dashboard::build_dashboard_widgets(&instances, &alarms, &svc_info);
    if svc_info.create_service_dashboard {
        let name = svc_info.alarm_scope();
        dashboard::clear_dashboards(clients.dashboards, &name).await?;
        dashboard::generate_dashboard(clients.dashboards, &name, &widgets).await?;
    }

    Ok(Some(ServiceOutcome {
        service: svc_info.service.clone(),
        widgets,
    }))
}

/// Discovers the service's instances and assigns each its identity. An
/// instance without the alarm dimension attribute cannot be named or scoped
/// and is dropped with a warning.
async fn discover_and_name(
    client: &dyn fw_defs::DiscoveryClient,
    svc_info: &ServiceDefinition,
) -> Result<Vec<Instance>, anyhow::Error> {
    let raw = discovery::get_service_instances(client, svc_info).await?;
    let mut instances = Vec::with_capacity(raw.len());
    for attributes in raw {
        let dim_value = match attributes
            .get(&svc_info.alarm_dim_name)
            .and_then(Value::as_str)
        {
            Some(dim_value) => dim_value.to_string(),
            None => {
                warn!(
                    "Discovered {} instance without {} attribute, dropping it",
                    svc_info.service, svc_info.alarm_dim_name
                );
                continue;
            }
        };
        let identity =
            identity::create_friendly_name(client, svc_info, &attributes, &dim_value).await;
        instances.push(Instance::new(identity, attributes));
    }
    Ok(instances)
}
