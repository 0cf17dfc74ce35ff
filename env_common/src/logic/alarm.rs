use std::collections::BTreeMap;

use log::{info, warn};

use fw_defs::{
    AlarmApi, AlarmDimension, AlarmRecord, AlarmSpec, Instance, MonitorError, NotificationApi,
    ServiceDefinition,
};

/// The provider rejects delete batches above 100 names; stay under it with
/// headroom.
pub const ALARM_DELETE_BATCH: usize = 90;

/// Which alarms a prefix-scoped query should cover.
pub enum AlarmScope<'a> {
    /// Every alarm under `{AlarmPrefix}_{Service}`.
    All,
    /// Alarms of these instances only, one query per instance.
    Instances(&'a [Instance]),
    /// Nothing; yields an empty result without touching the provider.
    None,
}

/// Resolves the configured severities against the live topic listing.
/// Severities mapped to null, or to an ARN that is not live, are dropped.
pub async fn get_notify_targets(
    api: &dyn NotificationApi,
    destinations: &BTreeMap<String, Option<String>>,
) -> Result<BTreeMap<String, String>, anyhow::Error> {
    let live = api.list_topics().await?;
    let mut targets = BTreeMap::new();
    for (severity, destination) in destinations {
        if let Some(arn) = destination {
            if live.contains(arn) {
                targets.insert(severity.clone(), arn.clone());
            }
        }
    }
    Ok(targets)
}

/// Creates one alarm per (instance, rule) pair, named `{identity}_{kind}`.
/// A rule whose severity has no live destination is skipped with a warning;
/// an instance missing its dimension attribute is skipped with a warning.
/// Neither aborts the batch. Provider failures on the upsert itself
/// propagate and fail the service.
///
/// Returns the authoritative alarm set for the service scope, re-queried
/// after all creates were issued.
pub async fn create_instance_alarms(
    alarm_api: &dyn AlarmApi,
    notify_api: &dyn NotificationApi,
    instances: &[Instance],
    svc_info: &ServiceDefinition,
) -> Result<Vec<AlarmRecord>, anyhow::Error> {
    let targets = get_notify_targets(notify_api, &svc_info.alarm_destinations).await?;

    for instance in instances {
        let dim_value = match instance.dimension_value(&svc_info.alarm_dim_name) {
            Some(dim_value) => dim_value,
            None => {
                warn!(
                    "Instance {} has no {} attribute, skipping its alarms",
                    instance.identity, svc_info.alarm_dim_name
                );
                continue;
            }
        };

        for (kind, rule) in &svc_info.alarms {
            let alarm_name = format!("{}_{}", instance.identity, kind);
            let target = match targets.get(&rule.alarm_action) {
                Some(target) => target.clone(),
                None => {
                    let err = MonitorError::Resolution(format!(
                        "notification destination for severity '{}' in service {}",
                        rule.alarm_action, svc_info.service
                    ));
                    warn!("Failed to create alarm {}: {}", alarm_name, err);
                    continue;
                }
            };

            let ok_actions = if rule.send_ok {
                vec![target.clone()]
            } else {
                vec![]
            };
            let spec = AlarmSpec {
                alarm_name,
                metric_name: rule.metric_name.clone(),
                namespace: rule.namespace.clone(),
                alarm_description: rule.alarm_description.clone(),
                statistic: rule.statistic.clone(),
                period: rule.period,
                threshold: rule.threshold,
                comparison_operator: rule.comparison_operator.clone(),
                evaluation_periods: rule.evaluation_periods,
                alarm_actions: vec![target],
                ok_actions,
                dimensions: vec![AlarmDimension {
                    name: svc_info.alarm_dim_name.clone(),
                    value: dim_value.to_string(),
                }],
            };
            alarm_api.put_metric_alarm(&spec).await?;
        }
    }

    get_service_alarms(
        alarm_api,
        &svc_info.alarm_prefix,
        &svc_info.service,
        AlarmScope::All,
    )
    .await
}

/// Prefix-scoped alarm listing, paginated with a sequential cursor loop.
/// Per-instance queries use the instance identity as the prefix; the
/// identity already embeds `{AlarmPrefix}_{Service}`.
pub async fn get_service_alarms(
    api: &dyn AlarmApi,
    prefix: &str,
    service: &str,
    scope: AlarmScope<'_>,
) -> Result<Vec<AlarmRecord>, anyhow::Error> {
    let prefixes: Vec<String> = match scope {
        AlarmScope::All => vec![format!("{}_{}", prefix, service)],
        AlarmScope::Instances(instances) => instances
            .iter()
            .map(|inst| inst.identity.clone())
            .collect(),
        AlarmScope::None => return Ok(vec![]),
    };

    let mut alarms = vec![];
    for alarm_prefix in &prefixes {
        let mut next_token: Option<String> = None;
        loop {
            let page = api
                .describe_alarms_page(alarm_prefix, next_token.as_deref())
                .await?;
            alarms.extend(page.alarms);
            next_token = page.next_token;
            if next_token.is_none() {
                break;
            }
        }
    }
    Ok(alarms)
}

/// Deletes the given alarms in batches of at most ALARM_DELETE_BATCH names,
/// flushing the final partial batch.
pub async fn delete_service_alarms(
    api: &dyn AlarmApi,
    alarms: &[AlarmRecord],
) -> Result<(), anyhow::Error> {
    let names: Vec<String> = alarms.iter().map(|a| a.alarm_name.clone()).collect();
    for batch in names.chunks(ALARM_DELETE_BATCH) {
        api.delete_alarms(batch).await?;
    }
    if !names.is_empty() {
        info!("Deleted {} alarms", names.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::testutil::{ec2_service, instance, FakeAlarmApi, FakeNotificationApi};
    use pretty_assertions::assert_eq;

    fn record(name: &str) -> AlarmRecord {
        AlarmRecord {
            alarm_name: name.to_string(),
            alarm_arn: format!("arn:aws:cloudwatch:us-east-1:1:alarm:{}", name),
            metric_name: "CPUUtilization".to_string(),
            dimensions: vec![],
        }
    }

    #[tokio::test]
    async fn test_notify_targets_drop_null_and_dead_destinations() {
        let notify = FakeNotificationApi::with_topics(&["arn:critical"]);
        let destinations: BTreeMap<String, Option<String>> = BTreeMap::from([
            ("info".to_string(), None),
            ("warning".to_string(), Some("arn:not-live".to_string())),
            ("critical".to_string(), Some("arn:critical".to_string())),
        ]);
        let targets = get_notify_targets(&notify, &destinations).await.unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets["critical"], "arn:critical");
    }

    #[tokio::test]
    async fn test_create_alarms_issues_one_upsert_per_pair() {
        let svc_info = ec2_service(6);
        let alarm_api = FakeAlarmApi::default();
        let notify = FakeNotificationApi::with_topics(&["arn:critical", "arn:warning"]);
        let instances = vec![
            instance("fleetwatch_ec2_i-1", "i-1"),
            instance("fleetwatch_ec2_i-2", "i-2"),
        ];

        let alarms = create_instance_alarms(&alarm_api, &notify, &instances, &svc_info)
            .await
            .unwrap();

        let puts = alarm_api.put_calls();
        assert_eq!(puts.len(), 12);
        assert!(puts.contains(&"fleetwatch_ec2_i-1_rule0".to_string()));
        assert!(puts.contains(&"fleetwatch_ec2_i-2_rule5".to_string()));

        // the returned set is the authoritative post-create listing
        assert_eq!(alarms.len(), 12);
    }

    #[tokio::test]
    async fn test_create_alarms_skips_unresolved_severity_only() {
        let mut svc_info = ec2_service(2);
        // rule1 points at a severity with no live topic
        svc_info.alarms.get_mut("rule1").unwrap().alarm_action = "info".to_string();
        let alarm_api = FakeAlarmApi::default();
        let notify = FakeNotificationApi::with_topics(&["arn:critical", "arn:warning"]);
        let instances = vec![instance("fleetwatch_ec2_i-1", "i-1")];

        create_instance_alarms(&alarm_api, &notify, &instances, &svc_info)
            .await
            .unwrap();

        let puts = alarm_api.put_calls();
        assert_eq!(puts, vec!["fleetwatch_ec2_i-1_rule0".to_string()]);
    }

    #[tokio::test]
    async fn test_create_alarms_skips_instance_without_dimension() {
        let svc_info = ec2_service(2);
        let alarm_api = FakeAlarmApi::default();
        let notify = FakeNotificationApi::with_topics(&["arn:critical", "arn:warning"]);
        let instances = vec![
            Instance::new("fleetwatch_ec2_ghost".into(), serde_json::json!({})),
            instance("fleetwatch_ec2_i-1", "i-1"),
        ];

        create_instance_alarms(&alarm_api, &notify, &instances, &svc_info)
            .await
            .unwrap();

        assert_eq!(alarm_api.put_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_send_ok_controls_ok_actions() {
        let svc_info = ec2_service(2);
        let alarm_api = FakeAlarmApi::default();
        let notify = FakeNotificationApi::with_topics(&["arn:critical", "arn:warning"]);
        let instances = vec![instance("fleetwatch_ec2_i-1", "i-1")];

        create_instance_alarms(&alarm_api, &notify, &instances, &svc_info)
            .await
            .unwrap();

        let specs = alarm_api.put_specs();
        let rule0 = specs.iter().find(|s| s.alarm_name.ends_with("rule0")).unwrap();
        let rule1 = specs.iter().find(|s| s.alarm_name.ends_with("rule1")).unwrap();
        // ec2_service marks even rules send_ok
        assert_eq!(rule0.ok_actions.len(), 1);
        assert!(rule1.ok_actions.is_empty());
    }

    #[tokio::test]
    async fn test_query_scope_none_is_empty_without_calls() {
        let alarm_api = FakeAlarmApi::default();
        let alarms = get_service_alarms(&alarm_api, "fleetwatch", "ec2", AlarmScope::None)
            .await
            .unwrap();
        assert!(alarms.is_empty());
        assert_eq!(alarm_api.describe_calls(), 0);
    }

    #[tokio::test]
    async fn test_query_follows_pagination_cursor() {
        let alarm_api = FakeAlarmApi::with_pages(vec![
            (vec![record("fleetwatch_ec2_i-1_a")], Some("t1".to_string())),
            (vec![record("fleetwatch_ec2_i-1_b")], Some("t2".to_string())),
            (vec![record("fleetwatch_ec2_i-2_a")], None),
        ]);
        let alarms = get_service_alarms(&alarm_api, "fleetwatch", "ec2", AlarmScope::All)
            .await
            .unwrap();
        assert_eq!(alarms.len(), 3);
        assert_eq!(alarm_api.describe_calls(), 3);
    }

    #[tokio::test]
    async fn test_query_per_instance_uses_identity_prefix() {
        let alarm_api = FakeAlarmApi::default();
        let instances = vec![
            instance("fleetwatch_ec2_i-1", "i-1"),
            instance("fleetwatch_ec2_i-2", "i-2"),
        ];
        get_service_alarms(
            &alarm_api,
            "fleetwatch",
            "ec2",
            AlarmScope::Instances(instances.as_slice()),
        )
        .await
        .unwrap();
        assert_eq!(
            alarm_api.describe_prefixes(),
            vec!["fleetwatch_ec2_i-1", "fleetwatch_ec2_i-2"]
        );
    }

    #[tokio::test]
    async fn test_delete_batches_91_as_90_plus_1() {
        let alarm_api = FakeAlarmApi::default();
        let alarms: Vec<AlarmRecord> = (0..91).map(|i| record(&format!("alarm_{}", i))).collect();
        delete_service_alarms(&alarm_api, &alarms).await.unwrap();
        assert_eq!(alarm_api.delete_batch_sizes(), vec![90, 1]);
    }

    #[tokio::test]
    async fn test_delete_empty_issues_no_calls() {
        let alarm_api = FakeAlarmApi::default();
        delete_service_alarms(&alarm_api, &[]).await.unwrap();
        assert!(alarm_api.delete_batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_delete_exact_batch_is_single_call() {
        let alarm_api = FakeAlarmApi::default();
        let alarms: Vec<AlarmRecord> = (0..90).map(|i| record(&format!("alarm_{}", i))).collect();
        delete_service_alarms(&alarm_api, &alarms).await.unwrap();
        assert_eq!(alarm_api.delete_batch_sizes(), vec![90]);
    }
}
