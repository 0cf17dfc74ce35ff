use async_trait::async_trait;
use aws_sdk_cloudwatch::types::{ComparisonOperator, Dimension, Statistic};
use serde_json::Value;

use fw_defs::{
    AlarmApi, AlarmDimension, AlarmPage, AlarmRecord, AlarmSpec, DashboardApi, DashboardEntry,
};

/// CloudWatch client for both the alarm and the dashboard lifecycle.
pub struct CloudWatchMonitor {
    client: aws_sdk_cloudwatch::Client,
}

impl CloudWatchMonitor {
    pub fn new(shared_config: &aws_config::SdkConfig) -> Self {
        CloudWatchMonitor {
            client: aws_sdk_cloudwatch::Client::new(shared_config),
        }
    }
}

#[async_trait]
impl AlarmApi for CloudWatchMonitor {
    async fn put_metric_alarm(&self, spec: &AlarmSpec) -> Result<(), anyhow::Error> {
        let mut request = self
            .client
            .put_metric_alarm()
            .alarm_name(&spec.alarm_name)
            .metric_name(&spec.metric_name)
            .namespace(&spec.namespace)
            .alarm_description(&spec.alarm_description)
            .statistic(Statistic::from(spec.statistic.as_str()))
            .period(spec.period)
            .threshold(spec.threshold)
            .comparison_operator(ComparisonOperator::from(spec.comparison_operator.as_str()))
            .evaluation_periods(spec.evaluation_periods);
        for action in &spec.alarm_actions {
            request = request.alarm_actions(action);
        }
        for action in &spec.ok_actions {
            request = request.ok_actions(action);
        }
        for dimension in &spec.dimensions {
            request = request.dimensions(
                Dimension::builder()
                    .name(&dimension.name)
                    .value(&dimension.value)
                    .build()?,
            );
        }
        request.send().await?;
        Ok(())
    }

    async fn describe_alarms_page(
        &self,
        prefix: &str,
        next_token: Option<&str>,
    ) -> Result<AlarmPage, anyhow::Error> {
        let mut request = self.client.describe_alarms().alarm_name_prefix(prefix);
        if let Some(token) = next_token {
            request = request.next_token(token);
        }
        let response = request.send().await?;

        let alarms = response
            .metric_alarms()
            .iter()
            .map(|alarm| AlarmRecord {
                alarm_name: alarm.alarm_name().unwrap_or_default().to_string(),
                alarm_arn: alarm.alarm_arn().unwrap_or_default().to_string(),
                metric_name: alarm.metric_name().unwrap_or_default().to_string(),
                dimensions: alarm
                    .dimensions()
                    .iter()
                    .map(|d| AlarmDimension {
                        name: d.name().to_string(),
                        value: d.value().to_string(),
                    })
                    .collect(),
            })
            .collect();

        Ok(AlarmPage {
            alarms,
            next_token: response.next_token().map(String::from),
        })
    }

    async fn delete_alarms(&self, names: &[String]) -> Result<(), anyhow::Error> {
        self.client
            .delete_alarms()
            .set_alarm_names(Some(names.to_vec()))
            .send()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DashboardApi for CloudWatchMonitor {
    async fn put_dashboard(&self, name: &str, body: &Value) -> Result<(), anyhow::Error> {
        self.client
            .put_dashboard()
            .dashboard_name(name)
            .dashboard_body(body.to_string())
            .send()
            .await?;
        Ok(())
    }

    async fn list_dashboards(&self, prefix: &str) -> Result<Vec<DashboardEntry>, anyhow::Error> {
        let mut entries = vec![];
        let mut next_token: Option<String> = None;
        loop {
            let mut request = self.client.list_dashboards().dashboard_name_prefix(prefix);
            if let Some(token) = &next_token {
                request = request.next_token(token);
            }
            let response = request.send().await?;
            entries.extend(response.dashboard_entries().iter().filter_map(|entry| {
                entry.dashboard_name().map(|name| DashboardEntry {
                    dashboard_name: name.to_string(),
                })
            }));
            next_token = response.next_token().map(String::from);
            if next_token.is_none() {
                break;
            }
        }
        Ok(entries)
    }

    async fn delete_dashboards(&self, names: &[String]) -> Result<(), anyhow::Error> {
        self.client
            .delete_dashboards()
            .set_dashboard_names(Some(names.to_vec()))
            .send()
            .await?;
        Ok(())
    }
}
