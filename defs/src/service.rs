use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Declarative monitor definition for one cloud service, loaded from a JSON
/// file under the monitor definitions directory. Field names follow the JSON
/// schema of the monitor definition files.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceDefinition {
    pub service: String,
    /// Discovery listing operation, e.g. "describe_instances".
    pub discover_instance: String,
    #[serde(default)]
    pub instance_filters: Vec<InstanceFilter>,
    /// Outer collection key of the discovery response, if the results are
    /// nested. None means each page is already the instance list.
    #[serde(default)]
    pub instance_iterator1: Option<String>,
    /// Inner collection key for doubly nested responses.
    #[serde(default)]
    pub instance_iterator2: Option<String>,
    /// Attribute used as the alarm dimension, e.g. "InstanceId".
    pub alarm_dim_name: String,
    /// Key of the tag container embedded in the instance record.
    #[serde(default)]
    pub tags_key: Option<String>,
    /// Secondary tag lookup operation, for services whose discovery response
    /// does not embed tags.
    #[serde(default)]
    pub discover_tags: Option<String>,
    /// Instance attribute passed as the parameter of the secondary lookup.
    #[serde(default)]
    pub discover_tags_inst_parm: Option<String>,
    /// Tag key holding the human-chosen instance name.
    #[serde(default)]
    pub friendly_name: Option<String>,
    /// Append the dimension value even when a friendly name was found.
    #[serde(default)]
    pub ensure_unique_name: bool,
    pub alarm_prefix: String,
    #[serde(rename = "ReportARN", default)]
    pub report_arn: Option<String>,
    #[serde(default)]
    pub alarms: BTreeMap<String, AlarmRule>,
    /// Severity name -> notification topic ARN. A null value disables that
    /// severity; a non-null value must match a live topic or the severity is
    /// skipped.
    #[serde(default)]
    pub alarm_destinations: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub charts: BTreeMap<String, ChartRule>,
    #[serde(default)]
    pub create_service_dashboard: bool,
    /// Suffix of the snapshot object key for this service.
    pub s3_suffix: String,
}

impl ServiceDefinition {
    /// Naming scope shared by every alarm and dashboard of this service.
    pub fn alarm_scope(&self) -> String {
        format!("{}_{}", self.alarm_prefix, self.service)
    }

    pub fn snapshot_key(&self) -> String {
        format!("{}_{}.json", self.service, self.s3_suffix)
    }
}

/// One pagination filter predicate passed through to the discovery listing.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceFilter {
    pub name: String,
    pub values: Vec<String>,
}

/// Threshold-based monitoring check template, applied per instance.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct AlarmRule {
    pub metric_name: String,
    pub namespace: String,
    pub alarm_description: String,
    pub statistic: String,
    pub period: i32,
    pub threshold: f64,
    pub comparison_operator: String,
    pub evaluation_periods: i32,
    /// Severity name, resolved through AlarmDestinations.
    pub alarm_action: String,
    #[serde(rename = "send_ok")]
    pub send_ok: bool,
}

/// Visualization template, applied per instance to produce one widget.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ChartRule {
    pub ch_type: String,
    pub is_alarm: bool,
    pub metric_list: MetricList,
    pub period: i32,
    pub view: String,
    pub stacked: bool,
    /// Aggregation statistic, metric charts only.
    #[serde(default)]
    pub stat: Option<String>,
    /// Dot-separated attribute path to the availability zone, metric charts
    /// only. Resolved with a plain key lookup, never evaluated.
    #[serde(default)]
    pub avail: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(untagged)]
pub enum MetricList {
    /// Metric names matched against existing alarms (alarm-annotation charts).
    Names(Vec<String>),
    /// Metric tuples completed with the instance dimension value (metric charts).
    Tuples(Vec<Vec<String>>),
}
