use log::warn;
use serde_json::{json, Value};

use fw_defs::{
    AlarmRecord, ChartRule, DashboardApi, DashboardEntry, Instance, MetricList,
    ServiceDefinition, Widget,
};
use fw_utils::lookup_path_str;

/// Row wraps past this x coordinate.
pub const DASHBOARD_MAX_WIDTH: i64 = 16;
/// Provider limit on widgets per dashboard.
pub const DASHBOARD_MAX_WIDGET: usize = 50;

const WIDGET_WIDTH: i64 = 6;
const WIDGET_HEIGHT: i64 = 4;

fn format_widget_props(
    instance: &Instance,
    chart_name: &str,
    chart: &ChartRule,
    alarms: &[AlarmRecord],
    dim_value: &str,
) -> Value {
    let mut props = serde_json::Map::new();

    if chart.is_alarm {
        let metric_names: &[String] = match &chart.metric_list {
            MetricList::Names(names) => names.as_slice(),
            MetricList::Tuples(_) => {
                warn!(
                    "Chart {} is an alarm chart but lists metric tuples",
                    chart_name
                );
                &[]
            }
        };
        let mut arns = vec![];
        for alarm in alarms {
            if metric_names.contains(&alarm.metric_name)
                && alarm.dimensions.first().map(|d| d.value.as_str()) == Some(dim_value)
            {
                arns.push(alarm.alarm_arn.clone());
                // the provider supports one linked alarm per annotation
                break;
            }
        }
        props.insert("annotations".to_string(), json!({ "alarms": arns }));
    } else {
        let tuples: &[Vec<String>] = match &chart.metric_list {
            MetricList::Tuples(tuples) => tuples.as_slice(),
            MetricList::Names(_) => {
                warn!(
                    "Chart {} is a metric chart but lists bare metric names",
                    chart_name
                );
                &[]
            }
        };
        let metrics: Vec<Vec<String>> = tuples
            .iter()
            .map(|tuple| {
                let mut metric = tuple.clone();
                metric.push(dim_value.to_string());
                metric
            })
            .collect();
        props.insert("metrics".to_string(), json!(metrics));

        match chart
            .avail
            .as_deref()
            .and_then(|path| lookup_path_str(&instance.attributes, path))
        {
            Some(zone) => {
                // zone minus the zone letter is the region
                let region = &zone[..zone.len().saturating_sub(1)];
                props.insert("region".to_string(), json!(region));
            }
            None => {
                warn!(
                    "No availability zone at '{}' for {}, leaving chart region unset",
                    chart.avail.as_deref().unwrap_or(""),
                    instance.identity
                );
            }
        }
        if let Some(stat) = &chart.stat {
            props.insert("stat".to_string(), json!(stat));
        }
    }

    props.insert("period".to_string(), json!(chart.period));
    props.insert("view".to_string(), json!(chart.view));
    props.insert("stacked".to_string(), json!(chart.stacked));
    props.insert(
        "title".to_string(),
        json!(format!("{} {}", instance.identity, chart_name)),
    );
    Value::Object(props)
}

/// Builds one widget per (instance, chart rule) pair, laid out left-to-right
/// in 6x4 cells, wrapping past DASHBOARD_MAX_WIDTH. "singleValue" charts take
/// half a cell width (floor division).
pub fn build_dashboard_widgets(
    instances: &[Instance],
    alarms: &[AlarmRecord],
    svc_info: &ServiceDefinition,
) -> Vec<Widget> {
    let mut widgets = vec![];
    let mut x_val: i64 = 0;
    let mut y_val: i64 = 0;

    for instance in instances {
        for (chart_name, chart) in &svc_info.charts {
            let dim_value = instance
                .dimension_value(&svc_info.alarm_dim_name)
                .unwrap_or_default();

            let width = if chart.view == "singleValue" {
                WIDGET_WIDTH / 2
            } else {
                WIDGET_WIDTH
            };
            widgets.push(Widget {
                widget_type: chart.ch_type.clone(),
                x: x_val,
                y: y_val,
                width,
                height: WIDGET_HEIGHT,
                properties: format_widget_props(instance, chart_name, chart, alarms, dim_value),
            });

            // wrap to the next row, if necessary
            x_val += width;
            if x_val > DASHBOARD_MAX_WIDTH {
                x_val = 0;
                y_val += WIDGET_HEIGHT;
            }
        }
    }

    widgets
}

/// Pushes the widgets as dashboard pages of at most DASHBOARD_MAX_WIDGET,
/// named `{name}_{page}` (1-indexed), and returns the resulting dashboard
/// listing for the name.
pub async fn generate_dashboard(
    api: &dyn DashboardApi,
    name: &str,
    widgets: &[Widget],
) -> Result<Vec<DashboardEntry>, anyhow::Error> {
    for (page, chunk) in widgets.chunks(DASHBOARD_MAX_WIDGET).enumerate() {
        let dname = format!("{}_{}", name, page + 1);
        let body = json!({ "widgets": chunk });
        api.put_dashboard(&dname, &body).await?;
    }
    api.list_dashboards(name).await
}

/// Deletes every dashboard under the prefix. Run before regenerating so
/// stale pages never linger when the widget count shrinks between runs.
pub async fn clear_dashboards(api: &dyn DashboardApi, prefix: &str) -> Result<(), anyhow::Error> {
    let entries = api.list_dashboards(prefix).await?;
    let names: Vec<String> = entries.into_iter().map(|e| e.dashboard_name).collect();
    if !names.is_empty() {
        api.delete_dashboards(&names).await?;
    }
    Ok(())
}
