use log::warn;

use fw_defs::{Instance, NotificationApi};

/// Transport ceiling for a published report body.
pub const REPORT_MAX_BYTES: usize = 256 * 1024;

const TRUNCATION_MARKER: &str = "\n... report truncated ...";

/// Renders the delta into a human-readable status report. No change in
/// either direction means no report at all; a change in only one direction
/// still renders an explicit "none" line for the other.
pub fn format_report(
    total_count: usize,
    added: &[Instance],
    removed: Option<&[Instance]>,
    service_label: &str,
) -> Option<String> {
    let removed = removed.unwrap_or(&[]);
    if added.is_empty() && removed.is_empty() {
        return None;
    }

    let mut report = format!("Instance report for {}\n", service_label);
    report.push_str(&format!("Total instances monitored: {}\n", total_count));

    report.push_str("\nNew Instances:\n");
    if added.is_empty() {
        report.push_str("No new instances.\n");
    } else {
        for instance in added {
            report.push_str(&format!("  {}\n", instance.identity));
        }
    }

    report.push_str("\nDeleted Instances:\n");
    if removed.is_empty() {
        report.push_str("No deleted instances.\n");
    } else {
        for instance in removed {
            report.push_str(&format!("  {}\n", instance.identity));
        }
    }

    Some(report)
}

/// Publishes the report to the configured status topic, truncated to the
/// transport ceiling with a marker when the body was cut.
pub async fn send_report(
    api: &dyn NotificationApi,
    report: &str,
    topic_arn: &str,
    timestamp: &str,
) -> Result<String, anyhow::Error> {
    let body = if report.len() > REPORT_MAX_BYTES {
        warn!(
            "Report body of {} bytes exceeds the transport ceiling, truncating",
            report.len()
        );
        let mut cut = REPORT_MAX_BYTES - TRUNCATION_MARKER.len();
        while !report.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}{}", &report[..cut], TRUNCATION_MARKER)
    } else {
        report.to_string()
    };

    let subject = format!("Instance monitor report {}", timestamp);
    api.publish(topic_arn, &subject, &body).await
}
