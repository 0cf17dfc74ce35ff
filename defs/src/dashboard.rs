use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A positioned dashboard widget. Serializes directly into the dashboard
/// body the provider expects.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Widget {
    #[serde(rename = "type")]
    pub widget_type: String,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub properties: Value,
}

/// One dashboard as returned by the prefix-scoped listing.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardEntry {
    pub dashboard_name: String,
}
