/// Outbound alarm description for the idempotent upsert call.
#[derive(Clone, Debug, PartialEq)]
pub struct AlarmSpec {
    pub alarm_name: String,
    pub metric_name: String,
    pub namespace: String,
    pub alarm_description: String,
    pub statistic: String,
    pub period: i32,
    pub threshold: f64,
    pub comparison_operator: String,
    pub evaluation_periods: i32,
    pub alarm_actions: Vec<String>,
    /// Empty unless the rule asks for an OK action.
    pub ok_actions: Vec<String>,
    pub dimensions: Vec<AlarmDimension>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlarmDimension {
    pub name: String,
    pub value: String,
}

/// One alarm as returned by the prefix-scoped listing.
#[derive(Clone, Debug, PartialEq)]
pub struct AlarmRecord {
    pub alarm_name: String,
    pub alarm_arn: String,
    pub metric_name: String,
    pub dimensions: Vec<AlarmDimension>,
}

/// A single page of a prefix-scoped alarm listing.
#[derive(Clone, Debug, Default)]
pub struct AlarmPage {
    pub alarms: Vec<AlarmRecord>,
    pub next_token: Option<String>,
}
