use serde::{Deserialize, Serialize};

/// Team-level configuration, loaded from team.json in the monitor
/// definitions directory. Lists the service definition files to process and
/// carries the team-wide dashboard/report switches.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct TeamDefinition {
    pub team: String,
    /// Naming scope for the team dashboard. Team-level on purpose: the team
    /// dashboard name must not depend on any per-service state.
    pub team_prefix: String,
    pub monitor_defs: Vec<String>,
    /// Snapshot bucket shared by all of the team's services.
    pub bucket: String,
    #[serde(default)]
    pub create_team_dashboard: bool,
    #[serde(default)]
    pub send_report: bool,
}

impl TeamDefinition {
    pub fn dashboard_scope(&self) -> String {
        format!("{}_{}", self.team_prefix, self.team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_team_definition() {
        let team: TeamDefinition = serde_json::from_str(
            r#"{
                "Team": "platform",
                "TeamPrefix": "fleetwatch",
                "MonitorDefs": ["ec2.json", "rds.json"],
                "Bucket": "fleetwatch-snapshots",
                "CreateTeamDashboard": true,
                "SendReport": true
            }"#,
        )
        .unwrap();
        assert_eq!(team.monitor_defs.len(), 2);
        assert_eq!(team.dashboard_scope(), "fleetwatch_platform");
    }
}
