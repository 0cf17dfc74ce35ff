use log::warn;
use serde_json::Value;

use fw_defs::{DiscoveryClient, ServiceDefinition};

/// Hard cap on a derived identity. Alarm and dashboard names built from the
/// identity must stay within the provider's name length limits.
pub const MAX_IDENTITY_LEN: usize = 253;

/// Looks up one tag value on a discovered instance. Some services embed tags
/// in the discovery response; others need a secondary per-resource call. A
/// missing tag is an empty string, not an error.
pub async fn get_instance_tag_value(
    client: &dyn DiscoveryClient,
    svc_info: &ServiceDefinition,
    instance: &Value,
    tag_key: &str,
) -> String {
    if let Some(operation) = &svc_info.discover_tags {
        let parm = match &svc_info.discover_tags_inst_parm {
            Some(parm) => parm,
            None => {
                warn!(
                    "DiscoverTags set without DiscoverTagsInstParm for service {}",
                    svc_info.service
                );
                return String::new();
            }
        };
        let resource_ref = match instance.get(parm).and_then(Value::as_str) {
            Some(resource_ref) => resource_ref,
            None => {
                warn!("Instance has no {} attribute for tag lookup", parm);
                return String::new();
            }
        };
        match client.lookup_tags(operation, resource_ref).await {
            Ok(tags) => tags
                .into_iter()
                .find(|t| t.key == tag_key)
                .map(|t| t.value)
                .unwrap_or_default(),
            Err(e) => {
                warn!("Tag lookup failed for {}: {}", resource_ref, e);
                String::new()
            }
        }
    } else {
        let container = svc_info.tags_key.as_deref().unwrap_or("Tags");
        instance
            .get(container)
            .and_then(Value::as_array)
            .and_then(|tags| {
                tags.iter()
                    .find(|t| t.get("Key").and_then(Value::as_str) == Some(tag_key))
            })
            .and_then(|t| t.get("Value").and_then(Value::as_str))
            .unwrap_or_default()
            .to_string()
    }
}

/// Derives the stable identity used to name this instance's alarms and
/// widgets: `{AlarmPrefix}_{Service}`, plus the friendly-name tag value when
/// one is configured and present, plus the dimension value when the friendly
/// value is empty or the uniqueness policy demands it. The friendly value is
/// clipped so the finished identity never exceeds MAX_IDENTITY_LEN.
pub async fn create_friendly_name(
    client: &dyn DiscoveryClient,
    svc_info: &ServiceDefinition,
    instance: &Value,
    dim_value: &str,
) -> String {
    let mut name = svc_info.alarm_scope();

    let friendly = match &svc_info.friendly_name {
        Some(tag_key) => get_instance_tag_value(client, svc_info, instance, tag_key).await,
        None => String::new(),
    };

    let append_dim = friendly.is_empty() || svc_info.ensure_unique_name;

    if !friendly.is_empty() {
        let reserved = if append_dim {
            dim_value.chars().count() + 1
        } else {
            0
        };
        let room = MAX_IDENTITY_LEN.saturating_sub(name.chars().count() + 1 + reserved);
        name.push('_');
        name.extend(friendly.chars().take(room));
    }

    if append_dim {
        name.push('_');
        name.push_str(dim_value);
    }

    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::testutil::FakeDiscovery;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn svc(friendly: Option<&str>, unique: bool) -> ServiceDefinition {
        serde_json::from_value(json!({
            "Service": "ec2",
            "DiscoverInstance": "describe_instances",
            "AlarmDimName": "InstanceId",
            "TagsKey": "Tags",
            "FriendlyName": friendly,
            "EnsureUniqueName": unique,
            "AlarmPrefix": "fleetwatch",
            "S3Suffix": "inst"
        }))
        .unwrap()
    }

    fn tagged_instance(name: &str) -> Value {
        json!({
            "InstanceId": "i-0abc",
            "Tags": [{"Key": "Name", "Value": name}, {"Key": "Env", "Value": "prod"}]
        })
    }

    #[tokio::test]
    async fn test_embedded_tag_value() {
        let client = FakeDiscovery::default();
        let inst = tagged_instance("web-frontend");
        let value = get_instance_tag_value(&client, &svc(Some("Name"), true), &inst, "Name").await;
        assert_eq!(value, "web-frontend");
    }

    #[tokio::test]
    async fn test_missing_tag_is_empty() {
        let client = FakeDiscovery::default();
        let inst = json!({"InstanceId": "i-0abc", "Tags": []});
        let value = get_instance_tag_value(&client, &svc(Some("Name"), true), &inst, "Name").await;
        assert_eq!(value, "");
    }

    #[tokio::test]
    async fn test_secondary_tag_lookup() {
        let client = FakeDiscovery::default().with_tags(
            "arn:aws:rds:us-east-1:1:db:orders",
            vec![("Name", "orders-db")],
        );
        let svc: ServiceDefinition = serde_json::from_value(json!({
            "Service": "rds",
            "DiscoverInstance": "describe_db_instances",
            "AlarmDimName": "DBInstanceIdentifier",
            "DiscoverTags": "list_tags_for_resource",
            "DiscoverTagsInstParm": "DBInstanceArn",
            "FriendlyName": "Name",
            "AlarmPrefix": "fleetwatch",
            "S3Suffix": "db"
        }))
        .unwrap();
        let inst = json!({
            "DBInstanceIdentifier": "orders",
            "DBInstanceArn": "arn:aws:rds:us-east-1:1:db:orders"
        });
        let value = get_instance_tag_value(&client, &svc, &inst, "Name").await;
        assert_eq!(value, "orders-db");
    }

    #[tokio::test]
    async fn test_identity_with_friendly_name_and_unique_policy() {
        let client = FakeDiscovery::default();
        let inst = tagged_instance("web-frontend");
        let name = create_friendly_name(&client, &svc(Some("Name"), true), &inst, "i-0abc").await;
        assert_eq!(name, "fleetwatch_ec2_web-frontend_i-0abc");
    }

    #[tokio::test]
    async fn test_identity_without_unique_policy_omits_dimension() {
        let client = FakeDiscovery::default();
        let inst = tagged_instance("web-frontend");
        let name = create_friendly_name(&client, &svc(Some("Name"), false), &inst, "i-0abc").await;
        assert_eq!(name, "fleetwatch_ec2_web-frontend");
    }

    #[tokio::test]
    async fn test_identity_falls_back_to_dimension() {
        let client = FakeDiscovery::default();
        let inst = json!({"InstanceId": "i-0abc", "Tags": []});
        let name = create_friendly_name(&client, &svc(Some("Name"), false), &inst, "i-0abc").await;
        assert_eq!(name, "fleetwatch_ec2_i-0abc");
    }

    #[tokio::test]
    async fn test_identity_never_exceeds_cap() {
        let client = FakeDiscovery::default();
        let long_name = "x".repeat(400);
        let inst = tagged_instance(&long_name);
        let name = create_friendly_name(&client, &svc(Some("Name"), true), &inst, "i-0abc").await;
        assert_eq!(name.chars().count(), MAX_IDENTITY_LEN);
        assert!(name.ends_with("_i-0abc"));

        let name = create_friendly_name(&client, &svc(Some("Name"), false), &inst, "i-0abc").await;
        assert_eq!(name.chars().count(), MAX_IDENTITY_LEN);
    }

    #[tokio::test]
    async fn test_identity_is_deterministic() {
        let client = FakeDiscovery::default();
        let inst = tagged_instance("web-frontend");
        let svc_info = svc(Some("Name"), true);
        let first = create_friendly_name(&client, &svc_info, &inst, "i-0abc").await;
        let second = create_friendly_name(&client, &svc_info, &inst, "i-0abc").await;
        assert_eq!(first, second);
    }
}
