use serde_json::Value;

use fw_defs::{DiscoveryClient, ServiceDefinition};

/// Flattens one discovery response page. The results may be nested zero, one,
/// or two collection levels deep depending on the service, so the unwrap path
/// comes from the monitor definition.
pub fn parse_service_page(page: &Value, iter1: Option<&str>, iter2: Option<&str>) -> Vec<Value> {
    let mut instances = vec![];
    match (iter1, iter2) {
        (Some(outer), Some(inner)) => {
            // Two levels of lists
            for entry in page.get(outer).and_then(Value::as_array).unwrap_or(&vec![]) {
                for inst in entry.get(inner).and_then(Value::as_array).unwrap_or(&vec![]) {
                    instances.push(inst.clone());
                }
            }
        }
        (Some(outer), None) => {
            for inst in page.get(outer).and_then(Value::as_array).unwrap_or(&vec![]) {
                instances.push(inst.clone());
            }
        }
        _ => {
            if let Some(list) = page.as_array() {
                instances = list.clone();
            }
        }
    }
    instances
}

/// Retrieves every instance of the given service, flattening the provider's
/// response structure when necessary.
pub async fn get_service_instances(
    client: &dyn DiscoveryClient,
    svc_info: &ServiceDefinition,
) -> Result<Vec<Value>, anyhow::Error> {
    let pages = client
        .discover_pages(&svc_info.discover_instance, &svc_info.instance_filters)
        .await?;

    let mut instances = vec![];
    for page in &pages {
        instances.extend(parse_service_page(
            page,
            svc_info.instance_iterator1.as_deref(),
            svc_info.instance_iterator2.as_deref(),
        ));
    }
    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_two_level_page() {
        let page = json!({
            "Reservations": [
                {"Instances": [{"InstanceId": "i-1"}, {"InstanceId": "i-2"}]},
                {"Instances": [{"InstanceId": "i-3"}]}
            ]
        });
        let instances = parse_service_page(&page, Some("Reservations"), Some("Instances"));
        assert_eq!(instances.len(), 3);
        assert_eq!(instances[2]["InstanceId"], "i-3");
    }

    #[test]
    fn test_parse_one_level_page() {
        let page = json!({"DBInstances": [{"DBInstanceIdentifier": "db-1"}]});
        let instances = parse_service_page(&page, Some("DBInstances"), None);
        assert_eq!(instances.len(), 1);
    }

    #[test]
    fn test_parse_flat_page() {
        let page = json!([{"Name": "a"}, {"Name": "b"}]);
        let instances = parse_service_page(&page, None, None);
        assert_eq!(instances.len(), 2);
    }

    #[test]
    fn test_parse_missing_key_is_empty() {
        let page = json!({"Unexpected": []});
        assert!(parse_service_page(&page, Some("Reservations"), Some("Instances")).is_empty());
    }
}
