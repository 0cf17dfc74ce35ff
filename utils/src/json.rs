use serde_json::Value;

// Resolves a dot-separated key path against a nested JSON value.
// Example: lookup_path(inst, "Placement.AvailabilityZone")
// Plain key lookups only; a missing key anywhere along the path yields None.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for key in path.split('.') {
        current = current.get(key)?;
    }
    Some(current)
}

pub fn lookup_path_str<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    lookup_path(value, path).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_lookup_path() {
        let inst = json!({
            "InstanceId": "i-0abc",
            "Placement": {"AvailabilityZone": "us-east-1a"}
        });
        assert_eq!(
            lookup_path_str(&inst, "Placement.AvailabilityZone"),
            Some("us-east-1a")
        );
        assert_eq!(lookup_path_str(&inst, "InstanceId"), Some("i-0abc"));
        assert_eq!(lookup_path(&inst, "Placement.Tenancy"), None);
        assert_eq!(lookup_path(&inst, "Missing.Key"), None);
    }

    #[test]
    fn test_lookup_path_non_string_leaf() {
        let inst = json!({"Memory": {"SizeMiB": 2048}});
        assert_eq!(lookup_path(&inst, "Memory.SizeMiB"), Some(&json!(2048)));
        assert_eq!(lookup_path_str(&inst, "Memory.SizeMiB"), None);
    }
}
