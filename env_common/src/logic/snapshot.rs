use log::warn;

use fw_defs::{Instance, SnapshotStore};

/// Loads the previous run's instance snapshot. A missing key is a normal
/// first-run condition and yields None; so does a payload that no longer
/// parses, matching the recovery posture of config loading.
pub async fn load_instances(
    store: &dyn SnapshotStore,
    bucket: &str,
    key: &str,
) -> Result<Option<Vec<Instance>>, anyhow::Error> {
    let body = match store.get(bucket, key).await? {
        Some(body) => body,
        None => return Ok(None),
    };
    match serde_json::from_slice(&body) {
        Ok(instances) => Ok(Some(instances)),
        Err(e) => {
            warn!("Discarding unparseable snapshot {}/{}: {}", bucket, key, e);
            Ok(None)
        }
    }
}

/// Overwrites the snapshot with the full current instance list (not just the
/// delta) and returns the store's status code.
pub async fn save_instances(
    store: &dyn SnapshotStore,
    instances: &[Instance],
    bucket: &str,
    key: &str,
) -> Result<u16, anyhow::Error> {
    let body = serde_json::to_vec(instances)?;
    store.put(bucket, key, body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::testutil::FakeSnapshotStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_snapshot_is_none() {
        let store = FakeSnapshotStore::default();
        let loaded = load_instances(&store, "bucket", "ec2_inst.json")
            .await
            .unwrap();
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = FakeSnapshotStore::default();
        let instances = vec![
            Instance::new("fleetwatch_ec2_i-1".into(), json!({"InstanceId": "i-1"})),
            Instance::new("fleetwatch_ec2_i-2".into(), json!({"InstanceId": "i-2"})),
        ];
        let status = save_instances(&store, &instances, "bucket", "ec2_inst.json")
            .await
            .unwrap();
        assert_eq!(status, 200);

        let loaded = load_instances(&store, "bucket", "ec2_inst.json")
            .await
            .unwrap();
        assert_eq!(loaded, Some(instances));
    }

    #[tokio::test]
    async fn test_unparseable_snapshot_is_none() {
        let store = FakeSnapshotStore::default();
        store
            .put("bucket", "ec2_inst.json", b"not json".to_vec())
            .await
            .unwrap();
        let loaded = load_instances(&store, "bucket", "ec2_inst.json")
            .await
            .unwrap();
        assert_eq!(loaded, None);
    }
}
