use std::collections::HashMap;

use fw_defs::Instance;

/// Computes the symmetric delta between the discovered instances and the
/// previous snapshot, keyed by identity. Identity equality drives the delta;
/// attribute drift on an instance present in both sets is invisible here.
///
/// A missing snapshot is the distinguished first-run state: nothing removed,
/// everything added. Duplicate identities within one side collapse (last
/// write wins); the resolver keeps identities unique in practice by
/// suffixing the dimension value, but the uniqueness policy is configurable.
///
/// Result ordering is unspecified; callers must not depend on it.
pub fn determine_deltas(
    current: Vec<Instance>,
    previous: Option<Vec<Instance>>,
) -> (Option<Vec<Instance>>, Vec<Instance>) {
    let previous = match previous {
        Some(previous) => previous,
        None => return (None, current),
    };

    let current_by_id: HashMap<&str, &Instance> = current
        .iter()
        .map(|inst| (inst.identity.as_str(), inst))
        .collect();
    let previous_by_id: HashMap<&str, &Instance> = previous
        .iter()
        .map(|inst| (inst.identity.as_str(), inst))
        .collect();

    let added = current_by_id
        .iter()
        .filter(|(id, _)| !previous_by_id.contains_key(*id))
        .map(|(_, inst)| (*inst).clone())
        .collect();
    let removed = previous_by_id
        .iter()
        .filter(|(id, _)| !current_by_id.contains_key(*id))
        .map(|(_, inst)| (*inst).clone())
        .collect();

    (Some(removed), added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn inst(identity: &str) -> Instance {
        Instance::new(identity.to_string(), json!({"InstanceId": identity}))
    }

    fn identities(mut instances: Vec<Instance>) -> Vec<String> {
        let mut ids: Vec<String> = instances.drain(..).map(|i| i.identity).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_first_run_is_all_added_nothing_removed() {
        let current = vec![inst("a"), inst("b")];
        let (removed, added) = determine_deltas(current.clone(), None);
        assert_eq!(removed, None);
        assert_eq!(added, current);
    }

    #[test]
    fn test_added_and_removed_are_disjoint_from_other_side() {
        let current = vec![inst("a"), inst("b"), inst("c")];
        let previous = vec![inst("b"), inst("c"), inst("d")];
        let (removed, added) = determine_deltas(current, Some(previous));
        assert_eq!(identities(added), vec!["a"]);
        assert_eq!(identities(removed.unwrap()), vec!["d"]);
    }

    #[test]
    fn test_no_change_yields_empty_sets() {
        let current = vec![inst("a"), inst("b")];
        let (removed, added) = determine_deltas(current.clone(), Some(current));
        assert_eq!(removed, Some(vec![]));
        assert!(added.is_empty());
    }

    #[test]
    fn test_attribute_drift_is_not_a_delta() {
        let current = vec![Instance::new("a".into(), json!({"State": "running"}))];
        let previous = vec![Instance::new("a".into(), json!({"State": "stopped"}))];
        let (removed, added) = determine_deltas(current, Some(previous));
        assert_eq!(removed, Some(vec![]));
        assert!(added.is_empty());
    }

    #[test]
    fn test_diff_is_idempotent_and_order_independent() {
        let current = vec![inst("a"), inst("b"), inst("c")];
        let previous = vec![inst("c"), inst("d")];
        let (removed1, added1) = determine_deltas(current.clone(), Some(previous.clone()));
        let reversed: Vec<Instance> = current.iter().rev().cloned().collect();
        let (removed2, added2) = determine_deltas(reversed, Some(previous));
        assert_eq!(identities(added1), identities(added2));
        assert_eq!(identities(removed1.unwrap()), identities(removed2.unwrap()));
    }

    #[test]
    fn test_duplicate_identities_collapse() {
        let current = vec![
            Instance::new("a".into(), json!({"n": 1})),
            Instance::new("a".into(), json!({"n": 2})),
        ];
        let (removed, added) = determine_deltas(current, None);
        assert_eq!(removed, None);
        // First-run passthrough keeps both; a keyed diff collapses them.
        assert_eq!(added.len(), 2);

        let current = vec![
            Instance::new("a".into(), json!({"n": 1})),
            Instance::new("a".into(), json!({"n": 2})),
        ];
        let (removed, added) = determine_deltas(current, Some(vec![]));
        assert_eq!(removed, Some(vec![]));
        assert_eq!(added.len(), 1);
    }
}
