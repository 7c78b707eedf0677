use crate::state::StateMap;
use std::collections::BTreeSet;

/// Keys to upload and keys to remove for one apply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationPlan {
    /// Every desired key, changed or not
    pub to_put: BTreeSet<String>,

    /// Keys recorded previously that are no longer desired
    pub to_delete: BTreeSet<String>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.to_put.is_empty() && self.to_delete.is_empty()
    }

    /// Desired keys whose fingerprint differs from the previous state
    pub fn changed<'a>(
        &'a self,
        previous: &'a StateMap,
        desired: &'a StateMap,
    ) -> impl Iterator<Item = &'a String> {
        self.to_put
            .iter()
            .filter(move |key| previous.get(*key) != desired.get(*key))
    }
}

/// Compare the previous state with the desired one.
///
/// All desired keys are re-uploaded, even when their fingerprints match.
pub fn build_reconciliation_plan(previous: &StateMap, desired: &StateMap) -> ReconciliationPlan {
    ReconciliationPlan {
        to_put: desired.keys().cloned().collect(),
        to_delete: previous
            .keys()
            .filter(|key| !desired.contains_key(*key))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> StateMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn set(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_unchanged_keys_are_still_put() {
        let previous = map(&[("a", "1"), ("b", "2")]);
        let desired = map(&[("b", "2"), ("c", "3")]);

        let plan = build_reconciliation_plan(&previous, &desired);
        assert_eq!(plan.to_put, set(&["b", "c"]));
        assert_eq!(plan.to_delete, set(&["a"]));

        let changed: Vec<_> = plan.changed(&previous, &desired).collect();
        assert_eq!(changed, vec!["c"]);
    }

    #[test]
    fn test_put_and_delete_are_disjoint() {
        let previous = map(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let desired = map(&[("b", "9"), ("d", "4")]);

        let plan = build_reconciliation_plan(&previous, &desired);
        assert!(plan.to_put.is_disjoint(&plan.to_delete));
        assert_eq!(plan.to_delete, set(&["a", "c"]));
    }

    #[test]
    fn test_empty_previous() {
        let plan = build_reconciliation_plan(&StateMap::new(), &map(&[("x", "1")]));
        assert_eq!(plan.to_put, set(&["x"]));
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn test_empty_desired_deletes_everything() {
        let plan = build_reconciliation_plan(&map(&[("x", "1")]), &StateMap::new());
        assert!(plan.to_put.is_empty());
        assert_eq!(plan.to_delete, set(&["x"]));
        assert!(!plan.is_empty());
        assert!(build_reconciliation_plan(&StateMap::new(), &StateMap::new()).is_empty());
    }
}
