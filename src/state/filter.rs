use super::key::decode_key;
use super::types::StateMap;

/// Drop every key whose raw or decoded form contains `exclude`.
///
/// Matching is a case-sensitive substring test; an empty pattern keeps
/// everything.
pub fn filter_state(files: StateMap, exclude: &str) -> StateMap {
    if exclude.is_empty() {
        return files;
    }

    files
        .into_iter()
        .filter(|(key, _)| !key.contains(exclude) && !decode_key(key).contains(exclude))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StateMap {
        [
            ("index%%html", "1"),
            ("assets/app%%js", "2"),
            ("assets/app%%js%%map", "3"),
            ("Maps/readme%%txt", "4"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_empty_pattern_keeps_everything() {
        assert_eq!(filter_state(sample(), ""), sample());
    }

    #[test]
    fn test_raw_substring() {
        let filtered = filter_state(sample(), "assets/");
        assert_eq!(filtered.len(), 2);
        assert!(filtered.contains_key("index%%html"));
        assert!(filtered.contains_key("Maps/readme%%txt"));
    }

    #[test]
    fn test_decoded_substring() {
        let filtered = filter_state(sample(), ".map");
        assert_eq!(filtered.len(), 3);
        assert!(!filtered.contains_key("assets/app%%js%%map"));
    }

    #[test]
    fn test_case_sensitive() {
        let filtered = filter_state(sample(), "maps");
        assert_eq!(filtered, sample());
    }
}
