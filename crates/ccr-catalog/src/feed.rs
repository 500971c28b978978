//! # Rules Feed Parsing
//!
//! Turns the body of `GET /rules` into a category map. Parsing never
//! fails: anything malformed degrades to empty categories so the catalog
//! always holds exactly the four fixed categories.
//!
//! ```text
//! { "rules": { "identification": [ { "code", "desc", "severity", "logic"? } ], ... } }
//! ```

use std::collections::{BTreeMap, HashMap};

use ccr_core::{Rule, RuleCategory, Severity};
use serde_json::Value;

/// Category map with an entry for every [`RuleCategory`].
pub type CategoryMap = BTreeMap<RuleCategory, Vec<Rule>>;

/// A category map with all four categories empty.
pub fn empty_categories() -> CategoryMap {
    RuleCategory::all().iter().map(|c| (*c, Vec::new())).collect()
}

/// Parse a rules feed.
///
/// - Missing or non-object `rules` yields four empty categories.
/// - Keys that are not one of the four categories are logged and dropped.
/// - A category whose value is not an array is empty.
/// - Descriptors without a string `code` are dropped.
/// - `desc` defaults to the empty string, `logic` to `{}`.
/// - A missing or unrecognized `severity` becomes [`Severity::Minor`],
///   the value the rules service itself falls back to.
/// - A code seen more than once keeps only its last occurrence (feed order:
///   categories in [`RuleCategory::all`] order, descriptors in array order).
pub fn parse_rules_feed(feed: &Value) -> CategoryMap {
    let mut categories = empty_categories();

    let Some(rules) = feed.get("rules").and_then(Value::as_object) else {
        tracing::warn!("rules feed has no `rules` object, using empty catalog");
        return categories;
    };

    for key in rules.keys() {
        if key.parse::<RuleCategory>().is_err() {
            tracing::warn!(category = %key, "rules feed references unknown category, skipping");
        }
    }

    let mut seen: HashMap<String, RuleCategory> = HashMap::new();
    for category in RuleCategory::all() {
        let Some(raw) = rules.get(category.as_str()) else {
            continue;
        };
        let Some(descriptors) = raw.as_array() else {
            tracing::warn!(category = %category, "category is not a list, leaving it empty");
            continue;
        };

        for (index, descriptor) in descriptors.iter().enumerate() {
            let Some(rule) = parse_descriptor(descriptor) else {
                tracing::warn!(category = %category, index, "dropping rule descriptor without a code");
                continue;
            };

            if let Some(previous) = seen.insert(rule.code.clone(), *category) {
                tracing::warn!(
                    code = %rule.code,
                    previous = %previous,
                    category = %category,
                    "duplicate rule code in feed, keeping the later entry"
                );
                if let Some(bucket) = categories.get_mut(&previous) {
                    bucket.retain(|r| r.code != rule.code);
                }
            }

            if let Some(bucket) = categories.get_mut(category) {
                bucket.push(rule);
            }
        }
        tracing::debug!(category = %category, count = categories[category].len(), "loaded category");
    }

    categories
}

fn parse_descriptor(value: &Value) -> Option<Rule> {
    let obj = value.as_object()?;
    let code = obj.get("code")?.as_str()?.to_string();
    let description = obj
        .get("desc")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let severity = match obj.get("severity").and_then(Value::as_str) {
        Some(raw) => raw.parse::<Severity>().unwrap_or_else(|_| {
            tracing::warn!(code = %code, severity = %raw, "unrecognized severity, using minor");
            Severity::Minor
        }),
        None => Severity::Minor,
    };

    let logic = match obj.get("logic") {
        None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
        Some(other) => other.clone(),
    };

    Some(Rule {
        code,
        description,
        severity,
        logic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codes(map: &CategoryMap, c: RuleCategory) -> Vec<&str> {
        map[&c].iter().map(|r| r.code.as_str()).collect()
    }

    #[test]
    fn parses_well_formed_feed() {
        let map = parse_rules_feed(&json!({
            "rules": {
                "identification": [
                    {"code": "LO1001.03", "desc": "first/last name in MA", "severity": "major"},
                    {"code": "LO1001.06", "desc": "did not state name", "severity": "major",
                     "logic": {"requires": ["agent_name"]}}
                ],
                "communication": [
                    {"code": "LO1005.02", "desc": "third party disclosure", "severity": "moderate"}
                ],
                "policy": [],
                "system": [{"code": "LO1009.01", "desc": "activity code", "severity": "minor"}]
            }
        }));
        assert_eq!(map.len(), 4);
        assert_eq!(codes(&map, RuleCategory::Identification), ["LO1001.03", "LO1001.06"]);
        assert_eq!(map[&RuleCategory::Identification][0].logic, json!({}));
        assert_eq!(
            map[&RuleCategory::Identification][1].logic,
            json!({"requires": ["agent_name"]})
        );
        assert_eq!(map[&RuleCategory::Communication][0].severity, Severity::Moderate);
        assert!(map[&RuleCategory::Policy].is_empty());
    }

    #[test]
    fn missing_or_malformed_rules_gives_four_empty_categories() {
        for feed in [
            json!({}),
            json!({"rules": null}),
            json!({"rules": []}),
            json!({"rules": "x"}),
            json!([1, 2]),
            json!(null),
        ] {
            let map = parse_rules_feed(&feed);
            assert_eq!(map.len(), 4);
            assert!(map.values().all(Vec::is_empty));
        }
    }

    #[test]
    fn unknown_categories_are_dropped() {
        let map = parse_rules_feed(&json!({
            "rules": {
                "billing": [{"code": "B1", "desc": "x", "severity": "major"}],
                "policy": [{"code": "LO1006.01", "desc": "cure period", "severity": "major"}]
            }
        }));
        assert_eq!(map.len(), 4);
        assert_eq!(map.values().map(Vec::len).sum::<usize>(), 1);
    }

    #[test]
    fn non_list_category_is_empty() {
        let map = parse_rules_feed(&json!({
            "rules": {
                "identification": {"code": "LO1001.03"},
                "system": [{"code": "LO1009.01", "severity": "minor"}]
            }
        }));
        assert!(map[&RuleCategory::Identification].is_empty());
        assert_eq!(codes(&map, RuleCategory::System), ["LO1009.01"]);
        assert_eq!(map[&RuleCategory::System][0].description, "");
    }

    #[test]
    fn descriptors_without_code_are_dropped() {
        let map = parse_rules_feed(&json!({
            "rules": {"policy": [
                {"desc": "no code", "severity": "major"},
                {"code": 17, "severity": "major"},
                "LO1006.02",
                {"code": "LO1007.01", "desc": "threats", "severity": "major"}
            ]}
        }));
        assert_eq!(codes(&map, RuleCategory::Policy), ["LO1007.01"]);
    }

    #[test]
    fn unknown_severity_falls_back_to_minor() {
        let map = parse_rules_feed(&json!({
            "rules": {"system": [
                {"code": "A", "severity": "critical"},
                {"code": "B"}
            ]}
        }));
        assert!(map[&RuleCategory::System].iter().all(|r| r.severity == Severity::Minor));
    }

    #[test]
    fn duplicate_codes_keep_last_occurrence() {
        let map = parse_rules_feed(&json!({
            "rules": {
                "identification": [
                    {"code": "DUP", "desc": "first", "severity": "major"},
                    {"code": "X1", "desc": "x", "severity": "minor"},
                    {"code": "DUP", "desc": "second", "severity": "moderate"}
                ],
                "system": [
                    {"code": "DUP", "desc": "third", "severity": "minor"}
                ]
            }
        }));
        assert_eq!(codes(&map, RuleCategory::Identification), ["X1"]);
        assert_eq!(codes(&map, RuleCategory::System), ["DUP"]);
        assert_eq!(map[&RuleCategory::System][0].description, "third");
    }

    #[test]
    fn duplicate_within_category_moves_to_later_position() {
        let map = parse_rules_feed(&json!({
            "rules": {"communication": [
                {"code": "A", "desc": "a1", "severity": "minor"},
                {"code": "B", "desc": "b", "severity": "minor"},
                {"code": "A", "desc": "a2", "severity": "minor"}
            ]}
        }));
        assert_eq!(codes(&map, RuleCategory::Communication), ["B", "A"]);
        assert_eq!(map[&RuleCategory::Communication][1].description, "a2");
    }
}
