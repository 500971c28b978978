//! # Rule Catalog
//!
//! ## Invariants
//!
//! - The category map always has exactly the four [`RuleCategory`] keys.
//! - A rule code appears at most once across all categories (enforced by
//!   [`parse_rules_feed`]).
//! - The selection set is independent of the catalog contents. Selecting a
//!   code the catalog does not hold is allowed; such codes are kept locally
//!   and left out of [`RuleCatalog::snapshot_for_persist`].

use std::collections::BTreeSet;

use ccr_core::{Rule, RuleCategory, Severity};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::feed::{empty_categories, parse_rules_feed, CategoryMap};
use crate::persist::{RuleActivation, RuleEdit};

/// Rules grouped by category plus the reviewer's active-rule selection.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    categories: CategoryMap,
    selected: BTreeSet<String>,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleCatalog {
    /// An empty catalog with nothing selected.
    pub fn new() -> Self {
        Self {
            categories: empty_categories(),
            selected: BTreeSet::new(),
        }
    }

    /// Rebuild the catalog from a rules feed. The previous rules are
    /// discarded; the selection set is kept.
    pub fn replace_from(&mut self, feed: &Value) {
        self.categories = parse_rules_feed(feed);
        tracing::debug!(
            total = self.count_total(),
            selected = self.count_selected(),
            "rule catalog replaced"
        );
    }

    /// Empty every category. The selection set is kept.
    pub fn clear_rules(&mut self) {
        self.categories = empty_categories();
    }

    /// Rules in `category`, in feed order.
    pub fn rules(&self, category: RuleCategory) -> &[Rule] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate every `(category, rule)` pair in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleCategory, &Rule)> {
        self.categories
            .iter()
            .flat_map(|(c, rules)| rules.iter().map(move |r| (*c, r)))
    }

    /// Look a rule up by code.
    pub fn get(&self, code: &str) -> Option<&Rule> {
        self.iter().map(|(_, r)| r).find(|r| r.code == code)
    }

    /// Category holding `code`, if any.
    pub fn category_of(&self, code: &str) -> Option<RuleCategory> {
        self.iter().find(|(_, r)| r.code == code).map(|(c, _)| c)
    }

    fn rule_mut(&mut self, code: &str) -> Option<&mut Rule> {
        self.categories
            .values_mut()
            .flat_map(|rules| rules.iter_mut())
            .find(|r| r.code == code)
    }

    /// Replace a rule's description. Returns `false` when no rule has
    /// `code`. Report comments do not read descriptions from here.
    pub fn set_description(&mut self, code: &str, description: impl Into<String>) -> bool {
        match self.rule_mut(code) {
            Some(rule) => {
                rule.description = description.into();
                true
            }
            None => false,
        }
    }

    /// Replace a rule's severity. Returns `false` when no rule has `code`.
    pub fn set_severity(&mut self, code: &str, severity: Severity) -> bool {
        match self.rule_mut(code) {
            Some(rule) => {
                rule.severity = severity;
                true
            }
            None => false,
        }
    }

    /// Full definition of one rule as `PUT /rules/{code}` expects it after
    /// an edit. The active flag follows the selection set.
    pub fn edit_for_persist(
        &self,
        code: &str,
        modified_by: &str,
        last_modified: DateTime<Utc>,
    ) -> Option<RuleEdit> {
        self.get(code).map(|rule| RuleEdit {
            code: rule.code.clone(),
            description: rule.description.clone(),
            severity: rule.severity,
            active: self.is_selected(code),
            modified_by: modified_by.to_string(),
            last_modified,
        })
    }

    /// Flip `code` in the selection set. Any string is accepted.
    pub fn toggle(&mut self, code: &str) {
        if !self.selected.remove(code) {
            self.selected.insert(code.to_string());
        }
    }

    /// Add every code currently in `category` to the selection set.
    pub fn select_all(&mut self, category: RuleCategory) {
        let codes: Vec<String> = self.rules(category).iter().map(|r| r.code.clone()).collect();
        self.selected.extend(codes);
    }

    /// Remove every code currently in `category` from the selection set.
    pub fn deselect_all(&mut self, category: RuleCategory) {
        if let Some(rules) = self.categories.get(&category) {
            for rule in rules {
                self.selected.remove(&rule.code);
            }
        }
    }

    pub fn is_selected(&self, code: &str) -> bool {
        self.selected.contains(code)
    }

    /// Number of catalog rules that are selected. Selected codes with no
    /// catalog entry are not counted.
    pub fn count_selected(&self) -> usize {
        self.iter().filter(|(_, r)| self.is_selected(&r.code)).count()
    }

    /// Number of rules across all categories.
    pub fn count_total(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// `count_total() - count_selected()`.
    pub fn inactive_count(&self) -> usize {
        self.count_total() - self.count_selected()
    }

    /// `(selected, total)` for one category.
    pub fn category_counts(&self, category: RuleCategory) -> (usize, usize) {
        let rules = self.rules(category);
        let selected = rules.iter().filter(|r| self.is_selected(&r.code)).count();
        (selected, rules.len())
    }

    /// The raw selection set, including forward references.
    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selected
    }

    /// Replace the selection set wholesale (used when restoring a session).
    pub fn set_selection<I, S>(&mut self, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = codes.into_iter().map(Into::into).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// One `(code, active)` pair per catalog rule, in catalog order. This
    /// is the payload pushed to the rules service on save.
    pub fn snapshot_for_persist(&self) -> Vec<RuleActivation> {
        self.iter()
            .map(|(_, r)| RuleActivation {
                code: r.code.clone(),
                active: self.is_selected(&r.code),
            })
            .collect()
    }

    /// Number of categories. Always [`RuleCategory::COUNT`].
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}
