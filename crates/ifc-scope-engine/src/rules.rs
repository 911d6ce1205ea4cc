// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rule matching engine
//!
//! Evaluates a classification rule against every tree node of every loaded
//! model. A per-entity lookup failure counts as a non-match and is tallied;
//! it never aborts the run.

use crate::properties::PropertyResolver;
use crate::store::ModelSet;
use ifc_scope_model::{
    Classification, ClassificationRule, Condition, ConditionOp, ConditionValue, EntityRef,
    ModelGraph, ResolvedValue, Scalar, SpatialNode,
};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Result of applying one rule across the loaded models
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleOutcome {
    /// Entities satisfying every condition
    pub matched: BTreeSet<EntityRef>,
    /// Entities whose evaluation failed on a broken lookup
    pub failures: usize,
}

impl RuleOutcome {
    /// Replace a classification's member set wholesale
    pub fn assign_to(&self, classification: &mut Classification) {
        classification.assign(self.matched.clone());
    }
}

/// Apply a rule to every entity in every loaded model
///
/// Inactive rules match nothing. Conditions are AND-combined; a rule with no
/// conditions matches every entity.
pub fn apply_rule(rule: &ClassificationRule, models: &ModelSet) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();
    if !rule.active {
        return outcome;
    }

    for model in models.models() {
        let graph = model.graph.as_ref();
        let resolver = PropertyResolver::new(graph);
        for node in model.tree.iter() {
            match eval_node(rule, &resolver, graph, node) {
                Ok(true) => {
                    outcome.matched.insert(EntityRef::new(model.id, node.id));
                }
                Ok(false) => {}
                Err(detail) => {
                    trace!(entity = %node.id, detail = %detail, "rule evaluation failed");
                    outcome.failures += 1;
                }
            }
        }
    }

    debug!(
        rule = %rule.id,
        matched = outcome.matched.len(),
        failures = outcome.failures,
        "rule applied"
    );
    outcome
}

fn eval_node(
    rule: &ClassificationRule,
    resolver: &PropertyResolver<'_>,
    graph: &dyn ModelGraph,
    node: &SpatialNode,
) -> Result<bool, String> {
    for condition in &rule.conditions {
        if !eval_condition(condition, resolver, graph, node)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn eval_condition(
    condition: &Condition,
    resolver: &PropertyResolver<'_>,
    graph: &dyn ModelGraph,
    node: &SpatialNode,
) -> Result<bool, String> {
    match condition.property.as_str() {
        "ifcType" => Ok(compare_text(&node.type_tag, condition)),
        "name" => {
            // The tree caches names; fall back to a record fetch only when absent
            let name = match &node.name {
                Some(name) => name.clone(),
                None => graph
                    .get(node.id)
                    .ok_or_else(|| format!("record {} missing", node.id))?
                    .name()
                    .unwrap_or("")
                    .to_string(),
            };
            Ok(compare_text(&name, condition))
        }
        path => {
            let Some((group_name, prop_name)) = path.split_once('.') else {
                return Ok(false);
            };
            let Some(group) = resolver.resolve_group(node.id, group_name) else {
                return Ok(false);
            };
            match group.get(prop_name) {
                Some(value) => Ok(compare_value(value, condition)),
                None => Ok(false),
            }
        }
    }
}

fn eq_ci(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn compare_text(lhs: &str, condition: &Condition) -> bool {
    match condition.op {
        ConditionOp::Equals => eq_ci(lhs, &condition.value.render()),
        ConditionOp::NotEquals => !eq_ci(lhs, &condition.value.render()),
        ConditionOp::Contains => match &condition.value {
            ConditionValue::Text(needle) => {
                lhs.to_lowercase().contains(&needle.to_lowercase())
            }
            _ => false,
        },
        ConditionOp::GreaterThan | ConditionOp::LessThan => {
            compare_numbers(lhs.trim().parse().ok(), condition)
        }
    }
}

fn compare_value(value: &ResolvedValue, condition: &Condition) -> bool {
    match condition.op {
        ConditionOp::Equals | ConditionOp::NotEquals => {
            let equal = resolved_equals(value, &condition.value);
            if condition.op == ConditionOp::Equals {
                equal
            } else {
                !equal
            }
        }
        ConditionOp::Contains => match (value_text(value), &condition.value) {
            (Some(haystack), ConditionValue::Text(needle)) => {
                haystack.to_lowercase().contains(&needle.to_lowercase())
            }
            _ => false,
        },
        ConditionOp::GreaterThan | ConditionOp::LessThan => {
            compare_numbers(value.as_number(), condition)
        }
    }
}

/// Case-insensitive equality of rendered forms, with the boolean-vs-string
/// special case: a text rule value against a boolean property parses as
/// `"true"` / anything-else.
fn resolved_equals(value: &ResolvedValue, rule_value: &ConditionValue) -> bool {
    if let ResolvedValue::Scalar(Scalar::Bool(b)) = value {
        let rule_bool = match rule_value {
            ConditionValue::Bool(rb) => *rb,
            ConditionValue::Text(s) => s.trim().to_lowercase() == "true",
            ConditionValue::Number(_) => return false,
        };
        return *b == rule_bool;
    }
    eq_ci(&value.to_string(), &rule_value.render())
}

/// Text view of a resolved value for substring tests; both sides of a
/// contains comparison must be strings.
fn value_text(value: &ResolvedValue) -> Option<&str> {
    match value {
        ResolvedValue::Scalar(Scalar::Text(s)) => Some(s),
        ResolvedValue::WithUnit {
            value: Scalar::Text(s),
            ..
        } => Some(s),
        _ => None,
    }
}

fn compare_numbers(lhs: Option<f64>, condition: &Condition) -> bool {
    let (Some(l), Some(r)) = (lhs, condition.value.as_number()) else {
        return false;
    };
    match condition.op {
        ConditionOp::GreaterThan => l > r,
        ConditionOp::LessThan => l < r,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    fn rule(property: &str, op: ConditionOp, value: ConditionValue) -> ClassificationRule {
        ClassificationRule::new("r1", "test rule", "21.21")
            .with_condition(Condition::new(property, op, value))
    }

    #[test]
    fn type_condition_matches_exactly_the_walls() {
        let models = fixture::census_set();
        let outcome = apply_rule(
            &rule(
                "ifcType",
                ConditionOp::Equals,
                ConditionValue::Text("IFCWALL".into()),
            ),
            &models,
        );
        assert_eq!(outcome.matched.len(), 5);
        assert_eq!(outcome.failures, 0);
    }

    #[test]
    fn type_condition_is_case_insensitive() {
        let models = fixture::census_set();
        let outcome = apply_rule(
            &rule(
                "ifcType",
                ConditionOp::Equals,
                ConditionValue::Text("IfcWall".into()),
            ),
            &models,
        );
        assert_eq!(outcome.matched.len(), 5);
    }

    #[test]
    fn name_contains_condition() {
        let models = fixture::small_set();
        let outcome = apply_rule(
            &rule(
                "name",
                ConditionOp::Contains,
                ConditionValue::Text("wall".into()),
            ),
            &models,
        );
        assert_eq!(outcome.matched.len(), 2);
    }

    #[test]
    fn property_condition_with_boolean_string() {
        let models = fixture::small_set();
        let outcome = apply_rule(
            &rule(
                "Pset_WallCommon.IsExternal",
                ConditionOp::Equals,
                ConditionValue::Text("true".into()),
            ),
            &models,
        );
        // Only Wall-01 carries the property set
        assert_eq!(outcome.matched.len(), 1);
    }

    #[test]
    fn numeric_comparison_on_property() {
        let models = fixture::small_set();
        let gt = apply_rule(
            &rule(
                "Pset_WallCommon.Width",
                ConditionOp::GreaterThan,
                ConditionValue::Number(3.0),
            ),
            &models,
        );
        assert_eq!(gt.matched.len(), 1);

        let lt = apply_rule(
            &rule(
                "Pset_WallCommon.Width",
                ConditionOp::LessThan,
                ConditionValue::Number(3.0),
            ),
            &models,
        );
        assert!(lt.matched.is_empty());
    }

    #[test]
    fn missing_property_set_is_a_non_match() {
        let models = fixture::small_set();
        let outcome = apply_rule(
            &rule(
                "Pset_Nonexistent.Whatever",
                ConditionOp::Equals,
                ConditionValue::Text("x".into()),
            ),
            &models,
        );
        assert!(outcome.matched.is_empty());
        assert_eq!(outcome.failures, 0);
    }

    #[test]
    fn conditions_are_and_combined() {
        let models = fixture::small_set();
        let combined = ClassificationRule::new("r2", "external walls", "21.21")
            .with_condition(Condition::new(
                "ifcType",
                ConditionOp::Equals,
                ConditionValue::Text("IFCWALL".into()),
            ))
            .with_condition(Condition::new(
                "Pset_WallCommon.IsExternal",
                ConditionOp::Equals,
                ConditionValue::Bool(true),
            ));
        let outcome = apply_rule(&combined, &models);
        assert_eq!(outcome.matched.len(), 1);
    }

    #[test]
    fn inactive_rule_matches_nothing() {
        let models = fixture::census_set();
        let mut r = rule(
            "ifcType",
            ConditionOp::Equals,
            ConditionValue::Text("IFCWALL".into()),
        );
        r.active = false;
        assert!(apply_rule(&r, &models).matched.is_empty());
    }

    #[test]
    fn apply_is_idempotent_and_assignment_is_wholesale() {
        let models = fixture::census_set();
        let r = rule(
            "ifcType",
            ConditionOp::Equals,
            ConditionValue::Text("IFCSLAB".into()),
        );

        let first = apply_rule(&r, &models);
        let second = apply_rule(&r, &models);
        assert_eq!(first, second);

        let mut classification = Classification::new("21.21", "Slabs", "#1f77b4");
        classification
            .elements
            .insert(EntityRef::new(ifc_scope_model::ModelId(9), ifc_scope_model::EntityId(9)));
        first.assign_to(&mut classification);
        assert_eq!(classification.elements, first.matched);
    }
}
