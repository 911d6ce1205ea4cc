// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Classifications and classification rules
//!
//! Rules are user-owned data; the matching engine never mutates them. The
//! only engine-writable field is [`Classification::elements`], replaced
//! wholesale so re-applying a rule stays idempotent.

use crate::EntityRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Comparison operator of a rule condition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOp {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
}

/// Literal a condition compares against
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ConditionValue {
    /// Rendered form used for string comparison
    pub fn render(&self) -> String {
        match self {
            ConditionValue::Text(s) => s.clone(),
            ConditionValue::Number(n) => {
                let s = format!("{n:.6}");
                s.trim_end_matches('0').trim_end_matches('.').to_string()
            }
            ConditionValue::Bool(b) => b.to_string(),
        }
    }

    /// Numeric view, parsing text if necessary
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConditionValue::Number(n) => Some(*n),
            ConditionValue::Text(s) => s.trim().parse().ok(),
            ConditionValue::Bool(_) => None,
        }
    }
}

/// One condition of a classification rule
///
/// `property` is the literal `"ifcType"`, `"name"`, or a dotted
/// `"<GroupName>.<PropertyName>"` reference into a property bag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub property: String,
    pub op: ConditionOp,
    pub value: ConditionValue,
}

impl Condition {
    /// Create a new condition
    pub fn new(property: impl Into<String>, op: ConditionOp, value: ConditionValue) -> Self {
        Self {
            property: property.into(),
            op,
            value,
        }
    }
}

/// A user-defined classification rule
///
/// All conditions must hold for an entity to match (logical AND).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Stable rule id
    pub id: String,
    /// Display name
    pub name: String,
    /// AND-combined conditions, evaluated in order
    pub conditions: Vec<Condition>,
    /// Code of the classification matching entities are assigned to
    pub target_code: String,
    /// Inactive rules match nothing
    pub active: bool,
}

impl ClassificationRule {
    /// Create an active rule
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        target_code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            conditions: Vec::new(),
            target_code: target_code.into(),
            active: true,
        }
    }

    /// Append a condition (builder style)
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

/// A named, colored set of entity references
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Unique key
    pub code: String,
    /// Display name
    pub name: String,
    /// Display color (e.g. "#d97757")
    pub color: String,
    /// Member entities; engine-writable by wholesale replacement only
    pub elements: BTreeSet<EntityRef>,
}

impl Classification {
    /// Create an empty classification
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            color: color.into(),
            elements: BTreeSet::new(),
        }
    }

    /// Replace the member set wholesale
    pub fn assign(&mut self, elements: BTreeSet<EntityRef>) {
        self.elements = elements;
    }
}
