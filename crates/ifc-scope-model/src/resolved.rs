// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical resolved property values and the merged property bag

use crate::AttributeValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel written when a property record references itself, directly or
/// transitively, during one resolution call.
pub const CYCLE_SENTINEL: &str = "[Cycle Detected]";

/// A resolved scalar leaf value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Integer(i64),
    Bool(bool),
    Null,
}

impl Scalar {
    /// Convert a decoded attribute value into a scalar, unwrapping measure
    /// wrappers. References and lists have no scalar form.
    pub fn from_attribute(value: &AttributeValue) -> Option<Scalar> {
        match value {
            AttributeValue::Text(s) => Some(Scalar::Text(s.clone())),
            AttributeValue::Enum(s) => Some(Scalar::Text(s.clone())),
            AttributeValue::Float(f) => Some(Scalar::Number(*f)),
            AttributeValue::Integer(i) => Some(Scalar::Integer(*i)),
            AttributeValue::Bool(b) => Some(Scalar::Bool(*b)),
            AttributeValue::Null => Some(Scalar::Null),
            AttributeValue::Typed { value, .. } => Scalar::from_attribute(value),
            _ => None,
        }
    }

    /// Numeric view, parsing text if necessary
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(f) => Some(*f),
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => write!(f, "{s}"),
            Scalar::Number(n) => {
                let s = format!("{n:.6}");
                write!(f, "{}", s.trim_end_matches('0').trim_end_matches('.'))
            }
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Null => Ok(()),
        }
    }
}

/// A resolved property value
///
/// The closed set of shapes a source-side value can resolve to. Exhaustive
/// matching on this union replaces shape-sniffing the raw attribute forms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ResolvedValue {
    /// Plain scalar
    Scalar(Scalar),
    /// Scalar with a unit suffix (e.g. 3.2 mm)
    WithUnit { value: Scalar, unit: String },
    /// List of scalars
    List(Vec<Scalar>),
    /// List of scalars sharing one unit
    ListWithUnit { values: Vec<Scalar>, unit: String },
    /// Bounded range, at least one bound present
    Bounded {
        lower: Option<Scalar>,
        upper: Option<Scalar>,
        unit: Option<String>,
    },
    /// Value shape not recognized; carries the placeholder text
    Unhandled(String),
}

impl ResolvedValue {
    /// Plain text value
    pub fn text(s: impl Into<String>) -> Self {
        ResolvedValue::Scalar(Scalar::Text(s.into()))
    }

    /// Plain numeric value
    pub fn number(n: f64) -> Self {
        ResolvedValue::Scalar(Scalar::Number(n))
    }

    /// The cycle sentinel value
    pub fn cycle() -> Self {
        ResolvedValue::text(CYCLE_SENTINEL)
    }

    /// Placeholder for an unrecognized value shape
    pub fn unhandled(type_tag: &str) -> Self {
        ResolvedValue::Unhandled(format!("(unhandled {type_tag})"))
    }

    /// Check for the cycle sentinel
    pub fn is_cycle(&self) -> bool {
        matches!(self, ResolvedValue::Scalar(Scalar::Text(s)) if s == CYCLE_SENTINEL)
    }

    /// Iterate every scalar leaf of this value
    pub fn scalars(&self) -> impl Iterator<Item = &Scalar> {
        let slice: Vec<&Scalar> = match self {
            ResolvedValue::Scalar(s) => vec![s],
            ResolvedValue::WithUnit { value, .. } => vec![value],
            ResolvedValue::List(values) => values.iter().collect(),
            ResolvedValue::ListWithUnit { values, .. } => values.iter().collect(),
            ResolvedValue::Bounded { lower, upper, .. } => {
                lower.iter().chain(upper.iter()).collect()
            }
            ResolvedValue::Unhandled(_) => Vec::new(),
        };
        slice.into_iter()
    }

    /// Unit suffix, if this value carries one
    pub fn unit(&self) -> Option<&str> {
        match self {
            ResolvedValue::WithUnit { unit, .. } => Some(unit),
            ResolvedValue::ListWithUnit { unit, .. } => Some(unit),
            ResolvedValue::Bounded { unit, .. } => unit.as_deref(),
            _ => None,
        }
    }

    /// Numeric view of a single-scalar value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResolvedValue::Scalar(s) => s.as_number(),
            ResolvedValue::WithUnit { value, .. } => value.as_number(),
            _ => None,
        }
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Scalar(s) => write!(f, "{s}"),
            ResolvedValue::WithUnit { value, unit } => write!(f, "{value} {unit}"),
            ResolvedValue::List(values) => {
                let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", joined.join(", "))
            }
            ResolvedValue::ListWithUnit { values, unit } => {
                let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{} {unit}", joined.join(", "))
            }
            ResolvedValue::Bounded { lower, upper, unit } => {
                let body = match (lower, upper) {
                    (Some(l), Some(u)) => format!("{l} - {u}"),
                    (Some(l), None) => format!(">= {l}"),
                    (None, Some(u)) => format!("<= {u}"),
                    (None, None) => String::new(),
                };
                match unit {
                    Some(u) => write!(f, "{body} {u}"),
                    None => write!(f, "{body}"),
                }
            }
            ResolvedValue::Unhandled(s) => write!(f, "{s}"),
        }
    }
}

/// A named group of resolved properties, insertion-ordered
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyGroup {
    /// Group name (e.g. "Element Attributes", "Pset_WallCommon",
    /// "Type Attributes: Basic Wall", "Material: Concrete")
    pub name: String,
    /// Property name to resolved value, in resolution order
    pub entries: Vec<(String, ResolvedValue)>,
}

impl PropertyGroup {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Append an entry
    pub fn push(&mut self, name: impl Into<String>, value: ResolvedValue) {
        self.entries.push((name.into(), value));
    }

    /// Get the first entry with the given name
    pub fn get(&self, name: &str) -> Option<&ResolvedValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the group has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The merged property view of one entity
///
/// Computed fresh per resolution call; group order follows the resolution
/// steps (direct attributes, instance sets, type sets, materials).
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyBag {
    /// Groups in resolution order
    pub groups: Vec<PropertyGroup>,
}

impl PropertyBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group, dropping empty ones
    pub fn push_group(&mut self, group: PropertyGroup) {
        if !group.is_empty() {
            self.groups.push(group);
        }
    }

    /// Get a group by name
    pub fn get(&self, name: &str) -> Option<&PropertyGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Dotted lookup: "Group.Property" splits at the first dot
    pub fn lookup(&self, path: &str) -> Option<&ResolvedValue> {
        let (group, prop) = path.split_once('.')?;
        self.get(group)?.get(prop)
    }

    /// Total number of entries across groups
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }

    /// Check if the bag has no entries
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_rendering_trims_zeros() {
        assert_eq!(Scalar::Number(3.2).to_string(), "3.2");
        assert_eq!(Scalar::Number(5.0).to_string(), "5");
        assert_eq!(Scalar::Number(0.125).to_string(), "0.125");
    }

    #[test]
    fn with_unit_preserves_value_and_unit() {
        let v = ResolvedValue::WithUnit {
            value: Scalar::Number(3.2),
            unit: "mm".into(),
        };
        assert_eq!(v.to_string(), "3.2 mm");
        assert_eq!(v.unit(), Some("mm"));
        assert_eq!(v.as_number(), Some(3.2));
    }

    #[test]
    fn bounded_rendering() {
        let both = ResolvedValue::Bounded {
            lower: Some(Scalar::Number(1.0)),
            upper: Some(Scalar::Number(2.0)),
            unit: Some("m".into()),
        };
        assert_eq!(both.to_string(), "1 - 2 m");

        let lower_only = ResolvedValue::Bounded {
            lower: Some(Scalar::Number(30.0)),
            upper: None,
            unit: None,
        };
        assert_eq!(lower_only.to_string(), ">= 30");
    }

    #[test]
    fn cycle_sentinel_detected() {
        assert!(ResolvedValue::cycle().is_cycle());
        assert!(!ResolvedValue::text("fine").is_cycle());
    }

    #[test]
    fn dotted_lookup_splits_at_first_dot() {
        let mut group = PropertyGroup::new("Pset_WallCommon");
        group.push("Acoustic.Rating", ResolvedValue::text("52dB"));
        let mut bag = PropertyBag::new();
        bag.push_group(group);

        assert_eq!(
            bag.lookup("Pset_WallCommon.Acoustic.Rating").map(|v| v.to_string()),
            Some("52dB".to_string())
        );
        assert!(bag.lookup("Pset_WallCommon.Missing").is_none());
        assert!(bag.lookup("NoDotHere").is_none());
    }

    #[test]
    fn empty_groups_are_dropped() {
        let mut bag = PropertyBag::new();
        bag.push_group(PropertyGroup::new("Empty"));
        assert!(bag.is_empty());
    }
}
