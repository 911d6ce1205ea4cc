// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded entity records and attribute values

use crate::{EntityId, IfcType};
use serde::{Deserialize, Serialize};

/// Decoded attribute value
///
/// Represents any value that can appear in an entity's attribute map:
/// scalars, the `{value, type}` measure wrapper, entity references and lists.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Null value ($)
    #[default]
    Null,
    /// Derived value (*)
    Derived,
    /// Entity reference (#123)
    Ref(EntityId),
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    Text(String),
    /// Enumeration value (.VALUE.)
    Enum(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Unit-typed wrapper like IFCLABEL('text') or IFCTHERMALTRANSMITTANCEMEASURE(0.24)
    Typed {
        type_name: String,
        value: Box<AttributeValue>,
    },
}

impl AttributeValue {
    /// Wrap a value in a measure type
    pub fn typed(type_name: impl Into<String>, value: AttributeValue) -> Self {
        AttributeValue::Typed {
            type_name: type_name.into(),
            value: Box::new(value),
        }
    }

    /// Try to get as entity reference
    pub fn as_ref_id(&self) -> Option<EntityId> {
        match self {
            AttributeValue::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as string, unwrapping measure wrappers
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Typed { value, .. } => value.as_str(),
            _ => None,
        }
    }

    /// Try to get as float, unwrapping measure wrappers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::Typed { value, .. } => value.as_float(),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::Typed { value, .. } => value.as_integer(),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            AttributeValue::Enum(s) => match s.to_uppercase().as_str() {
                "TRUE" | "T" => Some(true),
                "FALSE" | "F" => Some(false),
                _ => None,
            },
            AttributeValue::Typed { value, .. } => value.as_bool(),
            _ => None,
        }
    }

    /// Try to get as enum string
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as list
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Check if this value is or contains an entity reference
    pub fn has_refs(&self) -> bool {
        match self {
            AttributeValue::Ref(_) => true,
            AttributeValue::List(items) => items.iter().any(|v| v.has_refs()),
            AttributeValue::Typed { value, .. } => value.has_refs(),
            _ => false,
        }
    }
}

/// A named attribute of a decoded entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Field name from the schema (e.g. "Name", "RelatedObjects")
    pub name: String,
    /// Decoded value
    pub value: AttributeValue,
}

/// Decoded entity record
///
/// One numbered record of the flat graph: a type tag plus its attribute map.
/// Attribute order follows the source record and is preserved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity id
    pub id: EntityId,
    /// Entity type tag
    pub ifc_type: IfcType,
    /// Named attribute values in record order
    pub attrs: Vec<Attribute>,
}

impl Entity {
    /// Create an entity with no attributes
    pub fn new(id: EntityId, ifc_type: IfcType) -> Self {
        Self {
            id,
            ifc_type,
            attrs: Vec::new(),
        }
    }

    /// Append an attribute (builder style)
    pub fn with(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attrs.push(Attribute {
            name: name.into(),
            value,
        });
        self
    }

    /// Get attribute value by field name
    pub fn attr(&self, name: &str) -> Option<&AttributeValue> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// Get string attribute by field name
    pub fn string_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(|v| v.as_str())
    }

    /// Get entity reference attribute by field name
    pub fn ref_attr(&self, name: &str) -> Option<EntityId> {
        self.attr(name).and_then(|v| v.as_ref_id())
    }

    /// Get float attribute by field name
    pub fn float_attr(&self, name: &str) -> Option<f64> {
        self.attr(name).and_then(|v| v.as_float())
    }

    /// Get list attribute by field name
    pub fn list_attr(&self, name: &str) -> Option<&[AttributeValue]> {
        self.attr(name).and_then(|v| v.as_list())
    }

    /// Get all entity references in a list attribute
    pub fn refs_attr(&self, name: &str) -> Vec<EntityId> {
        self.list_attr(name)
            .map(|list| list.iter().filter_map(|v| v.as_ref_id()).collect())
            .unwrap_or_default()
    }

    /// Entity Name attribute
    pub fn name(&self) -> Option<&str> {
        self.string_attr("Name")
    }

    /// Entity GlobalId attribute
    pub fn global_id(&self) -> Option<&str> {
        self.string_attr("GlobalId")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_wrapper_unwraps_to_scalar() {
        let v = AttributeValue::typed("IFCLABEL", AttributeValue::Text("F30".into()));
        assert_eq!(v.as_str(), Some("F30"));

        let n = AttributeValue::typed("IFCLENGTHMEASURE", AttributeValue::Float(3.2));
        assert_eq!(n.as_float(), Some(3.2));
    }

    #[test]
    fn enum_parses_to_bool() {
        assert_eq!(AttributeValue::Enum("T".into()).as_bool(), Some(true));
        assert_eq!(AttributeValue::Enum("FALSE".into()).as_bool(), Some(false));
        assert_eq!(AttributeValue::Enum("ELEMENT".into()).as_bool(), None);
    }

    #[test]
    fn entity_attr_lookup() {
        let e = Entity::new(EntityId(1), IfcType::IfcWall)
            .with("GlobalId", AttributeValue::Text("2O2Fr$t4X7Zf8NOew3FL9r".into()))
            .with("Name", AttributeValue::Text("Wall-01".into()))
            .with("Tag", AttributeValue::Null);

        assert_eq!(e.name(), Some("Wall-01"));
        assert_eq!(e.global_id(), Some("2O2Fr$t4X7Zf8NOew3FL9r"));
        assert!(e.attr("Tag").unwrap().is_null());
        assert!(e.attr("Missing").is_none());
    }

    #[test]
    fn refs_attr_skips_non_refs() {
        let e = Entity::new(EntityId(2), IfcType::IfcRelAggregates).with(
            "RelatedObjects",
            AttributeValue::List(vec![
                AttributeValue::Ref(EntityId(4)),
                AttributeValue::Null,
                AttributeValue::Ref(EntityId(5)),
            ]),
        );
        assert_eq!(e.refs_attr("RelatedObjects"), vec![EntityId(4), EntityId(5)]);
    }
}
