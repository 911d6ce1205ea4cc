// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Graph accessor trait over one decoded entity graph

use crate::{AttributeValue, Entity, EntityId, IfcType};
use std::sync::Arc;

/// Entity lookup and relationship helpers over one loaded graph
///
/// Decoding backends implement this; every engine consumes it as a trait
/// object. Implementations should provide O(1) lookup by entity id. Per-call
/// failure is tolerated by contract: a missing record is `None` and a
/// missing association is an empty list, never a panic.
///
/// The association helpers have default implementations that scan the
/// relationship records through [`ModelGraph::entities_of_type`]; backends
/// with prebuilt relationship indices should override them.
///
/// # Example
///
/// ```ignore
/// use ifc_scope_model::{ModelGraph, EntityId, IfcType};
///
/// fn wall_names(graph: &dyn ModelGraph) -> Vec<String> {
///     graph
///         .entities_of_type(&IfcType::IfcWall)
///         .iter()
///         .filter_map(|w| w.name().map(str::to_string))
///         .collect()
/// }
/// ```
pub trait ModelGraph: Send + Sync {
    /// Get entity by id
    fn get(&self, id: EntityId) -> Option<Arc<Entity>>;

    /// Get all entity ids of a specific type, in record order
    fn ids_of_type(&self, ifc_type: &IfcType) -> Vec<EntityId>;

    /// Get all entity ids in the graph
    fn all_ids(&self) -> Vec<EntityId>;

    /// Get all entities of a specific type, in record order
    fn entities_of_type(&self, ifc_type: &IfcType) -> Vec<Arc<Entity>> {
        self.ids_of_type(ifc_type)
            .into_iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Resolve an entity reference from an attribute value
    fn resolve_ref(&self, attr: &AttributeValue) -> Option<Arc<Entity>> {
        match attr {
            AttributeValue::Ref(id) => self.get(*id),
            _ => None,
        }
    }

    /// Resolve a list of entity references
    fn resolve_ref_list(&self, attr: &AttributeValue) -> Vec<Arc<Entity>> {
        match attr {
            AttributeValue::List(items) => {
                items.iter().filter_map(|item| self.resolve_ref(item)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Property-set and quantity-set records directly associated with an
    /// entity through property-definition relationships
    fn instance_property_sets(&self, id: EntityId) -> Vec<Arc<Entity>> {
        let mut sets = Vec::new();
        for rel in self.entities_of_type(&IfcType::IfcRelDefinesByProperties) {
            if !rel.refs_attr("RelatedObjects").contains(&id) {
                continue;
            }
            if let Some(def_id) = rel.ref_attr("RelatingPropertyDefinition") {
                if let Some(def) = self.get(def_id) {
                    sets.push(def);
                }
            }
        }
        sets
    }

    /// Type-definition entities associated with an instance (e.g. a wall
    /// type for a wall occurrence)
    fn type_definitions(&self, id: EntityId) -> Vec<Arc<Entity>> {
        let mut types = Vec::new();
        for rel in self.entities_of_type(&IfcType::IfcRelDefinesByType) {
            if !rel.refs_attr("RelatedObjects").contains(&id) {
                continue;
            }
            if let Some(type_id) = rel.ref_attr("RelatingType") {
                if let Some(type_entity) = self.get(type_id) {
                    types.push(type_entity);
                }
            }
        }
        types
    }

    /// Material definitions associated with an entity
    ///
    /// The base implementation returns nothing; graphs without a material
    /// index rely on the resolver's association-record fallback instead.
    fn material_definitions(&self, _id: EntityId) -> Vec<Arc<Entity>> {
        Vec::new()
    }

    /// Get total entity count
    fn entity_count(&self) -> usize {
        self.all_ids().len()
    }
}
