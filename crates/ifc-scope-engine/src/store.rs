// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory graph store and the set of loaded models

use crate::spatial::build_tree;
use ifc_scope_model::{
    Entity, EntityId, IfcType, ModelGraph, ModelId, Result, SpatialNode,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

/// In-memory [`ModelGraph`] implementation
///
/// Holds fully decoded entities and prebuilt relationship indices so the
/// association helpers are O(1) per entity instead of rescanning the
/// relationship records on every call.
pub struct MemoryGraph {
    /// Entity id -> decoded record
    entities: FxHashMap<u32, Arc<Entity>>,
    /// All ids in record order
    order: Vec<EntityId>,
    /// Type tag -> entity ids in record order
    type_index: FxHashMap<IfcType, Vec<EntityId>>,
    /// Entity id -> property/quantity set ids
    pset_index: FxHashMap<u32, Vec<EntityId>>,
    /// Entity id -> type definition ids
    typedef_index: FxHashMap<u32, Vec<EntityId>>,
    /// Entity id -> material definition ids
    material_index: FxHashMap<u32, Vec<EntityId>>,
}

impl MemoryGraph {
    /// Build a graph from decoded entities, indexing relationships in one pass
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        let mut map: FxHashMap<u32, Arc<Entity>> = FxHashMap::default();
        let mut order = Vec::with_capacity(entities.len());
        let mut type_index: FxHashMap<IfcType, Vec<EntityId>> = FxHashMap::default();

        for entity in entities {
            order.push(entity.id);
            type_index
                .entry(entity.ifc_type.clone())
                .or_default()
                .push(entity.id);
            map.insert(entity.id.0, Arc::new(entity));
        }

        let mut pset_index: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();
        let mut typedef_index: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();
        let mut material_index: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();

        let ids_of = |index: &FxHashMap<IfcType, Vec<EntityId>>, t: &IfcType| {
            index.get(t).cloned().unwrap_or_default()
        };

        for rel_id in ids_of(&type_index, &IfcType::IfcRelDefinesByProperties) {
            let Some(rel) = map.get(&rel_id.0) else { continue };
            let Some(def_id) = rel.ref_attr("RelatingPropertyDefinition") else {
                continue;
            };
            // Only property and quantity sets participate in resolution
            let is_definition = map.get(&def_id.0).is_some_and(|def| {
                matches!(
                    def.ifc_type,
                    IfcType::IfcPropertySet | IfcType::IfcElementQuantity
                )
            });
            if !is_definition {
                continue;
            }
            for related in rel.refs_attr("RelatedObjects") {
                pset_index.entry(related.0).or_default().push(def_id);
            }
        }

        for rel_id in ids_of(&type_index, &IfcType::IfcRelDefinesByType) {
            let Some(rel) = map.get(&rel_id.0) else { continue };
            let Some(type_id) = rel.ref_attr("RelatingType") else { continue };
            for related in rel.refs_attr("RelatedObjects") {
                typedef_index.entry(related.0).or_default().push(type_id);
            }
        }

        for rel_id in ids_of(&type_index, &IfcType::IfcRelAssociatesMaterial) {
            let Some(rel) = map.get(&rel_id.0) else { continue };
            let Some(material_id) = rel.ref_attr("RelatingMaterial") else {
                continue;
            };
            for related in rel.refs_attr("RelatedObjects") {
                material_index.entry(related.0).or_default().push(material_id);
            }
        }

        Self {
            entities: map,
            order,
            type_index,
            pset_index,
            typedef_index,
            material_index,
        }
    }

    fn lookup_index(&self, index: &FxHashMap<u32, Vec<EntityId>>, id: EntityId) -> Vec<Arc<Entity>> {
        index
            .get(&id.0)
            .map(|ids| ids.iter().filter_map(|i| self.get(*i)).collect())
            .unwrap_or_default()
    }
}

impl ModelGraph for MemoryGraph {
    fn get(&self, id: EntityId) -> Option<Arc<Entity>> {
        self.entities.get(&id.0).cloned()
    }

    fn ids_of_type(&self, ifc_type: &IfcType) -> Vec<EntityId> {
        self.type_index.get(ifc_type).cloned().unwrap_or_default()
    }

    fn all_ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }

    fn instance_property_sets(&self, id: EntityId) -> Vec<Arc<Entity>> {
        self.lookup_index(&self.pset_index, id)
    }

    fn type_definitions(&self, id: EntityId) -> Vec<Arc<Entity>> {
        self.lookup_index(&self.typedef_index, id)
    }

    fn material_definitions(&self, id: EntityId) -> Vec<Arc<Entity>> {
        self.lookup_index(&self.material_index, id)
    }

    fn entity_count(&self) -> usize {
        self.order.len()
    }
}

/// One loaded graph with its derived spatial tree
pub struct LoadedModel {
    /// Model identifier, stable for the session
    pub id: ModelId,
    /// The underlying graph accessor
    pub graph: Arc<dyn ModelGraph>,
    /// The containment tree, built once at load
    pub tree: SpatialNode,
}

/// The set of loaded models the rule and search engines operate over
#[derive(Default)]
pub struct ModelSet {
    models: Vec<LoadedModel>,
}

impl ModelSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a graph, building its spatial tree
    ///
    /// A structural error leaves the set unchanged. Reloading an id replaces
    /// the previous graph and tree wholesale.
    pub fn load(&mut self, id: ModelId, graph: Arc<dyn ModelGraph>) -> Result<()> {
        let tree = build_tree(graph.as_ref())?;
        debug!(model = %id, nodes = tree.node_count(), "model loaded");
        self.models.retain(|m| m.id != id);
        self.models.push(LoadedModel { id, graph, tree });
        Ok(())
    }

    /// Remove a model
    pub fn unload(&mut self, id: ModelId) {
        self.models.retain(|m| m.id != id);
    }

    /// Get a loaded model by id
    pub fn get(&self, id: ModelId) -> Option<&LoadedModel> {
        self.models.iter().find(|m| m.id == id)
    }

    /// All loaded models in load order
    pub fn models(&self) -> &[LoadedModel] {
        &self.models
    }

    /// Number of loaded models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if no models are loaded
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Total node count across all trees
    pub fn node_count(&self) -> usize {
        self.models.iter().map(|m| m.tree.node_count()).sum()
    }
}
