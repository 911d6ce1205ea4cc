// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial containment tree builder

use ifc_scope_model::{
    Entity, EntityId, IfcType, ModelGraph, Result, SpatialNode, SpatialNodeKind, StructureError,
};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Build the spatial containment tree for one graph
///
/// Starts at the single root project entity and follows decomposition
/// records downward, expanding containment records at spatial-container
/// nodes. Contained spatial entities recurse fully; contained elements
/// become shallow leaves.
///
/// Decomposition and containment edges are structurally acyclic in a
/// well-formed graph; the builder carries no cycle guard and will not
/// terminate on a graph that violates this.
///
/// # Errors
/// [`StructureError::NoRoot`] / [`StructureError::MultipleRoots`] when the
/// graph does not have exactly one root project entity, and
/// [`StructureError::MalformedRelationship`] when a relationship record is
/// missing its relating or related side.
pub fn build_tree(graph: &dyn ModelGraph) -> Result<SpatialNode> {
    let roots = graph.entities_of_type(&IfcType::IfcProject);
    let root = match roots.len() {
        0 => return Err(StructureError::NoRoot),
        1 => &roots[0],
        n => return Err(StructureError::MultipleRoots(n)),
    };

    let builder = TreeBuilder::index(graph)?;
    let tree = builder.build_node(root);
    debug!(nodes = tree.node_count(), "spatial tree built");
    Ok(tree)
}

/// Helper struct holding prebuilt relationship indices
struct TreeBuilder<'a> {
    graph: &'a dyn ModelGraph,
    /// Relating object -> related objects, in record order
    decomposition: FxHashMap<u32, Vec<EntityId>>,
    /// Relating structure -> related elements, in record order
    containment: FxHashMap<u32, Vec<EntityId>>,
}

impl<'a> TreeBuilder<'a> {
    fn index(graph: &'a dyn ModelGraph) -> Result<Self> {
        let mut decomposition: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();
        let mut containment: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();

        for rel in graph.entities_of_type(&IfcType::IfcRelAggregates) {
            let relating = rel
                .ref_attr("RelatingObject")
                .ok_or_else(|| StructureError::malformed(rel.id, "missing RelatingObject"))?;
            let related = related_list(&rel, "RelatedObjects")?;
            decomposition.entry(relating.0).or_default().extend(related);
        }

        for rel in graph.entities_of_type(&IfcType::IfcRelContainedInSpatialStructure) {
            let relating = rel
                .ref_attr("RelatingStructure")
                .ok_or_else(|| StructureError::malformed(rel.id, "missing RelatingStructure"))?;
            let related = related_list(&rel, "RelatedElements")?;
            containment.entry(relating.0).or_default().extend(related);
        }

        Ok(Self {
            graph,
            decomposition,
            containment,
        })
    }

    fn create_node(&self, entity: &Entity) -> SpatialNode {
        SpatialNode::new(
            entity.id,
            SpatialNodeKind::from_type(&entity.ifc_type),
            entity.ifc_type.name(),
        )
        .with_name(entity.name().map(str::to_string))
        .with_global_id(entity.global_id().map(str::to_string))
    }

    fn build_node(&self, entity: &Entity) -> SpatialNode {
        let mut node = self.create_node(entity);

        if let Some(children) = self.decomposition.get(&entity.id.0) {
            for child_id in children {
                match self.graph.get(*child_id) {
                    Some(child) => node.add_child(self.build_node(&child)),
                    None => warn!(entity = %child_id, "decomposed entity not found, omitted"),
                }
            }
        }

        if entity.ifc_type.is_container() {
            if let Some(elements) = self.containment.get(&entity.id.0) {
                for elem_id in elements {
                    let Some(elem) = self.graph.get(*elem_id) else {
                        warn!(entity = %elem_id, "contained entity not found, omitted");
                        continue;
                    };
                    if elem.ifc_type.is_spatial() {
                        node.add_child(self.build_node(&elem));
                    } else {
                        node.add_child(self.create_node(&elem));
                    }
                }
            }
        }

        node
    }
}

fn related_list(rel: &Entity, field: &str) -> Result<Vec<EntityId>> {
    match rel.attr(field) {
        Some(value) if value.as_list().is_some() => Ok(rel.refs_attr(field)),
        _ => Err(StructureError::malformed(
            rel.id,
            format!("missing or non-list {field}"),
        )),
    }
}
