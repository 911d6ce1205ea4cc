// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial containment tree

use crate::{EntityId, IfcType};
use serde::{Deserialize, Serialize};

/// Kind of spatial tree node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpatialNodeKind {
    /// Root of the hierarchy
    Project,
    /// Geographic site
    Site,
    /// A building structure
    Building,
    /// A floor/level
    Storey,
    /// A room or area
    Space,
    /// Physical element (wall, door, etc.)
    Element,
}

impl SpatialNodeKind {
    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            SpatialNodeKind::Project => "Project",
            SpatialNodeKind::Site => "Site",
            SpatialNodeKind::Building => "Building",
            SpatialNodeKind::Storey => "Storey",
            SpatialNodeKind::Space => "Space",
            SpatialNodeKind::Element => "Element",
        }
    }

    /// Determine node kind from a type tag
    pub fn from_type(ifc_type: &IfcType) -> Self {
        match ifc_type {
            IfcType::IfcProject => SpatialNodeKind::Project,
            IfcType::IfcSite => SpatialNodeKind::Site,
            IfcType::IfcBuilding => SpatialNodeKind::Building,
            IfcType::IfcBuildingStorey => SpatialNodeKind::Storey,
            IfcType::IfcSpace => SpatialNodeKind::Space,
            _ => SpatialNodeKind::Element,
        }
    }
}

/// Node in the spatial containment tree
///
/// Built once per loaded graph and immutable thereafter; each node is owned
/// exclusively by its parent. The tree typically follows
/// Project → Site → Building → Storey → Elements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpatialNode {
    /// Entity id
    pub id: EntityId,
    /// Kind of node
    pub kind: SpatialNodeKind,
    /// Entity type tag (e.g. "IFCWALL")
    pub type_tag: String,
    /// Display name, when the source record carries one
    pub name: Option<String>,
    /// Stable global identifier, when present
    pub global_id: Option<String>,
    /// Child nodes in relationship record order
    pub children: Vec<SpatialNode>,
}

impl SpatialNode {
    /// Create a new spatial node
    pub fn new(id: EntityId, kind: SpatialNodeKind, type_tag: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            type_tag: type_tag.into(),
            name: None,
            global_id: None,
            children: Vec::new(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Set the global id
    pub fn with_global_id(mut self, global_id: Option<String>) -> Self {
        self.global_id = global_id;
        self
    }

    /// Add a child node
    pub fn add_child(&mut self, child: SpatialNode) {
        self.children.push(child);
    }

    /// Get total element count (recursive)
    pub fn element_count(&self) -> usize {
        let own = if self.kind == SpatialNodeKind::Element {
            1
        } else {
            0
        };
        own + self
            .children
            .iter()
            .map(|c| c.element_count())
            .sum::<usize>()
    }

    /// Get total node count including this node (recursive)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Find a node by id (recursive)
    pub fn find(&self, id: EntityId) -> Option<&SpatialNode> {
        if self.id == id {
            return Some(self);
        }
        for child in &self.children {
            if let Some(found) = child.find(id) {
                return Some(found);
            }
        }
        None
    }

    /// Iterate all nodes (depth-first)
    pub fn iter(&self) -> SpatialNodeIter<'_> {
        SpatialNodeIter { stack: vec![self] }
    }

    /// Get all element ids in this subtree
    pub fn element_ids(&self) -> Vec<EntityId> {
        self.iter()
            .filter(|n| n.kind == SpatialNodeKind::Element)
            .map(|n| n.id)
            .collect()
    }
}

/// Iterator over spatial nodes (depth-first)
pub struct SpatialNodeIter<'a> {
    stack: Vec<&'a SpatialNode>,
}

impl<'a> Iterator for SpatialNodeIter<'a> {
    type Item = &'a SpatialNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Add children in reverse order so first child is processed first
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}
