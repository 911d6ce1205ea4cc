// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared in-memory graph fixtures for engine tests

use crate::store::{MemoryGraph, ModelSet};
use ifc_scope_model::{AttributeValue, Entity, EntityId, IfcType, ModelId};
use std::sync::Arc;

fn text(s: &str) -> AttributeValue {
    AttributeValue::Text(s.to_string())
}

fn refs(ids: &[u32]) -> AttributeValue {
    AttributeValue::List(ids.iter().map(|i| AttributeValue::Ref(EntityId(*i))).collect())
}

fn aggregates(id: u32, parent: u32, children: &[u32]) -> Entity {
    Entity::new(EntityId(id), IfcType::IfcRelAggregates)
        .with("RelatingObject", AttributeValue::Ref(EntityId(parent)))
        .with("RelatedObjects", refs(children))
}

fn contained(id: u32, structure: u32, elements: &[u32]) -> Entity {
    Entity::new(EntityId(id), IfcType::IfcRelContainedInSpatialStructure)
        .with("RelatedElements", refs(elements))
        .with("RelatingStructure", AttributeValue::Ref(EntityId(structure)))
}

fn defines_by_properties(id: u32, related: &[u32], definition: u32) -> Entity {
    Entity::new(EntityId(id), IfcType::IfcRelDefinesByProperties)
        .with("RelatedObjects", refs(related))
        .with("RelatingPropertyDefinition", AttributeValue::Ref(EntityId(definition)))
}

fn spatial_chain() -> Vec<Entity> {
    vec![
        Entity::new(EntityId(1), IfcType::IfcProject)
            .with("GlobalId", text("0YvctVUKr0kugbFTf53O9L"))
            .with("Name", text("Test Project")),
        Entity::new(EntityId(2), IfcType::IfcSite).with("Name", text("Site")),
        Entity::new(EntityId(3), IfcType::IfcBuilding).with("Name", text("Building")),
        Entity::new(EntityId(4), IfcType::IfcBuildingStorey)
            .with("GlobalId", text("1hqIFTRjfV6AWq_bMtnZwI"))
            .with("Name", text("Ground Floor")),
        aggregates(5, 1, &[2]),
        aggregates(6, 2, &[3]),
        aggregates(7, 3, &[4]),
    ]
}

/// Entity records of the small three-element site
///
/// Wall-01 (#10) carries the full association spread: a property set with
/// string/bool/measured values, a quantity set, a wall type with its own
/// set, and a two-layer material assembly.
pub fn small_site_entities() -> Vec<Entity> {
    let mut entities = spatial_chain();
    entities.extend([
        Entity::new(EntityId(10), IfcType::IfcWall)
            .with("GlobalId", text("2O2Fr$t4X7Zf8NOew3FL9r"))
            .with("OwnerHistory", AttributeValue::Ref(EntityId(99)))
            .with("Name", text("Wall-01"))
            .with("ObjectType", text("Basic Wall"))
            .with("ObjectPlacement", AttributeValue::Ref(EntityId(98)))
            .with("Tag", text("W01")),
        Entity::new(EntityId(11), IfcType::IfcWall).with("Name", text("Wall-02")),
        Entity::new(EntityId(12), IfcType::IfcSlab).with("Name", text("Slab-01")),
        contained(13, 4, &[10, 11, 12]),
        // Instance property set
        Entity::new(EntityId(20), IfcType::IfcPropertySet)
            .with("GlobalId", text("2jEVkLP1X3GgnlXYfAja2m"))
            .with("Name", text("Pset_WallCommon"))
            .with("HasProperties", refs(&[21, 22, 23])),
        Entity::new(EntityId(21), IfcType::IfcPropertySingleValue)
            .with("Name", text("FireRating"))
            .with("NominalValue", AttributeValue::typed("IFCLABEL", text("F30"))),
        Entity::new(EntityId(22), IfcType::IfcPropertySingleValue)
            .with("Name", text("IsExternal"))
            .with(
                "NominalValue",
                AttributeValue::typed("IFCBOOLEAN", AttributeValue::Bool(true)),
            ),
        Entity::new(EntityId(23), IfcType::IfcPropertySingleValue)
            .with("Name", text("Width"))
            .with(
                "NominalValue",
                AttributeValue::typed("IFCLENGTHMEASURE", AttributeValue::Float(3.2)),
            )
            .with("Unit", AttributeValue::Ref(EntityId(90))),
        defines_by_properties(24, &[10], 20),
        // Wall type with its own property set
        Entity::new(EntityId(40), IfcType::IfcWallType)
            .with("GlobalId", text("3vB2YO$MX4xv5uCqZZG05x"))
            .with("Name", text("Basic Wall"))
            .with("HasPropertySets", refs(&[41])),
        Entity::new(EntityId(41), IfcType::IfcPropertySet)
            .with("Name", text("Pset_WallTypeCommon"))
            .with("HasProperties", refs(&[42])),
        Entity::new(EntityId(42), IfcType::IfcPropertySingleValue)
            .with("Name", text("LoadBearing"))
            .with(
                "NominalValue",
                AttributeValue::typed("IFCBOOLEAN", AttributeValue::Bool(false)),
            ),
        Entity::new(EntityId(43), IfcType::IfcRelDefinesByType)
            .with("RelatedObjects", refs(&[10]))
            .with("RelatingType", AttributeValue::Ref(EntityId(40))),
        // Layered material assembly
        Entity::new(EntityId(50), IfcType::IfcMaterialLayerSet)
            .with("MaterialLayers", refs(&[51, 52]))
            .with("LayerSetName", text("Exterior Wall Assembly")),
        Entity::new(EntityId(51), IfcType::IfcMaterialLayer)
            .with("Material", AttributeValue::Ref(EntityId(53)))
            .with("LayerThickness", AttributeValue::Float(0.1)),
        Entity::new(EntityId(52), IfcType::IfcMaterialLayer)
            .with("Material", AttributeValue::Ref(EntityId(54)))
            .with("LayerThickness", AttributeValue::Float(0.2)),
        Entity::new(EntityId(53), IfcType::IfcMaterial).with("Name", text("Concrete")),
        Entity::new(EntityId(54), IfcType::IfcMaterial).with("Name", text("Insulation")),
        Entity::new(EntityId(55), IfcType::IfcRelAssociatesMaterial)
            .with("RelatedObjects", refs(&[10]))
            .with("RelatingMaterial", AttributeValue::Ref(EntityId(50))),
        // Quantities
        Entity::new(EntityId(60), IfcType::IfcElementQuantity)
            .with("Name", text("Qto_WallBaseQuantities"))
            .with("Quantities", refs(&[61])),
        Entity::new(EntityId(61), IfcType::IfcQuantityLength)
            .with("Name", text("Length"))
            .with("LengthValue", AttributeValue::Float(5.0)),
        defines_by_properties(62, &[10], 60),
        // Millimetre unit
        Entity::new(EntityId(90), IfcType::IfcSIUnit)
            .with("UnitType", AttributeValue::Enum("LENGTHUNIT".into()))
            .with("Prefix", AttributeValue::Enum("MILLI".into()))
            .with("Name", AttributeValue::Enum("METRE".into())),
    ]);
    entities
}

/// Three-element site: two walls and a slab on one storey
pub fn small_site() -> MemoryGraph {
    MemoryGraph::from_entities(small_site_entities())
}

/// Population for count-based tests: five walls and three slabs
pub fn census_site() -> MemoryGraph {
    let mut entities = spatial_chain();
    let walls: Vec<u32> = (0..5).map(|i| 10 + i).collect();
    let slabs: Vec<u32> = (0..3).map(|i| 15 + i).collect();
    for (i, id) in walls.iter().enumerate() {
        entities.push(
            Entity::new(EntityId(*id), IfcType::IfcWall)
                .with("Name", text(&format!("Wall-{:02}", i + 1))),
        );
    }
    for (i, id) in slabs.iter().enumerate() {
        entities.push(
            Entity::new(EntityId(*id), IfcType::IfcSlab)
                .with("Name", text(&format!("Slab-{:02}", i + 1))),
        );
    }
    let all: Vec<u32> = walls.into_iter().chain(slabs).collect();
    entities.push(contained(30, 4, &all));
    MemoryGraph::from_entities(entities)
}

/// A property set whose complex members reference each other
pub fn cyclic_pset() -> MemoryGraph {
    let mut entities = spatial_chain();
    entities.extend([
        Entity::new(EntityId(10), IfcType::IfcWall).with("Name", text("Wall-01")),
        contained(13, 4, &[10]),
        Entity::new(EntityId(20), IfcType::IfcPropertySet)
            .with("Name", text("Pset_Assembly"))
            .with("HasProperties", refs(&[25])),
        // Outer -> Inner -> Outer closes the cycle
        Entity::new(EntityId(25), IfcType::IfcComplexProperty)
            .with("Name", text("Outer"))
            .with("HasProperties", refs(&[26])),
        Entity::new(EntityId(26), IfcType::IfcComplexProperty)
            .with("Name", text("Inner"))
            .with("HasProperties", refs(&[25, 27])),
        Entity::new(EntityId(27), IfcType::IfcPropertySingleValue)
            .with("Name", text("Depth"))
            .with(
                "NominalValue",
                AttributeValue::typed("IFCLENGTHMEASURE", AttributeValue::Float(1.0)),
            ),
        defines_by_properties(24, &[10], 20),
    ]);
    MemoryGraph::from_entities(entities)
}

/// The small site loaded as model 0
pub fn small_set() -> ModelSet {
    let mut set = ModelSet::new();
    set.load(ModelId(0), Arc::new(small_site())).unwrap();
    set
}

/// The census site loaded as model 0
pub fn census_set() -> ModelSet {
    let mut set = ModelSet::new();
    set.load(ModelId(0), Arc::new(census_site())).unwrap();
    set
}
