// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier types and the entity type tag enumeration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe entity identifier
///
/// Wraps the raw IFC record number (e.g. #123 becomes EntityId(123))
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default,
)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Identifier of one loaded graph instance
///
/// Graphs are read-only after load; ids are stable for the graph's lifetime.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default,
)]
pub struct ModelId(pub u32);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ModelId {
    fn from(id: u32) -> Self {
        ModelId(id)
    }
}

/// One entity within one loaded graph
///
/// The `Ord` impl gives match sets a stable iteration order.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default,
)]
pub struct EntityRef {
    /// The loaded graph the entity belongs to
    pub model: ModelId,
    /// The entity within that graph
    pub entity: EntityId,
}

impl EntityRef {
    /// Create a new entity reference
    pub fn new(model: ModelId, entity: EntityId) -> Self {
        Self { model, entity }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.model, self.entity)
    }
}

/// IFC entity type tags the engines dispatch on
///
/// Covers spatial structure, the relationship records the engines walk, and
/// the property/quantity/material records property resolution expands.
/// Anything else is captured as [`IfcType::Unknown`] with its original tag.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IfcType {
    // ========================================================================
    // Spatial Structure
    // ========================================================================
    IfcProject,
    IfcSite,
    IfcBuilding,
    IfcBuildingStorey,
    IfcSpace,

    // ========================================================================
    // Building Elements
    // ========================================================================
    IfcWall,
    IfcWallStandardCase,
    IfcSlab,
    IfcRoof,
    IfcBeam,
    IfcColumn,
    IfcDoor,
    IfcWindow,
    IfcStair,
    IfcRailing,
    IfcCovering,
    IfcPlate,
    IfcMember,
    IfcFurnishingElement,
    IfcOpeningElement,
    IfcBuildingElementProxy,

    // ========================================================================
    // Relationships
    // ========================================================================
    IfcRelAggregates,
    IfcRelContainedInSpatialStructure,
    IfcRelDefinesByProperties,
    IfcRelDefinesByType,
    IfcRelAssociatesMaterial,

    // ========================================================================
    // Properties
    // ========================================================================
    IfcPropertySet,
    IfcPropertySingleValue,
    IfcPropertyEnumeratedValue,
    IfcPropertyBoundedValue,
    IfcPropertyListValue,
    IfcPropertyTableValue,
    IfcComplexProperty,
    IfcElementQuantity,
    IfcQuantityLength,
    IfcQuantityArea,
    IfcQuantityVolume,
    IfcQuantityCount,
    IfcQuantityWeight,
    IfcQuantityTime,

    // ========================================================================
    // Materials
    // ========================================================================
    IfcMaterial,
    IfcMaterialLayer,
    IfcMaterialLayerSet,
    IfcMaterialLayerSetUsage,
    IfcMaterialList,
    IfcMaterialProperties,

    // ========================================================================
    // Units
    // ========================================================================
    IfcSIUnit,
    IfcConversionBasedUnit,

    // ========================================================================
    // Type definitions
    // ========================================================================
    IfcWallType,
    IfcSlabType,
    IfcBeamType,
    IfcColumnType,
    IfcDoorType,
    IfcWindowType,

    /// Unknown type - stores the original type tag string
    Unknown(String),
}

impl FromStr for IfcType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl IfcType {
    /// Parse a type tag string into an IfcType
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            // Spatial structure
            "IFCPROJECT" => IfcType::IfcProject,
            "IFCSITE" => IfcType::IfcSite,
            "IFCBUILDING" => IfcType::IfcBuilding,
            "IFCBUILDINGSTOREY" => IfcType::IfcBuildingStorey,
            "IFCSPACE" => IfcType::IfcSpace,

            // Building elements
            "IFCWALL" => IfcType::IfcWall,
            "IFCWALLSTANDARDCASE" => IfcType::IfcWallStandardCase,
            "IFCSLAB" => IfcType::IfcSlab,
            "IFCROOF" => IfcType::IfcRoof,
            "IFCBEAM" => IfcType::IfcBeam,
            "IFCCOLUMN" => IfcType::IfcColumn,
            "IFCDOOR" => IfcType::IfcDoor,
            "IFCWINDOW" => IfcType::IfcWindow,
            "IFCSTAIR" => IfcType::IfcStair,
            "IFCRAILING" => IfcType::IfcRailing,
            "IFCCOVERING" => IfcType::IfcCovering,
            "IFCPLATE" => IfcType::IfcPlate,
            "IFCMEMBER" => IfcType::IfcMember,
            "IFCFURNISHINGELEMENT" => IfcType::IfcFurnishingElement,
            "IFCOPENINGELEMENT" => IfcType::IfcOpeningElement,
            "IFCBUILDINGELEMENTPROXY" => IfcType::IfcBuildingElementProxy,

            // Relationships
            "IFCRELAGGREGATES" => IfcType::IfcRelAggregates,
            "IFCRELCONTAINEDINSPATIALSTRUCTURE" => IfcType::IfcRelContainedInSpatialStructure,
            "IFCRELDEFINESBYPROPERTIES" => IfcType::IfcRelDefinesByProperties,
            "IFCRELDEFINESBYTYPE" => IfcType::IfcRelDefinesByType,
            "IFCRELASSOCIATESMATERIAL" => IfcType::IfcRelAssociatesMaterial,

            // Properties
            "IFCPROPERTYSET" => IfcType::IfcPropertySet,
            "IFCPROPERTYSINGLEVALUE" => IfcType::IfcPropertySingleValue,
            "IFCPROPERTYENUMERATEDVALUE" => IfcType::IfcPropertyEnumeratedValue,
            "IFCPROPERTYBOUNDEDVALUE" => IfcType::IfcPropertyBoundedValue,
            "IFCPROPERTYLISTVALUE" => IfcType::IfcPropertyListValue,
            "IFCPROPERTYTABLEVALUE" => IfcType::IfcPropertyTableValue,
            "IFCCOMPLEXPROPERTY" => IfcType::IfcComplexProperty,
            "IFCELEMENTQUANTITY" => IfcType::IfcElementQuantity,
            "IFCQUANTITYLENGTH" => IfcType::IfcQuantityLength,
            "IFCQUANTITYAREA" => IfcType::IfcQuantityArea,
            "IFCQUANTITYVOLUME" => IfcType::IfcQuantityVolume,
            "IFCQUANTITYCOUNT" => IfcType::IfcQuantityCount,
            "IFCQUANTITYWEIGHT" => IfcType::IfcQuantityWeight,
            "IFCQUANTITYTIME" => IfcType::IfcQuantityTime,

            // Materials
            "IFCMATERIAL" => IfcType::IfcMaterial,
            "IFCMATERIALLAYER" => IfcType::IfcMaterialLayer,
            "IFCMATERIALLAYERSET" => IfcType::IfcMaterialLayerSet,
            "IFCMATERIALLAYERSETUSAGE" => IfcType::IfcMaterialLayerSetUsage,
            "IFCMATERIALLIST" => IfcType::IfcMaterialList,
            "IFCMATERIALPROPERTIES" => IfcType::IfcMaterialProperties,

            // Units
            "IFCSIUNIT" => IfcType::IfcSIUnit,
            "IFCCONVERSIONBASEDUNIT" => IfcType::IfcConversionBasedUnit,

            // Type definitions
            "IFCWALLTYPE" => IfcType::IfcWallType,
            "IFCSLABTYPE" => IfcType::IfcSlabType,
            "IFCBEAMTYPE" => IfcType::IfcBeamType,
            "IFCCOLUMNTYPE" => IfcType::IfcColumnType,
            "IFCDOORTYPE" => IfcType::IfcDoorType,
            "IFCWINDOWTYPE" => IfcType::IfcWindowType,

            // Unknown
            _ => IfcType::Unknown(s.to_string()),
        }
    }

    /// Get the type tag as a string
    pub fn name(&self) -> &str {
        match self {
            IfcType::IfcProject => "IFCPROJECT",
            IfcType::IfcSite => "IFCSITE",
            IfcType::IfcBuilding => "IFCBUILDING",
            IfcType::IfcBuildingStorey => "IFCBUILDINGSTOREY",
            IfcType::IfcSpace => "IFCSPACE",
            IfcType::IfcWall => "IFCWALL",
            IfcType::IfcWallStandardCase => "IFCWALLSTANDARDCASE",
            IfcType::IfcSlab => "IFCSLAB",
            IfcType::IfcRoof => "IFCROOF",
            IfcType::IfcBeam => "IFCBEAM",
            IfcType::IfcColumn => "IFCCOLUMN",
            IfcType::IfcDoor => "IFCDOOR",
            IfcType::IfcWindow => "IFCWINDOW",
            IfcType::IfcStair => "IFCSTAIR",
            IfcType::IfcRailing => "IFCRAILING",
            IfcType::IfcCovering => "IFCCOVERING",
            IfcType::IfcPlate => "IFCPLATE",
            IfcType::IfcMember => "IFCMEMBER",
            IfcType::IfcFurnishingElement => "IFCFURNISHINGELEMENT",
            IfcType::IfcOpeningElement => "IFCOPENINGELEMENT",
            IfcType::IfcBuildingElementProxy => "IFCBUILDINGELEMENTPROXY",
            IfcType::IfcRelAggregates => "IFCRELAGGREGATES",
            IfcType::IfcRelContainedInSpatialStructure => "IFCRELCONTAINEDINSPATIALSTRUCTURE",
            IfcType::IfcRelDefinesByProperties => "IFCRELDEFINESBYPROPERTIES",
            IfcType::IfcRelDefinesByType => "IFCRELDEFINESBYTYPE",
            IfcType::IfcRelAssociatesMaterial => "IFCRELASSOCIATESMATERIAL",
            IfcType::IfcPropertySet => "IFCPROPERTYSET",
            IfcType::IfcPropertySingleValue => "IFCPROPERTYSINGLEVALUE",
            IfcType::IfcPropertyEnumeratedValue => "IFCPROPERTYENUMERATEDVALUE",
            IfcType::IfcPropertyBoundedValue => "IFCPROPERTYBOUNDEDVALUE",
            IfcType::IfcPropertyListValue => "IFCPROPERTYLISTVALUE",
            IfcType::IfcPropertyTableValue => "IFCPROPERTYTABLEVALUE",
            IfcType::IfcComplexProperty => "IFCCOMPLEXPROPERTY",
            IfcType::IfcElementQuantity => "IFCELEMENTQUANTITY",
            IfcType::IfcQuantityLength => "IFCQUANTITYLENGTH",
            IfcType::IfcQuantityArea => "IFCQUANTITYAREA",
            IfcType::IfcQuantityVolume => "IFCQUANTITYVOLUME",
            IfcType::IfcQuantityCount => "IFCQUANTITYCOUNT",
            IfcType::IfcQuantityWeight => "IFCQUANTITYWEIGHT",
            IfcType::IfcQuantityTime => "IFCQUANTITYTIME",
            IfcType::IfcMaterial => "IFCMATERIAL",
            IfcType::IfcMaterialLayer => "IFCMATERIALLAYER",
            IfcType::IfcMaterialLayerSet => "IFCMATERIALLAYERSET",
            IfcType::IfcMaterialLayerSetUsage => "IFCMATERIALLAYERSETUSAGE",
            IfcType::IfcMaterialList => "IFCMATERIALLIST",
            IfcType::IfcMaterialProperties => "IFCMATERIALPROPERTIES",
            IfcType::IfcSIUnit => "IFCSIUNIT",
            IfcType::IfcConversionBasedUnit => "IFCCONVERSIONBASEDUNIT",
            IfcType::IfcWallType => "IFCWALLTYPE",
            IfcType::IfcSlabType => "IFCSLABTYPE",
            IfcType::IfcBeamType => "IFCBEAMTYPE",
            IfcType::IfcColumnType => "IFCCOLUMNTYPE",
            IfcType::IfcDoorType => "IFCDOORTYPE",
            IfcType::IfcWindowType => "IFCWINDOWTYPE",
            IfcType::Unknown(s) => s,
        }
    }

    /// Check if this type is a spatial structure element
    pub fn is_spatial(&self) -> bool {
        matches!(
            self,
            IfcType::IfcProject
                | IfcType::IfcSite
                | IfcType::IfcBuilding
                | IfcType::IfcBuildingStorey
                | IfcType::IfcSpace
        )
    }

    /// Check if this type can contain elements through containment records
    ///
    /// Containment expansion applies at storeys, spaces, buildings, sites and
    /// the generic element placeholder.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            IfcType::IfcSite
                | IfcType::IfcBuilding
                | IfcType::IfcBuildingStorey
                | IfcType::IfcSpace
                | IfcType::IfcBuildingElementProxy
        )
    }

    /// Check if this type is a material definition record
    pub fn is_material(&self) -> bool {
        match self {
            IfcType::IfcMaterial
            | IfcType::IfcMaterialLayer
            | IfcType::IfcMaterialLayerSet
            | IfcType::IfcMaterialLayerSetUsage
            | IfcType::IfcMaterialList
            | IfcType::IfcMaterialProperties => true,
            IfcType::Unknown(s) => s.to_uppercase().starts_with("IFCMATERIAL"),
            _ => false,
        }
    }

    /// Check if this type is a quantity record
    pub fn is_quantity(&self) -> bool {
        matches!(
            self,
            IfcType::IfcQuantityLength
                | IfcType::IfcQuantityArea
                | IfcType::IfcQuantityVolume
                | IfcType::IfcQuantityCount
                | IfcType::IfcQuantityWeight
                | IfcType::IfcQuantityTime
        )
    }
}

impl Default for IfcType {
    fn default() -> Self {
        IfcType::Unknown(String::new())
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
