// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Scope Model - Shared types and accessor traits for IFC classification
//!
//! This crate provides the core abstractions for deriving classification and
//! query data from an already-decoded IFC entity graph. It defines the graph
//! accessor trait that decoding backends implement, plus the value, tree and
//! rule types the engines in `ifc-scope-engine` produce and consume.
//!
//! # Architecture
//!
//! - [`ModelGraph`] - entity lookup and relationship helpers over one graph
//! - [`Entity`] / [`AttributeValue`] - decoded entity records
//! - [`SpatialNode`] - the derived spatial containment tree
//! - [`PropertyBag`] / [`ResolvedValue`] - the merged property view
//! - [`Classification`] / [`ClassificationRule`] - rule-driven grouping
//!
//! # Example
//!
//! ```ignore
//! use ifc_scope_model::{ModelGraph, EntityId};
//!
//! fn describe(graph: &dyn ModelGraph, id: EntityId) {
//!     if let Some(entity) = graph.get(id) {
//!         println!("{} is a {}", id, entity.ifc_type);
//!     }
//! }
//! ```

pub mod classify;
pub mod error;
pub mod graph;
pub mod resolved;
pub mod spatial;
pub mod types;
pub mod value;

// Re-export all public types
pub use classify::*;
pub use error::*;
pub use graph::*;
pub use resolved::*;
pub use spatial::*;
pub use types::*;
pub use value::*;
