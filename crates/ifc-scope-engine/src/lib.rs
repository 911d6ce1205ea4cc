// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Scope Engine - classification and query engines over IFC entity graphs
//!
//! Four engines derive structure from an already-decoded entity graph:
//!
//! - [`spatial::build_tree`] - the spatial containment hierarchy
//! - [`properties::resolve`] - the merged property view of one entity
//! - [`rules::apply_rule`] - rule-driven classification across all models
//! - [`search::search`] - batched, cancellable population search
//!
//! Graphs reach the engines through the [`ifc_scope_model::ModelGraph`]
//! trait; [`store::MemoryGraph`] is the bundled in-memory implementation and
//! [`store::ModelSet`] holds the loaded graphs with their trees.
//!
//! # Example
//!
//! ```ignore
//! use ifc_scope_engine::{MemoryGraph, ModelSet, apply_rule};
//! use ifc_scope_model::ModelId;
//! use std::sync::Arc;
//!
//! let mut models = ModelSet::new();
//! models.load(ModelId(0), Arc::new(MemoryGraph::from_entities(entities)))?;
//! let outcome = apply_rule(&rule, &models);
//! outcome.assign_to(&mut classification);
//! ```

pub mod properties;
pub mod rules;
pub mod search;
pub mod spatial;
pub mod store;

#[cfg(test)]
pub(crate) mod fixture;

pub use properties::{resolve, PropertyResolver, DIRECT_GROUP};
pub use rules::{apply_rule, RuleOutcome};
pub use search::{search, CancelToken, SearchOptions, SearchOutcome, SearchProgress};
pub use spatial::build_tree;
pub use store::{LoadedModel, MemoryGraph, ModelSet};
