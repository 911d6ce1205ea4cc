// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for graph-derivation operations
//!
//! Only structural problems surface as errors. Resolution gaps become
//! sentinel values, cycles become sentinels, and per-entity match failures
//! are counted; none of those abort a run.

use crate::EntityId;
use thiserror::Error;

/// Result type alias for structural operations
pub type Result<T> = std::result::Result<T, StructureError>;

/// Errors that can occur while deriving structure from a graph
#[derive(Error, Debug)]
pub enum StructureError {
    /// The graph has no root project entity
    #[error("graph has no root project entity")]
    NoRoot,

    /// The graph has several top-level project entities
    #[error("expected exactly one root project entity, found {0}")]
    MultipleRoots(usize),

    /// A relationship record is missing its relating or related side
    #[error("malformed relationship record {rel}: {detail}")]
    MalformedRelationship { rel: EntityId, detail: String },
}

impl StructureError {
    /// Create a malformed-relationship error
    pub fn malformed(rel: EntityId, detail: impl Into<String>) -> Self {
        StructureError::MalformedRelationship {
            rel,
            detail: detail.into(),
        }
    }
}
