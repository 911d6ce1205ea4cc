// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Search/filter engine
//!
//! Scans the loaded populations for a pattern match against any resolved
//! property and reports the entities to hide. The scan runs in fixed-size
//! batches with a yield point between them so a host thread can repaint,
//! report progress and cancel cooperatively. Batch results are merged into
//! the accumulator only after the whole batch completes.

use crate::properties::resolve;
use crate::store::ModelSet;
use ifc_scope_model::{EntityRef, ModelGraph, ModelId, ResolvedValue, SpatialNode};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Search tuning knobs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Entities checked per batch
    pub batch_size: usize,
    /// Stop scanning once this many matches are found; remaining entities
    /// count as non-matches. `None` scans everything.
    pub max_matches: Option<usize>,
    /// Also test group and property names, not just values
    pub match_names: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            batch_size: 64,
            max_matches: None,
            match_names: false,
        }
    }
}

/// Cooperative cancellation flag
///
/// Checked at batch boundaries; in-flight checks within the current batch
/// run to completion.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an untriggered token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Progress callback receiving (scanned, total) after each batch
pub type SearchProgress = Box<dyn Fn(usize, usize) + Send>;

/// Result of one search run
///
/// `hidden` holds every scanned non-match plus, after an early stop, the
/// entities that were never scanned (a user-visible approximation, not a
/// correctness bug). Entities with no tree node are outside the population
/// and therefore hidden by construction. A cancelled run returns the
/// accumulator as-is; entities beyond the last completed batch stay
/// untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchOutcome {
    /// Entities to hide
    pub hidden: BTreeSet<EntityRef>,
    /// Number of matching entities found
    pub matches: usize,
    /// Number of entities actually checked
    pub scanned: usize,
    /// The match cap stopped the scan before the whole population was checked
    pub early_stopped: bool,
    /// Cancellation stopped the scan
    pub cancelled: bool,
    /// Entities whose check failed on a broken lookup (counted as non-matches)
    pub failures: usize,
}

/// Scan all loaded models for entities matching a pattern
///
/// The pattern is matched case-insensitively anywhere in a value; `*` acts
/// as a wildcard. A pattern that fails to compile after translation falls
/// back to a literal search. The empty pattern matches everything and hides
/// nothing.
pub async fn search(
    pattern: &str,
    models: &ModelSet,
    options: &SearchOptions,
    progress: Option<SearchProgress>,
    cancel: &CancelToken,
) -> SearchOutcome {
    let mut outcome = SearchOutcome::default();
    if pattern.is_empty() {
        return outcome;
    }

    let regex = compile_pattern(pattern);
    let population: Vec<(ModelId, &Arc<dyn ModelGraph>, &SpatialNode)> = models
        .models()
        .iter()
        .flat_map(|m| m.tree.iter().map(move |node| (m.id, &m.graph, node)))
        .collect();
    let total = population.len();
    let batch_size = options.batch_size.max(1);

    let mut index = 0;
    while index < total {
        if cancel.is_cancelled() {
            outcome.cancelled = true;
            break;
        }

        let end = (index + batch_size).min(total);
        let batch = &population[index..end];
        let checks = batch.iter().map(|(_, graph, node)| {
            let regex = &regex;
            async move { check_node(regex, graph.as_ref(), node, options.match_names) }
        });
        let results = futures::future::join_all(checks).await;

        for ((model_id, _, node), result) in batch.iter().zip(results) {
            outcome.scanned += 1;
            match result {
                Check::Matched => outcome.matches += 1,
                Check::NotMatched => {
                    outcome.hidden.insert(EntityRef::new(*model_id, node.id));
                }
                Check::Failed => {
                    outcome.failures += 1;
                    outcome.hidden.insert(EntityRef::new(*model_id, node.id));
                }
            }
        }
        index = end;

        if let Some(report) = &progress {
            report(outcome.scanned, total);
        }

        if let Some(cap) = options.max_matches {
            if outcome.matches >= cap && index < total {
                outcome.early_stopped = true;
                for (model_id, _, node) in &population[index..] {
                    outcome.hidden.insert(EntityRef::new(*model_id, node.id));
                }
                break;
            }
        }

        tokio::task::yield_now().await;
    }

    debug!(
        pattern,
        scanned = outcome.scanned,
        matches = outcome.matches,
        hidden = outcome.hidden.len(),
        early_stopped = outcome.early_stopped,
        cancelled = outcome.cancelled,
        "search finished"
    );
    outcome
}

/// Compile the search pattern, translating `*` wildcards and falling back
/// to a literal match when the translated pattern is not a valid expression
fn compile_pattern(pattern: &str) -> Regex {
    let translated = pattern.replace('*', ".*");
    RegexBuilder::new(&translated)
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|_| {
            trace!(pattern, "pattern fell back to literal match");
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
                .expect("escaped pattern is always a valid expression")
        })
}

enum Check {
    Matched,
    NotMatched,
    Failed,
}

/// Two-tier check: quick tree-node fields first, full property resolution
/// only when they miss
fn check_node(regex: &Regex, graph: &dyn ModelGraph, node: &SpatialNode, match_names: bool) -> Check {
    let quick_hit = node.name.as_deref().is_some_and(|s| regex.is_match(s))
        || regex.is_match(&node.type_tag)
        || node.global_id.as_deref().is_some_and(|s| regex.is_match(s));
    if quick_hit {
        return Check::Matched;
    }

    if graph.get(node.id).is_none() {
        return Check::Failed;
    }

    let bag = resolve(graph, node.id);
    for group in &bag.groups {
        if match_names && regex.is_match(&group.name) {
            return Check::Matched;
        }
        for (key, value) in &group.entries {
            if match_names && regex.is_match(key) {
                return Check::Matched;
            }
            if value_matches(regex, value) {
                return Check::Matched;
            }
        }
    }
    Check::NotMatched
}

fn value_matches(regex: &Regex, value: &ResolvedValue) -> bool {
    value.scalars().any(|s| regex.is_match(&s.to_string()))
        || regex.is_match(&value.to_string())
}
