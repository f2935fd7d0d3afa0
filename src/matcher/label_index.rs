// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Lazily-populated label/type caches for the matcher. Advisory only:
//! correctness must never depend on cache freshness (spec §9). Cached by
//! the graph's mutation epoch; any change to the epoch triggers a bulk
//! rebuild rather than fine-grained invalidation, per spec §5.

use crate::graph::{Graph, NodeId};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Default)]
struct Cached {
    built_for_epoch: Option<u64>,
    by_label: HashMap<String, Vec<NodeId>>,
    by_type: HashMap<String, Vec<(NodeId, NodeId, String)>>,
}

/// Per-matcher cache. `RefCell` because lookups are logically read-only
/// from the caller's perspective but rebuild the index on first access
/// or after a graph mutation.
#[derive(Default)]
pub struct LabelIndex {
    cached: RefCell<Cached>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        *self.cached.borrow_mut() = Cached::default();
    }

    fn ensure_fresh(&self, graph: &Graph, case_insensitive: bool) {
        let mut cached = self.cached.borrow_mut();
        if cached.built_for_epoch == Some(graph.epoch()) {
            return;
        }
        cached.by_label.clear();
        cached.by_type.clear();
        for node in graph.get_all_nodes() {
            for label in node.all_labels() {
                let key = normalize(&label, case_insensitive);
                cached.by_label.entry(key).or_default().push(node.id.clone());
            }
        }
        for edge in graph.get_all_edges() {
            let key = normalize(&edge.label, case_insensitive);
            cached.by_type.entry(key).or_default().push(edge.key());
        }
        cached.built_for_epoch = Some(graph.epoch());
    }

    pub fn nodes_with_label(&self, graph: &Graph, label: &str, case_insensitive: bool) -> Vec<NodeId> {
        self.ensure_fresh(graph, case_insensitive);
        let key = normalize(label, case_insensitive);
        self.cached.borrow().by_label.get(&key).cloned().unwrap_or_default()
    }

    pub fn edges_with_type(
        &self,
        graph: &Graph,
        rel_type: &str,
        case_insensitive: bool,
    ) -> Vec<(NodeId, NodeId, String)> {
        self.ensure_fresh(graph, case_insensitive);
        let key = normalize(rel_type, case_insensitive);
        self.cached.borrow().by_type.get(&key).cloned().unwrap_or_default()
    }
}

fn normalize(s: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        s.to_ascii_lowercase()
    } else {
        s.to_string()
    }
}
