// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Binding context (component B): an ordered name -> value map scoped to
//! one candidate match. Short-lived — one per binding tuple during rule
//! evaluation, never shared across tuples (spec §5).

use crate::graph::{Edge, Node};
use crate::value::Value;
use indexmap::IndexMap;

/// A path, as produced by the matcher: an alternating node/edge
/// sequence. Values, not stored entities — discarded after use.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Path {
    pub fn start(node: Node) -> Self {
        Self {
            nodes: vec![node],
            edges: Vec::new(),
        }
    }

    pub fn extend(&self, edge: Edge, node: Node) -> Self {
        let mut nodes = self.nodes.clone();
        let mut edges = self.edges.clone();
        edges.push(edge);
        nodes.push(node);
        Self { nodes, edges }
    }

    pub fn last_node(&self) -> &Node {
        self.nodes.last().expect("path always has at least one node")
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn hop_count(&self) -> usize {
        self.edges.len()
    }

    /// Canonical dedup key: joined node ids, then joined
    /// `src-label-tgt` triples for each edge, per spec §4.D.
    pub fn canonical_key(&self) -> String {
        let node_ids: Vec<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let edge_parts: Vec<String> = self
            .edges
            .iter()
            .map(|e| format!("{}-{}-{}", e.source, e.label, e.target))
            .collect();
        format!("{}|{}", node_ids.join(","), edge_parts.join(","))
    }
}

/// A value a binding context may hold under a variable name.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Node(Node),
    Edge(Edge),
    Path(Path),
    Scalar(Value),
}

impl Bound {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Bound::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Bound::Edge(e) => Some(e),
            _ => None,
        }
    }

    /// The entity id, for values that carry one (used by `SET target.key`
    /// where `target` must resolve to a Node or Edge).
    pub fn entity_kind(&self) -> Option<&'static str> {
        match self {
            Bound::Node(_) => Some("Node"),
            Bound::Edge(_) => Some("Edge"),
            _ => None,
        }
    }
}

/// Ordered mapping from rule-local variable names to bound values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingContext {
    values: IndexMap<String, Bound>,
}

impl BindingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Bound> {
        self.values.get(name)
    }

    /// Overwrites any existing binding for `name`.
    pub fn set(&mut self, name: impl Into<String>, value: Bound) {
        self.values.insert(name.into(), value);
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Bound)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copies every entry of `other` into `self`, overwriting on name
    /// conflict. Used by the combiner to unify per-pattern bindings.
    pub fn merge(&mut self, other: &BindingContext) {
        for (name, value) in other.values.iter() {
            self.values.insert(name.clone(), value.clone());
        }
    }
}
