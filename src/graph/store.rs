// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory graph store (component A). Single source of truth for node
//! and edge identity; patterns and bindings reference entities by id,
//! never by ownership, per the design note in spec §9.

use crate::graph::edge::{Direction, Edge};
use crate::graph::node::{Node, NodeId};
use crate::error::GraphError;
use std::collections::HashMap;

type EdgeKey = (NodeId, NodeId, String);

/// A directed labeled property multigraph, held entirely in memory.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<EdgeKey, Edge>,
    outgoing: HashMap<NodeId, Vec<EdgeKey>>,
    incoming: HashMap<NodeId, Vec<EdgeKey>>,
    /// Bumped on every mutation so the matcher's label/type caches know
    /// to rebuild. Advisory only — correctness never depends on it.
    epoch: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn add_node(&mut self, node: Node) -> Result<&Node, GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        self.epoch += 1;
        Ok(self.nodes.get(&id).expect("just inserted"))
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn get_edge(&self, source: &str, target: &str, label: &str) -> Option<&Edge> {
        self.edges
            .get(&(source.to_string(), target.to_string(), label.to_string()))
    }

    pub fn get_edge_mut(&mut self, source: &str, target: &str, label: &str) -> Option<&mut Edge> {
        self.edges
            .get_mut(&(source.to_string(), target.to_string(), label.to_string()))
    }

    /// Adds an edge, replacing any existing edge sharing the same
    /// `(source, target, label)` triple (spec §9 open-question
    /// resolution: replace, to match the triple-uniqueness invariant).
    pub fn add_edge(&mut self, edge: Edge) -> Result<&Edge, GraphError> {
        if !self.nodes.contains_key(&edge.source) {
            return Err(GraphError::UnknownNode(edge.source.clone()));
        }
        if !self.nodes.contains_key(&edge.target) {
            return Err(GraphError::UnknownNode(edge.target.clone()));
        }
        let key = edge.key();
        if self.edges.insert(key.clone(), edge).is_none() {
            self.outgoing.entry(key.0.clone()).or_default().push(key.clone());
            self.incoming.entry(key.1.clone()).or_default().push(key.clone());
        }
        self.epoch += 1;
        Ok(self.edges.get(&key).expect("just inserted"))
    }

    /// Removes a node and every edge incident to it, atomically.
    pub fn remove_node(&mut self, id: &str) {
        if self.nodes.remove(id).is_none() {
            return;
        }
        let incident: Vec<EdgeKey> = self
            .edges
            .keys()
            .filter(|(s, t, _)| s == id || t == id)
            .cloned()
            .collect();
        for key in incident {
            self.remove_edge_key(&key);
        }
        self.outgoing.remove(id);
        self.incoming.remove(id);
        self.epoch += 1;
    }

    pub fn remove_edge(&mut self, source: &str, target: &str, label: &str) {
        let key = (source.to_string(), target.to_string(), label.to_string());
        if self.edges.contains_key(&key) {
            self.remove_edge_key(&key);
            self.epoch += 1;
        }
    }

    fn remove_edge_key(&mut self, key: &EdgeKey) {
        self.edges.remove(key);
        if let Some(list) = self.outgoing.get_mut(&key.0) {
            list.retain(|k| k != key);
        }
        if let Some(list) = self.incoming.get_mut(&key.1) {
            list.retain(|k| k != key);
        }
    }

    pub fn get_all_nodes(&self) -> Vec<&Node> {
        self.nodes.values().collect()
    }

    pub fn get_all_edges(&self) -> Vec<&Edge> {
        self.edges.values().collect()
    }

    pub fn find_nodes<F>(&self, pred: F) -> Vec<&Node>
    where
        F: Fn(&Node) -> bool,
    {
        self.nodes.values().filter(|n| pred(n)).collect()
    }

    pub fn find_edges<F>(&self, pred: F) -> Vec<&Edge>
    where
        F: Fn(&Edge) -> bool,
    {
        self.edges.values().filter(|e| pred(e)).collect()
    }

    /// Incident edges for `id` by direction: outgoing (`src == id`),
    /// incoming (`tgt == id`), or both.
    pub fn get_edges_for_node(&self, id: &str, direction: Direction) -> Vec<&Edge> {
        let mut keys: Vec<&EdgeKey> = Vec::new();
        if matches!(direction, Direction::Outgoing | Direction::Both) {
            if let Some(list) = self.outgoing.get(id) {
                keys.extend(list.iter());
            }
        }
        if matches!(direction, Direction::Incoming | Direction::Both) {
            if let Some(list) = self.incoming.get(id) {
                keys.extend(list.iter());
            }
        }
        keys.into_iter().filter_map(|k| self.edges.get(k)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_fails_on_unknown_endpoint() {
        let mut g = Graph::new();
        g.add_node(Node::new("a", "Person")).unwrap();
        let err = g.add_edge(Edge::new("a", "b", "KNOWS")).unwrap_err();
        assert_eq!(err, GraphError::UnknownNode("b".to_string()));
    }

    #[test]
    fn add_node_fails_on_duplicate() {
        let mut g = Graph::new();
        g.add_node(Node::new("a", "Person")).unwrap();
        let err = g.add_node(Node::new("a", "Person")).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode("a".to_string()));
    }

    #[test]
    fn remove_node_removes_incident_edges() {
        let mut g = Graph::new();
        g.add_node(Node::new("a", "Person")).unwrap();
        g.add_node(Node::new("b", "Person")).unwrap();
        g.add_edge(Edge::new("a", "b", "KNOWS")).unwrap();
        g.remove_node("a");
        assert!(g.get_edge("a", "b", "KNOWS").is_none());
        assert!(g.get_edges_for_node("b", Direction::Both).is_empty());
    }

    #[test]
    fn add_edge_replaces_existing_triple() {
        let mut g = Graph::new();
        g.add_node(Node::new("a", "Person")).unwrap();
        g.add_node(Node::new("b", "Person")).unwrap();
        g.add_edge(Edge::new("a", "b", "KNOWS")).unwrap();
        let mut replacement = Edge::new("a", "b", "KNOWS");
        replacement
            .properties
            .insert("since".to_string(), crate::value::Value::Number(2020.0));
        g.add_edge(replacement).unwrap();
        assert_eq!(g.get_all_edges().len(), 1);
        assert!(g.get_edge("a", "b", "KNOWS").unwrap().properties.contains_key("since"));
    }

    #[test]
    fn get_edges_for_node_respects_direction() {
        let mut g = Graph::new();
        g.add_node(Node::new("a", "Person")).unwrap();
        g.add_node(Node::new("b", "Person")).unwrap();
        g.add_edge(Edge::new("a", "b", "KNOWS")).unwrap();
        assert_eq!(g.get_edges_for_node("a", Direction::Outgoing).len(), 1);
        assert_eq!(g.get_edges_for_node("a", Direction::Incoming).len(), 0);
        assert_eq!(g.get_edges_for_node("b", Direction::Incoming).len(), 1);
    }
}
