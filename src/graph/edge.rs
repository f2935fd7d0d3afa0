// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Edge entity.

use crate::graph::node::NodeId;
use crate::value::Value;
use std::collections::HashMap;

/// Direction relative to a pivot node, used both by pattern matching and
/// by plain adjacency lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

impl Direction {
    pub fn flipped(self) -> Direction {
        match self {
            Direction::Outgoing => Direction::Incoming,
            Direction::Incoming => Direction::Outgoing,
            Direction::Both => Direction::Both,
        }
    }
}

/// A relationship between two nodes, uniquely identified by
/// `(source, target, label)`. Adding an edge with an existing triple
/// replaces it, per the store's uniqueness invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub label: String,
    pub properties: HashMap<String, Value>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: label.into(),
            properties: HashMap::new(),
        }
    }

    pub fn key(&self) -> (NodeId, NodeId, String) {
        (self.source.clone(), self.target.clone(), self.label.clone())
    }

    /// The endpoint on the opposite side of `from`, or `None` if `from`
    /// is not one of this edge's endpoints.
    pub fn other_end(&self, from: &str) -> Option<&NodeId> {
        if self.source == from {
            Some(&self.target)
        } else if self.target == from {
            Some(&self.source)
        } else {
            None
        }
    }
}
