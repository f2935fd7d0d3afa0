// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pattern types (data model §3): the shapes a MATCH clause is built
//! from. Modeled as plain structs carrying optional variable/label/
//! property constraints, per the "tagged variants, not a class
//! hierarchy" design note in spec §9 — `PatternElement` is the one place
//! that actually needs a discriminated union.

use crate::graph::Direction;
use crate::value::Value;
use std::collections::HashMap;

/// A property-value constraint: either an exact value, or an arbitrary
/// expression to be evaluated against the current bindings (used by
/// `enrichPatternWithBindings`, which injects `id` constraints).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyConstraint {
    Exact(Value),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePattern {
    pub variable: Option<String>,
    pub labels: Vec<String>,
    pub properties: HashMap<String, PropertyConstraint>,
}

impl NodePattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variable = Some(name.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), PropertyConstraint::Exact(value));
        self
    }

    /// Returns a clone with an `id` property constraint set, used to
    /// pin the pattern to a single already-bound node.
    pub fn pinned_to_id(&self, id: impl Into<String>) -> Self {
        let mut clone = self.clone();
        clone.properties.insert("id".to_string(), PropertyConstraint::Exact(Value::String(id.into())));
        clone
    }
}

/// `minHops`/`maxHops` bounds for a relationship pattern. `None` means
/// "use the spec default" (`minHops` defaults to 1; `maxHops` defaults
/// to `minHops` for fixed-length, unbounded for `*`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HopSpec {
    pub min_hops: Option<usize>,
    pub max_hops: Option<usize>,
}

impl HopSpec {
    /// A plain `-[:TYPE]->` segment with no `*`: exactly one hop.
    pub const FIXED: HopSpec = HopSpec { min_hops: Some(1), max_hops: Some(1) };

    /// Resolves defaults: `minHops` defaults to 1; `maxHops` of `None`
    /// means unbounded (a bare `*` or `*N..`), not "equal to minHops" —
    /// the parser always sets both fields explicitly for fixed segments.
    pub fn resolved(&self) -> (usize, Option<usize>) {
        (self.min_hops.unwrap_or(1), self.max_hops)
    }

    /// A segment is "variable" iff `(minHops, maxHops) != (1, 1)`.
    pub fn is_variable(&self) -> bool {
        let (min, max) = self.resolved();
        !(min == 1 && max == Some(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipPattern {
    pub variable: Option<String>,
    pub rel_type: Option<String>,
    pub properties: HashMap<String, PropertyConstraint>,
    pub direction: RelDirection,
    pub hops: HopSpec,
}

impl Default for HopSpec {
    fn default() -> Self {
        HopSpec::FIXED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelDirection {
    #[default]
    Outgoing,
    Incoming,
    Both,
}

impl From<RelDirection> for Direction {
    fn from(value: RelDirection) -> Self {
        match value {
            RelDirection::Outgoing => Direction::Outgoing,
            RelDirection::Incoming => Direction::Incoming,
            RelDirection::Both => Direction::Both,
        }
    }
}

/// One `(relationship, node)` pair in a path pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub relationship: RelationshipPattern,
    pub node: NodePattern,
}

/// A start node pattern plus an ordered list of segments.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPattern {
    pub start: NodePattern,
    pub segments: Vec<Segment>,
}

impl PathPattern {
    pub fn node_only(start: NodePattern) -> Self {
        Self { start, segments: Vec::new() }
    }

    pub fn is_node_only(&self) -> bool {
        self.segments.is_empty()
    }
}
