// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Actions (component F): the three mutation primitives a rule body can
//! perform. Each evaluates its property expressions against the current
//! bindings before touching the graph, and returns the undo records the
//! executor needs to roll a transaction back — generalizing the undo
//! bookkeeping `match_insert.rs`/`match_set.rs` do inline into a
//! reusable shape shared by every action kind.

use crate::binding::{BindingContext, Bound};
use crate::config::EngineConfig;
use crate::error::{ActionError, EvalError};
use crate::expr::{self, Expression};
use crate::graph::{Edge, Graph, Node, NodeId};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Allocates fresh node/edge identifiers. Swappable via `EngineConfig`.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Default generator: a monotonic counter prefixed so ids stay distinct
/// from any user-supplied id in typical test fixtures.
pub struct CounterIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl CounterIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), counter: AtomicU64::new(0) }
    }
}

impl Default for CounterIdGenerator {
    fn default() -> Self {
        Self::new("n")
    }
}

impl IdGenerator for CounterIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{n}", self.prefix)
    }
}

/// Generates ids from random UUIDs. Opt-in via `EngineConfig`, useful
/// when rule text must not assume id allocation order.
#[derive(Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// What entity a `SetProperty`/`CreateRelationship` undo record applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRef {
    Node(NodeId),
    Edge(NodeId, NodeId, String),
}

/// A reversible step recorded by an action's `execute`. The executor
/// applies these in reverse order to roll back a failed transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoRecord {
    RemoveNode(NodeId),
    RemoveEdge(NodeId, NodeId, String),
    /// An edge create replaced an existing triple; restores the prior
    /// edge verbatim rather than just deleting the replacement.
    ReplaceEdge(Edge),
    RestorePropertyValue { target: EntityRef, key: String, previous: Option<Value> },
}

impl UndoRecord {
    pub fn apply(&self, graph: &mut Graph) {
        match self {
            UndoRecord::RemoveNode(id) => graph.remove_node(id),
            UndoRecord::RemoveEdge(s, t, l) => graph.remove_edge(s, t, l),
            UndoRecord::ReplaceEdge(edge) => {
                let _ = graph.add_edge(edge.clone());
            }
            UndoRecord::RestorePropertyValue { target, key, previous } => {
                let props = match target {
                    EntityRef::Node(id) => graph.get_node_mut(id).map(|n| &mut n.properties),
                    EntityRef::Edge(s, t, l) => graph.get_edge_mut(s, t, l).map(|e| &mut e.properties),
                };
                if let Some(props) = props {
                    match previous {
                        Some(v) => {
                            props.insert(key.clone(), v.clone());
                        }
                        None => {
                            props.remove(key);
                        }
                    }
                }
            }
        }
    }
}

/// Result of `validate`: either the action may proceed, or a list of
/// human-readable reasons it must not.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn ok() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self { errors: vec![reason.into()] }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn eval_properties(
    properties: &HashMap<String, Expression>,
    bindings: &BindingContext,
    config: &EngineConfig,
) -> Result<HashMap<String, Value>, EvalError> {
    properties
        .iter()
        .map(|(k, expr)| Ok((k.clone(), expr::evaluate(expr, bindings, config)?)))
        .collect()
}

/// Shared surface every action kind implements.
pub trait Action: fmt::Debug {
    fn validate(&self, graph: &Graph, bindings: &BindingContext, config: &EngineConfig) -> ValidationReport;
    fn execute(
        &self,
        graph: &mut Graph,
        bindings: &mut BindingContext,
        config: &EngineConfig,
    ) -> Result<Vec<UndoRecord>, ActionError>;
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct CreateNode {
    pub variable: Option<String>,
    pub label: String,
    pub properties: HashMap<String, Expression>,
}

impl Action for CreateNode {
    fn validate(&self, _graph: &Graph, bindings: &BindingContext, config: &EngineConfig) -> ValidationReport {
        let mut errors = Vec::new();
        if self.label.is_empty() {
            errors.push("node label must be a non-empty string".to_string());
        }
        if let Some(var) = &self.variable {
            if bindings.has(var) {
                errors.push(format!("variable '{var}' is already bound"));
            }
        }
        if let Err(e) = eval_properties(&self.properties, bindings, config) {
            errors.push(e.to_string());
        }
        ValidationReport { errors }
    }

    fn execute(
        &self,
        graph: &mut Graph,
        bindings: &mut BindingContext,
        config: &EngineConfig,
    ) -> Result<Vec<UndoRecord>, ActionError> {
        let properties = eval_properties(&self.properties, bindings, config)?;
        let id = config.id_generator.next_id();
        let mut node = Node::new(id, &self.label);
        node.properties = properties;
        let created = graph.add_node(node)?.clone();
        if let Some(var) = &self.variable {
            bindings.set(var.clone(), Bound::Node(created.clone()));
        }
        Ok(vec![UndoRecord::RemoveNode(created.id)])
    }

    fn describe(&self) -> String {
        format!("CREATE (:{})", self.label)
    }
}

#[derive(Debug, Clone)]
pub struct CreateRelationship {
    pub variable: Option<String>,
    pub from_variable: String,
    pub to_variable: String,
    pub rel_type: String,
    pub properties: HashMap<String, Expression>,
}

fn resolve_node_id(bindings: &BindingContext, variable: &str) -> Result<NodeId, ActionError> {
    match bindings.get(variable) {
        Some(Bound::Node(n)) => Ok(n.id.clone()),
        Some(_) => Err(ActionError::ExecutionFailed {
            action: "CreateRelationship".to_string(),
            reason: format!("'{variable}' is not bound to a node"),
        }),
        None => Err(ActionError::Eval(EvalError::UnboundVariable(variable.to_string()))),
    }
}

impl Action for CreateRelationship {
    fn validate(&self, _graph: &Graph, bindings: &BindingContext, config: &EngineConfig) -> ValidationReport {
        let mut errors = Vec::new();
        if resolve_node_id(bindings, &self.from_variable).is_err() {
            errors.push(format!("'{}' is not a bound node", self.from_variable));
        }
        if resolve_node_id(bindings, &self.to_variable).is_err() {
            errors.push(format!("'{}' is not a bound node", self.to_variable));
        }
        if let Err(e) = eval_properties(&self.properties, bindings, config) {
            errors.push(e.to_string());
        }
        ValidationReport { errors }
    }

    fn execute(
        &self,
        graph: &mut Graph,
        bindings: &mut BindingContext,
        config: &EngineConfig,
    ) -> Result<Vec<UndoRecord>, ActionError> {
        let source = resolve_node_id(bindings, &self.from_variable)?;
        let target = resolve_node_id(bindings, &self.to_variable)?;
        let properties = eval_properties(&self.properties, bindings, config)?;
        let previous = graph.get_edge(&source, &target, &self.rel_type).cloned();

        let mut edge = Edge::new(source, target, &self.rel_type);
        edge.properties = properties;
        let created = graph.add_edge(edge)?.clone();
        if let Some(var) = &self.variable {
            bindings.set(var.clone(), Bound::Edge(created.clone()));
        }
        let undo = match previous {
            Some(prior) => UndoRecord::ReplaceEdge(prior),
            None => UndoRecord::RemoveEdge(created.source, created.target, created.label),
        };
        Ok(vec![undo])
    }

    fn describe(&self) -> String {
        format!("CREATE ({})-[:{}]->({})", self.from_variable, self.rel_type, self.to_variable)
    }
}

#[derive(Debug, Clone)]
pub struct SetProperty {
    pub target_variable: String,
    pub key: String,
    pub value: Expression,
}

fn resolve_entity(bindings: &BindingContext, variable: &str) -> Result<EntityRef, ActionError> {
    match bindings.get(variable) {
        Some(Bound::Node(n)) => Ok(EntityRef::Node(n.id.clone())),
        Some(Bound::Edge(e)) => Ok(EntityRef::Edge(e.source.clone(), e.target.clone(), e.label.clone())),
        Some(_) => Err(ActionError::ExecutionFailed {
            action: "SetProperty".to_string(),
            reason: format!("'{variable}' is not a node or relationship"),
        }),
        None => Err(ActionError::Eval(EvalError::UnboundVariable(variable.to_string()))),
    }
}

impl Action for SetProperty {
    fn validate(&self, _graph: &Graph, bindings: &BindingContext, config: &EngineConfig) -> ValidationReport {
        let mut errors = Vec::new();
        if resolve_entity(bindings, &self.target_variable).is_err() {
            errors.push(format!("'{}' is not a bound node or relationship", self.target_variable));
        }
        if let Err(e) = expr::evaluate(&self.value, bindings, config) {
            errors.push(e.to_string());
        }
        ValidationReport { errors }
    }

    fn execute(
        &self,
        graph: &mut Graph,
        bindings: &mut BindingContext,
        config: &EngineConfig,
    ) -> Result<Vec<UndoRecord>, ActionError> {
        let target = resolve_entity(bindings, &self.target_variable)?;
        let value = expr::evaluate(&self.value, bindings, config)?;
        let properties = match &target {
            EntityRef::Node(id) => {
                &mut graph.get_node_mut(id).ok_or_else(|| crate::error::GraphError::UnknownNode(id.clone()))?.properties
            }
            EntityRef::Edge(s, t, l) => {
                &mut graph
                    .get_edge_mut(s, t, l)
                    .ok_or_else(|| crate::error::GraphError::UnknownNode(format!("{s}-{l}-{t}")))?
                    .properties
            }
        };
        let previous = properties.insert(self.key.clone(), value);
        Ok(vec![UndoRecord::RestorePropertyValue { target, key: self.key.clone(), previous }])
    }

    fn describe(&self) -> String {
        format!("SET {}.{}", self.target_variable, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node as GNode;

    #[test]
    fn create_node_binds_variable_and_allocates_id() {
        let mut graph = Graph::new();
        let mut bindings = BindingContext::new();
        let config = EngineConfig::default();
        let action = CreateNode { variable: Some("n".into()), label: "Person".into(), properties: HashMap::new() };
        let undo = action.execute(&mut graph, &mut bindings, &config).unwrap();
        assert_eq!(undo.len(), 1);
        assert!(bindings.get("n").is_some());
        assert_eq!(graph.get_all_nodes().len(), 1);
    }

    #[test]
    fn create_relationship_fails_when_endpoints_unbound() {
        let mut graph = Graph::new();
        let mut bindings = BindingContext::new();
        let config = EngineConfig::default();
        let action = CreateRelationship {
            variable: None,
            from_variable: "a".into(),
            to_variable: "b".into(),
            rel_type: "KNOWS".into(),
            properties: HashMap::new(),
        };
        assert!(action.execute(&mut graph, &mut bindings, &config).is_err());
    }

    #[test]
    fn set_property_undo_restores_previous_value() {
        let mut graph = Graph::new();
        let mut node = GNode::new("a", "Person");
        node.properties.insert("age".into(), Value::Number(30.0));
        graph.add_node(node).unwrap();
        let mut bindings = BindingContext::new();
        bindings.set("p", Bound::Node(graph.get_node("a").unwrap().clone()));
        let config = EngineConfig::default();

        let action = SetProperty { target_variable: "p".into(), key: "age".into(), value: Expression::Literal(Value::Number(31.0)) };
        let undo = action.execute(&mut graph, &mut bindings, &config).unwrap();
        assert_eq!(graph.get_node("a").unwrap().properties.get("age"), Some(&Value::Number(31.0)));

        undo[0].apply(&mut graph);
        assert_eq!(graph.get_node("a").unwrap().properties.get("age"), Some(&Value::Number(30.0)));
    }

    #[test]
    fn create_relationship_undo_removes_fresh_edge() {
        let mut graph = Graph::new();
        graph.add_node(GNode::new("a", "Person")).unwrap();
        graph.add_node(GNode::new("b", "Person")).unwrap();
        let mut bindings = BindingContext::new();
        bindings.set("a", Bound::Node(graph.get_node("a").unwrap().clone()));
        bindings.set("b", Bound::Node(graph.get_node("b").unwrap().clone()));
        let config = EngineConfig::default();

        let action = CreateRelationship {
            variable: None,
            from_variable: "a".into(),
            to_variable: "b".into(),
            rel_type: "KNOWS".into(),
            properties: HashMap::new(),
        };
        let undo = action.execute(&mut graph, &mut bindings, &config).unwrap();
        assert!(graph.get_edge("a", "b", "KNOWS").is_some());
        undo[0].apply(&mut graph);
        assert!(graph.get_edge("a", "b", "KNOWS").is_none());
    }
}
