// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! End-to-end scenarios against `RuleEngine`, one per documented case.

use rulegraph::actions::{Action, CreateNode, CreateRelationship};
use rulegraph::binding::{BindingContext, Bound};
use rulegraph::config::EngineConfig;
use rulegraph::engine::RuleEngine;
use rulegraph::executor::{execute_actions, ExecutionOptions};
use rulegraph::graph::{Graph, Node};
use rulegraph::value::Value;
use std::collections::HashMap;

fn engine() -> RuleEngine {
    RuleEngine::new(EngineConfig::default())
}

#[test]
fn scenario_basic_create() {
    let mut graph = Graph::new();
    let result = engine().execute_query(&mut graph, r#"CREATE (n:NewNode {name: "x"})"#);
    assert!(result.success);
    assert_eq!(result.match_count, 1);
    let nodes = graph.get_all_nodes();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].label, "NewNode");
    assert_eq!(nodes[0].properties.get("name"), Some(&Value::String("x".to_string())));
}

#[test]
fn scenario_comma_separated_match_cross_product() {
    let mut graph = Graph::new();
    for (id, label) in [("person1", "Person"), ("person2", "Person"), ("task1", "Task"), ("task2", "Task")] {
        graph.add_node(Node::new(id, label)).unwrap();
    }
    let result = engine().execute_query(
        &mut graph,
        r#"MATCH (p:Person), (t:Task) CREATE (p)-[r:WORKS_ON {date: "2023-01-15"}]->(t)"#,
    );
    assert!(result.success);
    assert_eq!(result.match_count, 4);
    let mut pairs: Vec<(String, String)> =
        graph.get_all_edges().iter().map(|e| (e.source.clone(), e.target.clone())).collect();
    pairs.sort();
    assert_eq!(
        pairs,
        vec![
            ("person1".to_string(), "task1".to_string()),
            ("person1".to_string(), "task2".to_string()),
            ("person2".to_string(), "task1".to_string()),
            ("person2".to_string(), "task2".to_string()),
        ]
    );
}

#[test]
fn scenario_empty_partner_set() {
    let mut graph = Graph::new();
    graph.add_node(Node::new("p1", "Person")).unwrap();
    let result = engine().execute_query(&mut graph, "MATCH (p:Person), (c:Category) CREATE (p)-[r:BELONGS_TO]->(c)");
    assert!(result.success);
    assert_eq!(result.match_count, 0);
    assert!(graph.get_all_edges().is_empty());
}

#[test]
fn scenario_rollback_on_failure() {
    let mut graph = Graph::new();
    let mut bindings = BindingContext::new();
    let config = EngineConfig::default();

    let actions: Vec<Box<dyn Action>> = vec![
        Box::new(CreateNode { variable: Some("p".into()), label: "Person".into(), properties: HashMap::new() }),
        Box::new(CreateNode { variable: Some("t".into()), label: "Task".into(), properties: HashMap::new() }),
        Box::new(CreateRelationship {
            variable: None,
            from_variable: "p".into(),
            to_variable: "x".into(),
            rel_type: "ASSIGNED".into(),
            properties: HashMap::new(),
        }),
    ];
    let options = ExecutionOptions { validate_before_execute: false, continue_on_failure: false, rollback_on_failure: true };
    let report = execute_actions(&mut graph, &actions, &mut bindings, &config, options);

    assert!(!report.all_succeeded());
    assert!(report.rolled_back);
    assert!(graph.get_all_nodes().is_empty());
    let last_error = report.outcomes.last().and_then(|o| o.error.as_ref()).unwrap();
    assert!(last_error.contains("not found in bindings"), "unexpected error: {last_error}");
}

#[test]
fn scenario_continue_on_failure() {
    let mut graph = Graph::new();
    let mut bindings = BindingContext::new();
    let config = EngineConfig::default();

    let actions: Vec<Box<dyn Action>> = vec![
        Box::new(CreateNode { variable: Some("p".into()), label: "Person".into(), properties: HashMap::new() }),
        Box::new(CreateNode { variable: Some("p".into()), label: "Task".into(), properties: HashMap::new() }),
        Box::new(CreateNode { variable: Some("t".into()), label: "Task".into(), properties: HashMap::new() }),
    ];
    let options = ExecutionOptions { validate_before_execute: true, continue_on_failure: true, rollback_on_failure: false };
    let report = execute_actions(&mut graph, &actions, &mut bindings, &config, options);

    assert!(!report.rolled_back);
    assert!(!report.all_succeeded());
    assert_eq!(report.outcomes.len(), 3);
    assert!(report.outcomes[0].succeeded);
    assert!(!report.outcomes[1].succeeded);
    assert!(report.outcomes[2].succeeded);
    assert_eq!(graph.get_all_nodes().len(), 2);
}

#[test]
fn scenario_where_filter() {
    let mut graph = Graph::new();
    let mut alice = Node::new("alice", "Person");
    alice.properties.insert("name".to_string(), Value::String("Alice".to_string()));
    let mut bob = Node::new("bob", "Person");
    bob.properties.insert("name".to_string(), Value::String("Bob".to_string()));
    graph.add_node(alice).unwrap();
    graph.add_node(bob).unwrap();

    let result = engine().execute_query(&mut graph, r#"MATCH (p:Person) WHERE p.name = "Alice" SET p.status = "Active""#);
    assert!(result.success);
    assert_eq!(result.match_count, 1);
    assert_eq!(
        graph.get_node("alice").unwrap().properties.get("status"),
        Some(&Value::String("Active".to_string()))
    );
    assert!(graph.get_node("bob").unwrap().properties.get("status").is_none());
}

#[test]
fn idempotence_after_clearing_matcher_cache() {
    let mut graph = Graph::new();
    graph.add_node(Node::new("a", "Person")).unwrap();
    graph.add_node(Node::new("b", "Person")).unwrap();

    let engine = engine();
    let first = engine.execute_query(&mut graph, "MATCH (p:Person) SET p.touched = true");
    engine.clear_cache();
    let second = engine.execute_query(&mut graph, "MATCH (p:Person) SET p.touched = true");
    assert_eq!(first.match_count, second.match_count);
}

#[test]
fn undo_record_restores_graph_exactly() {
    let mut graph = Graph::new();
    let mut node = Node::new("a", "Person");
    node.properties.insert("age".to_string(), Value::Number(30.0));
    let before = graph.add_node(node).unwrap().clone();

    let mut bindings = BindingContext::new();
    bindings.set("p", Bound::Node(before.clone()));
    let config = EngineConfig::default();
    let action = rulegraph::actions::SetProperty {
        target_variable: "p".into(),
        key: "age".into(),
        value: rulegraph::expr::Expression::Literal(Value::Number(31.0)),
    };
    let undo = action.execute(&mut graph, &mut bindings, &config).unwrap();
    undo[0].apply(&mut graph);
    assert_eq!(graph.get_node("a").unwrap(), &before);
}
