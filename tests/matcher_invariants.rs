// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Universal invariants over the matcher and combiner, independent of
//! any one rule scenario.

use rulegraph::binding::{Bound, BindingContext};
use rulegraph::combiner::combine;
use rulegraph::config::EngineConfig;
use rulegraph::graph::{Direction, Edge, Graph, Node};
use rulegraph::matcher::PatternMatcher;
use rulegraph::pattern::{HopSpec, NodePattern, PathPattern, RelDirection, RelationshipPattern, Segment};
use rulegraph::value::Value;

fn line_graph(n: usize) -> Graph {
    let mut g = Graph::new();
    for i in 0..n {
        g.add_node(Node::new(format!("n{i}"), "Stop")).unwrap();
    }
    for i in 0..n.saturating_sub(1) {
        g.add_edge(Edge::new(format!("n{i}"), format!("n{}", i + 1), "NEXT")).unwrap();
    }
    g
}

#[test]
fn every_matched_node_satisfies_the_pattern_and_exists_in_graph() {
    let mut graph = line_graph(3);
    graph.add_node(Node::new("other", "Other")).unwrap();
    let matcher = PatternMatcher::new();
    let config = EngineConfig::default();
    let pattern = NodePattern::new().with_label("Stop");

    let found = matcher.find_matching_nodes(&graph, &pattern, &config);
    assert_eq!(found.len(), 3);
    for node in &found {
        assert!(node.has_label("Stop", config.case_insensitive_labels));
        assert!(graph.get_node(&node.id).is_some());
    }
}

#[test]
fn variable_length_paths_never_exceed_max_hops_or_max_depth() {
    let graph = line_graph(6);
    let matcher = PatternMatcher::new();
    let mut config = EngineConfig::default();
    config.max_path_depth = 4;
    let pattern = PathPattern {
        start: NodePattern::new().with_variable("a"),
        segments: vec![Segment {
            relationship: RelationshipPattern {
                direction: RelDirection::Outgoing,
                hops: HopSpec { min_hops: Some(1), max_hops: Some(10) },
                ..Default::default()
            },
            node: NodePattern::new().with_variable("b"),
        }],
    };
    let paths = matcher.find_matching_paths(&graph, &pattern, &config).unwrap();
    assert!(!paths.is_empty());
    for path in &paths {
        assert!(path.hop_count() <= 10);
        assert!(path.hop_count() <= config.max_path_depth);
    }
}

#[test]
fn combiner_yields_product_of_per_pattern_counts() {
    let mut ctx = |n: f64| {
        let mut c = BindingContext::new();
        c.set("x", Bound::Scalar(Value::Number(n)));
        c
    };
    let a = vec![ctx(1.0), ctx(2.0), ctx(3.0)];
    let b = vec![ctx(10.0), ctx(20.0)];
    let combined = combine(&[a.clone(), b.clone()]);
    assert_eq!(combined.len(), a.len() * b.len());
}

#[test]
fn combiner_is_zero_when_any_pattern_set_is_empty() {
    let mut ctx = BindingContext::new();
    ctx.set("x", Bound::Scalar(Value::Number(1.0)));
    let combined = combine(&[vec![ctx], Vec::new()]);
    assert!(combined.is_empty());
}

#[test]
fn incoming_direction_flips_adjacency_from_source() {
    let mut graph = Graph::new();
    graph.add_node(Node::new("a", "N")).unwrap();
    graph.add_node(Node::new("b", "N")).unwrap();
    graph.add_edge(Edge::new("a", "b", "R")).unwrap();

    let matcher = PatternMatcher::new();
    let config = EngineConfig::default();
    let pattern = RelationshipPattern { direction: RelDirection::Incoming, ..Default::default() };
    let incoming_to_b = matcher.find_matching_relationships(&graph, &pattern, Some("b"), &config);
    assert_eq!(incoming_to_b.len(), 1);
    let incoming_to_a = matcher.find_matching_relationships(&graph, &pattern, Some("a"), &config);
    assert!(incoming_to_a.is_empty());
    assert_eq!(graph.get_edges_for_node("b", Direction::Incoming).len(), 1);
}
