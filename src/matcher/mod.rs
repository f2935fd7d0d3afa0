// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pattern matcher (component D) — the hardest subsystem. Enumerates
//! nodes, relationships, and paths satisfying a pattern, honoring
//! pre-bound variables. Generalizes `graphlite`'s single-hop
//! `execute_indexed_expand` (`plan/physical_executor.rs`) into the full
//! variable-length BFS walk spec §4.D requires.

mod label_index;

use crate::binding::{BindingContext, Path};
use crate::config::EngineConfig;
use crate::error::MatchError;
use crate::graph::{Direction, Edge, Graph, Node};
use crate::pattern::{HopSpec, NodePattern, PathPattern, PropertyConstraint, RelationshipPattern};
use crate::value::Value;
use label_index::LabelIndex;
use std::collections::HashSet;
use std::collections::VecDeque;

/// Stateful matcher wrapping a label/type cache. One instance is
/// typically kept alongside a `Graph` across many rule evaluations.
#[derive(Default)]
pub struct PatternMatcher {
    index: LabelIndex,
}

impl PatternMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the cached label/type index, forcing a rebuild on next use.
    /// Correctness never depends on calling this — it exists for the
    /// idempotence property the suite checks (spec §8).
    pub fn clear_cache(&self) {
        self.index.clear();
    }

    pub fn find_matching_nodes(&self, graph: &Graph, pattern: &NodePattern, config: &EngineConfig) -> Vec<Node> {
        let candidates: Vec<&Node> = if let Some(PropertyConstraint::Exact(Value::String(id))) =
            pattern.properties.get("id")
        {
            graph.get_node(id).into_iter().collect()
        } else if !pattern.labels.is_empty() {
            let mut seen = HashSet::new();
            let mut out = Vec::new();
            for label in &pattern.labels {
                for id in self.index.nodes_with_label(graph, label, config.case_insensitive_labels) {
                    if seen.insert(id.clone()) {
                        if let Some(n) = graph.get_node(&id) {
                            out.push(n);
                        }
                    }
                }
            }
            out
        } else {
            graph.get_all_nodes()
        };

        candidates
            .into_iter()
            .filter(|n| matches_node_pattern(n, pattern, config))
            .cloned()
            .collect()
    }

    pub fn find_matching_relationships(
        &self,
        graph: &Graph,
        pattern: &RelationshipPattern,
        source_id: Option<&str>,
        config: &EngineConfig,
    ) -> Vec<Edge> {
        let candidates: Vec<Edge> = if let Some(id) = source_id {
            // `Direction::Incoming` already means "edges whose target is
            // `id`", so no extra flip is needed here beyond the mapping.
            let dir: Direction = pattern.direction.into();
            graph.get_edges_for_node(id, dir).into_iter().cloned().collect()
        } else if let Some(rel_type) = &pattern.rel_type {
            self.index
                .edges_with_type(graph, rel_type, config.case_insensitive_labels)
                .into_iter()
                .filter_map(|(s, t, l)| graph.get_edge(&s, &t, &l).cloned())
                .collect()
        } else {
            graph.get_all_edges().into_iter().cloned().collect()
        };

        candidates
            .into_iter()
            .filter(|e| matches_relationship_pattern(e, pattern, config))
            .collect()
    }

    pub fn find_matching_paths(
        &self,
        graph: &Graph,
        pattern: &PathPattern,
        config: &EngineConfig,
    ) -> Result<Vec<Path>, MatchError> {
        if pattern.segments.is_empty() {
            return Ok(self
                .find_matching_nodes(graph, &pattern.start, config)
                .into_iter()
                .map(Path::start)
                .collect());
        }

        let mut results: Vec<Path> = Vec::new();
        let mut seen_keys: HashSet<String> = HashSet::new();

        for start in self.find_matching_nodes(graph, &pattern.start, config) {
            let start_id = start.id.clone();
            let mut visited = HashSet::new();
            visited.insert(start_id.clone());
            let mut queue: VecDeque<(Path, usize, usize, HashSet<String>)> = VecDeque::new();
            queue.push_back((Path::start(start), 0, 0, visited));

            while let Some((path, segment_index, hops_in_segment, visited)) = queue.pop_front() {
                if results.len() >= config.max_path_results {
                    break;
                }
                if path.hop_count() >= config.max_path_depth {
                    continue;
                }
                let segment = &pattern.segments[segment_index];
                let (min_hops, max_hops) = segment.relationship.hops.resolved();
                let is_variable = segment.relationship.hops.is_variable();
                let is_final_segment = segment_index == pattern.segments.len() - 1;
                let current_id = path.last_node().id.clone();

                let direction: Direction = segment.relationship.direction.into();
                for edge in graph.get_edges_for_node(&current_id, direction) {
                    if !matches_relationship_pattern(edge, &segment.relationship, config) {
                        continue;
                    }
                    let neighbor_id = match edge.other_end(&current_id) {
                        Some(id) => id.clone(),
                        None => continue,
                    };
                    let neighbor = match graph.get_node(&neighbor_id) {
                        Some(n) => n.clone(),
                        None => continue,
                    };

                    let next_hops = hops_in_segment + 1;
                    let tentative = path.extend(edge.clone(), neighbor.clone());

                    // complete: final segment, enough hops, target matches.
                    if is_final_segment
                        && next_hops >= min_hops
                        && matches_node_pattern(&neighbor, &segment.node, config)
                    {
                        let key = tentative.canonical_key();
                        if seen_keys.insert(key) {
                            results.push(tentative.clone());
                            if results.len() >= config.max_path_results {
                                break;
                            }
                        }
                    }

                    // extend: variable segment, still under max, no cycle.
                    if is_variable
                        && next_hops < max_hops.unwrap_or(usize::MAX)
                        && !visited.contains(&neighbor_id)
                        && tentative.hop_count() < config.max_path_depth
                    {
                        let mut next_visited = visited.clone();
                        next_visited.insert(neighbor_id.clone());
                        queue.push_back((tentative.clone(), segment_index, next_hops, next_visited));
                    }

                    // advance: enough hops, target matches, not final, no cycle.
                    if !is_final_segment
                        && next_hops >= min_hops
                        && matches_node_pattern(&neighbor, &segment.node, config)
                        && !visited.contains(&neighbor_id)
                    {
                        let mut next_visited = visited.clone();
                        next_visited.insert(neighbor_id.clone());
                        queue.push_back((tentative, segment_index + 1, 0, next_visited));
                    }
                }
                if results.len() >= config.max_path_results {
                    break;
                }
            }
            if results.len() >= config.max_path_results {
                break;
            }
        }

        results.truncate(config.max_path_results);
        Ok(results)
    }

    /// Returns a clone of `pattern` where every node pattern whose
    /// variable is already bound gains an `id` constraint equal to the
    /// bound node's id — drives pre-joined pattern evaluation.
    pub fn enrich_pattern_with_bindings(&self, pattern: &PathPattern, bindings: &BindingContext) -> PathPattern {
        let start = enrich_node(&pattern.start, bindings);
        let segments = pattern
            .segments
            .iter()
            .map(|seg| crate::pattern::Segment {
                relationship: seg.relationship.clone(),
                node: enrich_node(&seg.node, bindings),
            })
            .collect();
        PathPattern { start, segments }
    }
}

fn enrich_node(pattern: &NodePattern, bindings: &BindingContext) -> NodePattern {
    if let Some(var) = &pattern.variable {
        if let Some(crate::binding::Bound::Node(node)) = bindings.get(var) {
            return pattern.pinned_to_id(node.id.clone());
        }
    }
    pattern.clone()
}

fn matches_node_pattern(node: &Node, pattern: &NodePattern, config: &EngineConfig) -> bool {
    if !pattern
        .labels
        .iter()
        .all(|label| node.has_label(label, config.case_insensitive_labels))
    {
        return false;
    }
    pattern.properties.iter().all(|(key, constraint)| {
        let PropertyConstraint::Exact(expected) = constraint;
        if key == "id" {
            matches!(expected, Value::String(id) if *id == node.id)
        } else {
            node.properties.get(key) == Some(expected)
        }
    })
}

fn matches_relationship_pattern(edge: &Edge, pattern: &RelationshipPattern, config: &EngineConfig) -> bool {
    if let Some(rel_type) = &pattern.rel_type {
        let matches_type = if config.case_insensitive_labels {
            edge.label.eq_ignore_ascii_case(rel_type)
        } else {
            edge.label == *rel_type
        };
        if !matches_type {
            return false;
        }
    }
    pattern.properties.iter().all(|(key, constraint)| {
        let PropertyConstraint::Exact(expected) = constraint;
        edge.properties.get(key) == Some(expected)
    })
}
