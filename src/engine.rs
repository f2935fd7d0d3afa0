// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Rule engine (component H): glue wiring parse → match → bind → act
//! into `executeQuery`/`executeQueriesFromMarkdown`. Grounded on
//! `plan/unified_query_planner.rs`'s match → where → with convenience
//! layering, generalized to also drive action execution and results.

use crate::actions::{Action, CreateNode, CreateRelationship, SetProperty};
use crate::ast::{ActionTemplate, Rule};
use crate::binding::{BindingContext, Bound, Path};
use crate::combiner;
use crate::config::EngineConfig;
use crate::executor::{self, ActionOutcome, ExecutionOptions};
use crate::expr;
use crate::graph::Graph;
use crate::markdown;
use crate::matcher::PatternMatcher;
use crate::parser;
use crate::pattern::PathPattern;

/// Rule header metadata, echoed back in `RuleResult` for traceability.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleHeader {
    pub name: String,
    pub description: Option<String>,
    pub priority: i64,
}

/// Outcome of running one rule against a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleResult {
    pub rule: RuleHeader,
    pub success: bool,
    pub match_count: usize,
    pub action_results: Vec<ActionOutcome>,
    pub error: Option<String>,
}

impl RuleResult {
    fn failed(rule: RuleHeader, error: String) -> Self {
        log::warn!("rule '{}' failed: {error}", rule.name);
        Self { rule, success: false, match_count: 0, action_results: Vec::new(), error: Some(error) }
    }
}

/// Drives rule text (or a Markdown document of rule blocks) against a
/// `Graph`. Holds the matcher's label/type cache across calls, since
/// a typical caller runs many rules against the same graph.
pub struct RuleEngine {
    matcher: PatternMatcher,
    config: EngineConfig,
}

impl RuleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { matcher: PatternMatcher::new(), config }
    }

    /// Drops the matcher's cached label/type index, forcing a rebuild
    /// on the next query.
    pub fn clear_cache(&self) {
        self.matcher.clear_cache();
    }

    pub fn execute_query(&self, graph: &mut Graph, rule_text: &str) -> RuleResult {
        let header = RuleHeader { name: String::new(), description: None, priority: 0 };
        match parser::parse_rule_body(rule_text) {
            Ok(rule) => self.execute_rule(graph, &rule),
            Err(e) => RuleResult::failed(header, e.to_string()),
        }
    }

    /// Executes every `graphrule` block found in `markdown`, in
    /// descending priority order with ties broken by document order.
    pub fn execute_queries_from_markdown(&self, graph: &mut Graph, markdown_text: &str) -> Vec<RuleResult> {
        let mut blocks: Vec<(usize, markdown::RuleBlock)> =
            markdown::extract_rule_blocks(markdown_text).into_iter().enumerate().collect();
        blocks.sort_by(|(ia, a), (ib, b)| b.priority.cmp(&a.priority).then(ia.cmp(ib)));

        blocks
            .into_iter()
            .map(|(_, block)| {
                let header = RuleHeader { name: block.name.clone(), description: block.description.clone(), priority: block.priority };
                match parser::parse_rule_body(&block.body) {
                    Ok(mut rule) => {
                        rule.name = block.name;
                        rule.description = block.description;
                        rule.priority = block.priority;
                        self.execute_rule(graph, &rule)
                    }
                    Err(e) => RuleResult::failed(header, e.to_string()),
                }
            })
            .collect()
    }

    fn execute_rule(&self, graph: &mut Graph, rule: &Rule) -> RuleResult {
        let header = RuleHeader { name: rule.name.clone(), description: rule.description.clone(), priority: rule.priority };

        let unfiltered = match &rule.match_clause {
            None => vec![BindingContext::new()],
            Some(clause) => {
                let mut per_pattern: Vec<Vec<BindingContext>> = Vec::with_capacity(clause.patterns.len());
                for pattern in &clause.patterns {
                    match self.matcher.find_matching_paths(graph, pattern, &self.config) {
                        Ok(paths) => {
                            per_pattern.push(paths.iter().map(|p| path_to_bindings(pattern, p)).collect());
                        }
                        Err(e) => return RuleResult::failed(header, e.to_string()),
                    }
                }
                combiner::combine(&per_pattern)
            }
        };

        let mut filtered = Vec::with_capacity(unfiltered.len());
        for binding in unfiltered {
            match &rule.where_clause {
                None => filtered.push(binding),
                Some(where_expr) => match expr::is_true(where_expr, &binding, &self.config) {
                    Ok(true) => filtered.push(binding),
                    Ok(false) => {}
                    Err(e) => return RuleResult::failed(header, e.to_string()),
                },
            }
        }

        let actions: Vec<Box<dyn Action>> = rule.actions.iter().map(build_action).collect();
        // The engine always runs with no validation/continue/rollback:
        // a rule that fails partway simply stops, leaving whatever
        // mutations already happened in place (spec's default policy
        // for `executeQuery`, distinct from `executor`'s own general
        // Default impl used when callers drive the executor directly).
        let options = ExecutionOptions { validate_before_execute: false, continue_on_failure: false, rollback_on_failure: false };

        let match_count = filtered.len();
        let mut action_results = Vec::new();
        let mut success = true;
        let mut top_level_errors = Vec::new();
        for mut binding in filtered {
            let report = executor::execute_actions(graph, &actions, &mut binding, &self.config, options);
            if !report.all_succeeded() {
                success = false;
            }
            if let Some(e) = report.error {
                top_level_errors.push(e);
            }
            action_results.extend(report.outcomes);
        }
        let error = if top_level_errors.is_empty() { None } else { Some(top_level_errors.join("; ")) };

        log::debug!("rule '{}' matched {match_count} binding(s)", header.name);
        RuleResult { rule: header, success, match_count, action_results, error }
    }
}

fn path_to_bindings(pattern: &PathPattern, path: &Path) -> BindingContext {
    let mut ctx = BindingContext::new();
    if let Some(var) = &pattern.start.variable {
        ctx.set(var.clone(), Bound::Node(path.nodes[0].clone()));
    }
    for (i, segment) in pattern.segments.iter().enumerate() {
        if let Some(var) = &segment.relationship.variable {
            if let Some(edge) = path.edges.get(i) {
                ctx.set(var.clone(), Bound::Edge(edge.clone()));
            }
        }
        if let Some(var) = &segment.node.variable {
            if let Some(node) = path.nodes.get(i + 1) {
                ctx.set(var.clone(), Bound::Node(node.clone()));
            }
        }
    }
    ctx
}

fn build_action(template: &ActionTemplate) -> Box<dyn Action> {
    match template {
        ActionTemplate::CreateNode { variable, label, properties } => Box::new(CreateNode {
            variable: variable.clone(),
            label: label.clone(),
            properties: properties.iter().cloned().collect(),
        }),
        ActionTemplate::CreateRelationship { variable, from, to, rel_type, properties } => {
            Box::new(CreateRelationship {
                variable: variable.clone(),
                from_variable: from.clone(),
                to_variable: to.clone(),
                rel_type: rel_type.clone(),
                properties: properties.iter().cloned().collect(),
            })
        }
        ActionTemplate::SetProperty { target, key, value } => {
            Box::new(SetProperty { target_variable: target.clone(), key: key.clone(), value: value.clone() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use crate::value::Value;

    #[test]
    fn basic_create_reports_one_match() {
        let mut graph = Graph::new();
        let engine = RuleEngine::new(EngineConfig::default());
        let result = engine.execute_query(&mut graph, r#"CREATE (n:NewNode {name: "x"})"#);
        assert!(result.success);
        assert_eq!(result.match_count, 1);
        assert_eq!(graph.get_all_nodes().len(), 1);
        let node = graph.get_all_nodes()[0];
        assert_eq!(node.label, "NewNode");
        assert_eq!(node.properties.get("name"), Some(&Value::String("x".to_string())));
    }

    #[test]
    fn cross_product_match_creates_four_edges() {
        let mut graph = Graph::new();
        for (id, label) in [("person1", "Person"), ("person2", "Person"), ("task1", "Task"), ("task2", "Task")] {
            graph.add_node(Node::new(id, label)).unwrap();
        }
        let engine = RuleEngine::new(EngineConfig::default());
        let result = engine.execute_query(
            &mut graph,
            r#"MATCH (p:Person), (t:Task) CREATE (p)-[r:WORKS_ON {date: "2023-01-15"}]->(t)"#,
        );
        assert!(result.success);
        assert_eq!(result.match_count, 4);
        assert_eq!(graph.get_all_edges().len(), 4);
    }

    #[test]
    fn empty_partner_set_yields_zero_matches_and_still_succeeds() {
        let mut graph = Graph::new();
        graph.add_node(Node::new("p1", "Person")).unwrap();
        let engine = RuleEngine::new(EngineConfig::default());
        let result = engine.execute_query(&mut graph, "MATCH (p:Person), (c:Category) CREATE (p)-[r:BELONGS_TO]->(c)");
        assert!(result.success);
        assert_eq!(result.match_count, 0);
        assert!(graph.get_all_edges().is_empty());
    }

    #[test]
    fn where_filter_restricts_to_matching_tuple() {
        let mut graph = Graph::new();
        let mut alice = Node::new("alice", "Person");
        alice.properties.insert("name".to_string(), Value::String("Alice".to_string()));
        let mut bob = Node::new("bob", "Person");
        bob.properties.insert("name".to_string(), Value::String("Bob".to_string()));
        graph.add_node(alice).unwrap();
        graph.add_node(bob).unwrap();

        let engine = RuleEngine::new(EngineConfig::default());
        let result = engine.execute_query(&mut graph, r#"MATCH (p:Person) WHERE p.name = "Alice" SET p.status = "Active""#);
        assert!(result.success);
        assert_eq!(result.match_count, 1);
        assert_eq!(
            graph.get_node("alice").unwrap().properties.get("status"),
            Some(&Value::String("Active".to_string()))
        );
        assert!(graph.get_node("bob").unwrap().properties.get("status").is_none());
    }

    #[test]
    fn markdown_blocks_run_in_descending_priority_order() {
        let mut graph = Graph::new();
        let engine = RuleEngine::new(EngineConfig::default());
        let doc = "```graphrule\nname: low\npriority: 1\n\nCREATE (a:Low)\n```\n```graphrule\nname: high\npriority: 10\n\nCREATE (b:High)\n```\n";
        let results = engine.execute_queries_from_markdown(&mut graph, doc);
        assert_eq!(results.iter().map(|r| r.rule.name.as_str()).collect::<Vec<_>>(), vec!["high", "low"]);
    }
}
