// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Action executor (component G): runs a rule's action list against one
//! binding tuple under validate/continue/rollback policies. Mirrors the
//! "evaluate everything before mutating anything" shape of
//! `write_stmt/data_stmt/set.rs::execute_modification`, generalized to
//! also cover rollback via the undo records actions hand back.

use crate::actions::{Action, UndoRecord};
use crate::binding::BindingContext;
use crate::config::EngineConfig;
use crate::graph::Graph;

/// Policy knobs for one action-list execution.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionOptions {
    /// Run `Action::validate` before `Action::execute` for each action.
    pub validate_before_execute: bool,
    /// Keep running the remaining actions after one fails. Ignored when
    /// `rollback_on_failure` is also set — rollback always wins.
    pub continue_on_failure: bool,
    /// Undo every already-applied action in this list if any action fails.
    pub rollback_on_failure: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self { validate_before_execute: true, continue_on_failure: false, rollback_on_failure: true }
    }
}

/// Per-action result, in action order.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub description: String,
    pub succeeded: bool,
    pub error: Option<String>,
}

/// Outcome of running an entire action list against one binding tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub outcomes: Vec<ActionOutcome>,
    pub rolled_back: bool,
    /// Set only when the up-front validation pass aborted the whole list
    /// before any action ran — `"Validation failed: …"`, per spec.
    pub error: Option<String>,
}

impl ExecutionReport {
    pub fn all_succeeded(&self) -> bool {
        self.error.is_none() && self.outcomes.iter().all(|o| o.succeeded)
    }
}

enum Signal {
    Continue,
    Stop,
    RolledBack,
}

/// Runs `actions` in order against `bindings`, applying `options`.
/// Rollback takes precedence over continue-on-failure: if both are set
/// and an action fails, every prior action in this list is undone and
/// no later action runs.
///
/// When `validate_before_execute` is set, every action is first checked
/// against `bindings` as it stands before this call — before any action
/// in the list has run. Any failure here aborts the whole list with no
/// side effects at all, per spec. This up-front pass only catches
/// failures that don't depend on the chain's own actions running first
/// (an empty label, a property expression that doesn't evaluate); a
/// validation failure that only arises once an earlier action in this
/// same list has executed (e.g. a variable an earlier action just bound)
/// is necessarily caught by the per-action re-validation in the main
/// loop below instead, after that earlier action's mutation has already
/// landed. See DESIGN.md for why both passes exist.
pub fn execute_actions(
    graph: &mut Graph,
    actions: &[Box<dyn Action>],
    bindings: &mut BindingContext,
    config: &EngineConfig,
    options: ExecutionOptions,
) -> ExecutionReport {
    if options.validate_before_execute {
        for action in actions {
            let report = action.validate(graph, bindings, config);
            if !report.is_valid() {
                let reason = report.errors.join("; ");
                log::warn!("up-front validation failed for {}: {reason}", action.describe());
                return ExecutionReport {
                    outcomes: Vec::new(),
                    rolled_back: false,
                    error: Some(format!("Validation failed: {reason}")),
                };
            }
        }
    }

    let mut outcomes = Vec::with_capacity(actions.len());
    let mut undo_log: Vec<UndoRecord> = Vec::new();
    let mut rolled_back = false;

    for action in actions {
        let description = action.describe();

        if options.validate_before_execute {
            let report = action.validate(graph, bindings, config);
            if !report.is_valid() {
                let reason = report.errors.join("; ");
                log::warn!("validation failed for {description}: {reason}");
                outcomes.push(ActionOutcome { description, succeeded: false, error: Some(reason) });
                match on_failure(graph, &mut undo_log, &options) {
                    Signal::Continue => continue,
                    Signal::Stop => break,
                    Signal::RolledBack => {
                        rolled_back = true;
                        break;
                    }
                }
            }
        }

        match action.execute(graph, bindings, config) {
            Ok(undo) => {
                log::debug!("executed {description}");
                undo_log.extend(undo);
                outcomes.push(ActionOutcome { description, succeeded: true, error: None });
            }
            Err(e) => {
                log::warn!("execution failed for {description}: {e}");
                outcomes.push(ActionOutcome { description, succeeded: false, error: Some(e.to_string()) });
                match on_failure(graph, &mut undo_log, &options) {
                    Signal::Continue => continue,
                    Signal::Stop => break,
                    Signal::RolledBack => {
                        rolled_back = true;
                        break;
                    }
                }
            }
        }
    }

    ExecutionReport { outcomes, rolled_back, error: None }
}

fn on_failure(graph: &mut Graph, undo_log: &mut Vec<UndoRecord>, options: &ExecutionOptions) -> Signal {
    if options.rollback_on_failure {
        for record in undo_log.drain(..).rev() {
            record.apply(graph);
        }
        Signal::RolledBack
    } else if options.continue_on_failure {
        Signal::Continue
    } else {
        Signal::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::CreateNode;
    use std::collections::HashMap;

    fn node_action(label: &str) -> Box<dyn Action> {
        Box::new(CreateNode { variable: None, label: label.to_string(), properties: HashMap::new() })
    }

    #[test]
    fn all_actions_succeed_leaves_graph_mutated() {
        let mut graph = Graph::new();
        let mut bindings = BindingContext::new();
        let config = EngineConfig::default();
        let actions = vec![node_action("A"), node_action("B")];
        let report = execute_actions(&mut graph, &actions, &mut bindings, &config, ExecutionOptions::default());
        assert!(report.all_succeeded());
        assert!(!report.rolled_back);
        assert_eq!(graph.get_all_nodes().len(), 2);
    }

    #[test]
    fn rollback_undoes_prior_successful_actions() {
        use crate::actions::CreateRelationship;
        let mut graph = Graph::new();
        let mut bindings = BindingContext::new();
        let config = EngineConfig::default();
        let actions: Vec<Box<dyn Action>> = vec![
            node_action("A"),
            Box::new(CreateRelationship {
                variable: None,
                from_variable: "missing".into(),
                to_variable: "also_missing".into(),
                rel_type: "KNOWS".into(),
                properties: HashMap::new(),
            }),
        ];
        let options = ExecutionOptions { validate_before_execute: false, continue_on_failure: false, rollback_on_failure: true };
        let report = execute_actions(&mut graph, &actions, &mut bindings, &config, options);
        assert!(report.rolled_back);
        assert!(graph.get_all_nodes().is_empty());
    }

    #[test]
    fn validate_before_execute_aborts_whole_list_with_no_side_effects() {
        let mut graph = Graph::new();
        let mut bindings = BindingContext::new();
        let config = EngineConfig::default();
        let actions: Vec<Box<dyn Action>> = vec![node_action("A"), node_action("")];
        let options = ExecutionOptions { validate_before_execute: true, continue_on_failure: false, rollback_on_failure: false };
        let report = execute_actions(&mut graph, &actions, &mut bindings, &config, options);

        assert!(!report.rolled_back);
        assert!(report.outcomes.is_empty());
        assert!(graph.get_all_nodes().is_empty());
        let error = report.error.as_ref().unwrap();
        assert!(error.starts_with("Validation failed"), "unexpected error: {error}");
    }

    #[test]
    fn continue_on_failure_runs_remaining_actions_when_rollback_disabled() {
        use crate::actions::CreateRelationship;
        let mut graph = Graph::new();
        let mut bindings = BindingContext::new();
        let config = EngineConfig::default();
        let actions: Vec<Box<dyn Action>> = vec![
            Box::new(CreateRelationship {
                variable: None,
                from_variable: "missing".into(),
                to_variable: "also_missing".into(),
                rel_type: "KNOWS".into(),
                properties: HashMap::new(),
            }),
            node_action("A"),
        ];
        let options = ExecutionOptions { validate_before_execute: false, continue_on_failure: true, rollback_on_failure: false };
        let report = execute_actions(&mut graph, &actions, &mut bindings, &config, options);
        assert!(!report.rolled_back);
        assert_eq!(graph.get_all_nodes().len(), 1);
        assert!(!report.outcomes[0].succeeded);
        assert!(report.outcomes[1].succeeded);
    }
}
