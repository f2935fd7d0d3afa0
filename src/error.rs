// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Structured error types for every layer of the engine. Leaf cases carry
//! a `String` reason the way `graphlite`'s `ExecutionError` does; the
//! rule engine converts any of these into a plain `String` only at the
//! `RuleResult.error` boundary (spec's "uncaught error into a RuleResult"
//! propagation policy).

use thiserror::Error;

/// Errors raised by the graph store (component A).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    #[error("node '{0}' already exists")]
    DuplicateNode(String),
    #[error("node '{0}' not found")]
    UnknownNode(String),
}

/// Errors raised while evaluating a WHERE expression (component C).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    #[error("variable '{0}' not found in bindings")]
    UnboundVariable(String),
    #[error("type error: {0}")]
    TypeError(String),
    #[error("numeric error: {0}")]
    NumericError(String),
    #[error("malformed expression: {0}")]
    MalformedExpression(String),
}

/// Errors raised by the pattern matcher (component D). Mismatches are
/// never errors — the matcher simply excludes non-matching candidates —
/// so this type only covers malformed patterns.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatchError {
    #[error("pattern error: {0}")]
    InvalidPattern(String),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Errors raised by an individual action's validate/execute (component F).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("execution failed for {action}: {reason}")]
    ExecutionFailed { action: String, reason: String },
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Errors surfaced by the rule engine (component H) before they are
/// flattened into `RuleResult.error`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("parse error: {0}")]
    ParseError(String),
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}
