// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! An in-memory property-graph rule engine. Rules are small Cypher-like
//! programs — `MATCH`/`WHERE`/`CREATE`/`SET`/`RETURN` — authored as
//! fenced `graphrule` blocks inside Markdown, compiled to an AST, and
//! executed against a [`graph::Graph`] with transactional mutation
//! semantics. See [`engine::RuleEngine`] for the primary entry point.

pub mod actions;
pub mod ast;
pub mod binding;
pub mod combiner;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod expr;
pub mod graph;
pub mod lexer;
pub mod markdown;
pub mod matcher;
pub mod parser;
pub mod pattern;
pub mod value;

pub use actions::{Action, CreateNode, CreateRelationship, SetProperty, UndoRecord};
pub use binding::{BindingContext, Bound, Path};
pub use config::EngineConfig;
pub use engine::{RuleEngine, RuleHeader, RuleResult};
pub use error::{ActionError, EngineError, EvalError, GraphError, MatchError};
pub use executor::{ActionOutcome, ExecutionOptions, ExecutionReport};
pub use graph::{Direction, Edge, Graph, Node, NodeId};
pub use value::Value;
