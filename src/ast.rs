// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Rule AST (component H's input): the parsed shape of one rule's text,
//! independent of the concrete lexer/parser. A discriminated union per
//! action kind, not a class hierarchy, per the data model's modeling note.

use crate::expr::Expression;
use crate::pattern::PathPattern;

/// One comma-separated MATCH clause: a list of independently matched
/// path patterns whose bindings are later combined (component E).
#[derive(Debug, Clone, PartialEq)]
pub struct MatchClause {
    pub patterns: Vec<PathPattern>,
}

/// One property assignment inside a CREATE/SET action template, in
/// source order — order matters for readable `describe()` output even
/// though evaluation order does not affect the result.
pub type PropertyTemplate = Vec<(String, Expression)>;

#[derive(Debug, Clone, PartialEq)]
pub enum ActionTemplate {
    CreateNode {
        variable: Option<String>,
        label: String,
        properties: PropertyTemplate,
    },
    CreateRelationship {
        variable: Option<String>,
        from: String,
        to: String,
        rel_type: String,
        properties: PropertyTemplate,
    },
    SetProperty {
        target: String,
        key: String,
        value: Expression,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnItem {
    pub expression: Expression,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnClause {
    pub items: Vec<ReturnItem>,
}

/// One fully parsed rule: header metadata plus the match/filter/act
/// pipeline component H composes.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    pub description: Option<String>,
    /// Higher runs first; ties break on textual order within the source.
    pub priority: i64,
    pub match_clause: Option<MatchClause>,
    pub where_clause: Option<Expression>,
    pub actions: Vec<ActionTemplate>,
    pub return_clause: Option<ReturnClause>,
}
