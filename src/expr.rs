// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Expression AST and evaluator (component C). Reduces a WHERE
//! sub-expression to a `Value` under a binding context, following
//! three-valued SQL-style logic. Generalized from `graphlite`'s
//! two-valued `evaluate_expression`/`compare_values`
//! (`plan/physical_executor.rs`), which short-circuits on anything that
//! isn't a literal boolean instead of propagating `null`.

use crate::binding::{BindingContext, Bound};
use crate::config::EngineConfig;
use crate::error::EvalError;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Value),
    Variable(String),
    PropertyAccess { object: String, property: String },
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    Compare(CompareOp, Box<Expression>, Box<Expression>),
    Arithmetic(ArithOp, Box<Expression>, Box<Expression>),
    IsNull(Box<Expression>),
    IsNotNull(Box<Expression>),
    In(Box<Expression>, Box<Expression>),
}

/// Evaluates `expr` under `bindings`. Property access on an unbound
/// variable raises `UnboundVariable`; on a bound non-entity value raises
/// `TypeError`. Division by zero raises `NumericError`.
pub fn evaluate(
    expr: &Expression,
    bindings: &BindingContext,
    config: &EngineConfig,
) -> Result<Value, EvalError> {
    match expr {
        Expression::Literal(v) => Ok(v.clone()),

        Expression::Variable(name) => match bindings.get(name) {
            Some(Bound::Scalar(v)) => Ok(v.clone()),
            Some(Bound::Node(n)) => Ok(Value::String(n.id.clone())),
            Some(Bound::Edge(e)) => Ok(Value::String(format!("{}-{}-{}", e.source, e.label, e.target))),
            Some(Bound::Path(_)) => Err(EvalError::TypeError(format!(
                "variable '{name}' is bound to a path, which has no scalar representation"
            ))),
            None => Err(EvalError::UnboundVariable(name.clone())),
        },

        Expression::PropertyAccess { object, property } => {
            let bound = bindings
                .get(object)
                .ok_or_else(|| EvalError::UnboundVariable(object.clone()))?;
            // Reserved key `id` compares against the entity's identifier.
            if property == "id" {
                return match bound {
                    Bound::Node(n) => Ok(Value::String(n.id.clone())),
                    Bound::Edge(e) => Ok(Value::String(format!("{}-{}-{}", e.source, e.label, e.target))),
                    _ => Err(EvalError::TypeError(format!(
                        "'{object}' is not a node or relationship"
                    ))),
                };
            }
            match bound {
                Bound::Node(n) => Ok(n.properties.get(property).cloned().unwrap_or(Value::Null)),
                Bound::Edge(e) => Ok(e.properties.get(property).cloned().unwrap_or(Value::Null)),
                _ => Err(EvalError::TypeError(format!(
                    "'{object}' is not a node or relationship"
                ))),
            }
        }

        Expression::And(lhs, rhs) => {
            let l = evaluate(lhs, bindings, config)?;
            let r = evaluate(rhs, bindings, config)?;
            Ok(three_valued_and(&l, &r))
        }

        Expression::Or(lhs, rhs) => {
            let l = evaluate(lhs, bindings, config)?;
            let r = evaluate(rhs, bindings, config)?;
            Ok(three_valued_or(&l, &r))
        }

        Expression::Not(inner) => {
            let v = evaluate(inner, bindings, config)?;
            Ok(match v.as_bool() {
                Some(b) => Value::Boolean(!b),
                None if v.is_null() => Value::Null,
                None => return Err(EvalError::TypeError("NOT applied to non-boolean".to_string())),
            })
        }

        Expression::Compare(op, lhs, rhs) => {
            let l = evaluate(lhs, bindings, config)?;
            let r = evaluate(rhs, bindings, config)?;
            compare(*op, &l, &r, config)
        }

        Expression::Arithmetic(op, lhs, rhs) => {
            let l = evaluate(lhs, bindings, config)?;
            let r = evaluate(rhs, bindings, config)?;
            arithmetic(*op, &l, &r)
        }

        Expression::IsNull(inner) => {
            let v = evaluate(inner, bindings, config)?;
            Ok(Value::Boolean(v.is_null()))
        }

        Expression::IsNotNull(inner) => {
            let v = evaluate(inner, bindings, config)?;
            Ok(Value::Boolean(!v.is_null()))
        }

        Expression::In(needle, haystack) => {
            let n = evaluate(needle, bindings, config)?;
            let h = evaluate(haystack, bindings, config)?;
            match h {
                Value::List(items) => Ok(Value::Boolean(items.contains(&n))),
                Value::Null => Ok(Value::Null),
                _ => Err(EvalError::TypeError("IN requires a list".to_string())),
            }
        }
    }
}

/// Whether `expr` evaluated under `bindings` admits the binding: true
/// iff the result is boolean `true`. `null` or `false` reject the tuple.
pub fn is_true(
    expr: &Expression,
    bindings: &BindingContext,
    config: &EngineConfig,
) -> Result<bool, EvalError> {
    Ok(matches!(evaluate(expr, bindings, config)?, Value::Boolean(true)))
}

fn three_valued_and(l: &Value, r: &Value) -> Value {
    match (l.as_bool(), r.as_bool()) {
        (Some(false), _) | (_, Some(false)) => Value::Boolean(false),
        (Some(true), Some(true)) => Value::Boolean(true),
        _ => Value::Null,
    }
}

fn three_valued_or(l: &Value, r: &Value) -> Value {
    match (l.as_bool(), r.as_bool()) {
        (Some(true), _) | (_, Some(true)) => Value::Boolean(true),
        (Some(false), Some(false)) => Value::Boolean(false),
        _ => Value::Null,
    }
}

fn compare(op: CompareOp, l: &Value, r: &Value, config: &EngineConfig) -> Result<Value, EvalError> {
    if l.is_null() || r.is_null() {
        return Ok(Value::Null);
    }
    let (l, r) = coerce_for_comparison(l, r, config);
    if matches!(op, CompareOp::Eq) {
        return Ok(Value::Boolean(l == r));
    }
    if matches!(op, CompareOp::Ne) {
        return Ok(Value::Boolean(l != r));
    }
    let ord = l.partial_compare(&r).ok_or_else(|| {
        EvalError::TypeError(format!(
            "cannot compare {} and {}",
            l.type_name(),
            r.type_name()
        ))
    })?;
    use std::cmp::Ordering::*;
    let result = match op {
        CompareOp::Lt => ord == Less,
        CompareOp::Le => ord != Greater,
        CompareOp::Gt => ord == Greater,
        CompareOp::Ge => ord != Less,
        CompareOp::Eq | CompareOp::Ne => unreachable!("handled above"),
    };
    Ok(Value::Boolean(result))
}

fn coerce_for_comparison(l: &Value, r: &Value, config: &EngineConfig) -> (Value, Value) {
    if !config.numeric_coercion {
        return (l.clone(), r.clone());
    }
    match (l, r) {
        (Value::String(s), Value::Number(_)) => {
            if let Ok(n) = s.parse::<f64>() {
                return (Value::Number(n), r.clone());
            }
        }
        (Value::Number(_), Value::String(s)) => {
            if let Ok(n) = s.parse::<f64>() {
                return (l.clone(), Value::Number(n));
            }
        }
        _ => {}
    }
    (l.clone(), r.clone())
}

fn arithmetic(op: ArithOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    if l.is_null() || r.is_null() {
        return Ok(Value::Null);
    }
    let (Value::Number(a), Value::Number(b)) = (l, r) else {
        return Err(EvalError::TypeError("arithmetic requires numbers".to_string()));
    };
    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => {
            if *b == 0.0 {
                return Err(EvalError::NumericError("division by zero".to_string()));
            }
            a / b
        }
        ArithOp::Mod => {
            if *b == 0.0 {
                return Err(EvalError::NumericError("modulo by zero".to_string()));
            }
            a % b
        }
    };
    Ok(Value::Number(result))
}
