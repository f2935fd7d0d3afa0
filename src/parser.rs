// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Minimal rule-text compiler (ambient, not core-budgeted): turns one
//! rule body into the `ast` tree the engine consumes. Built with `nom`,
//! the same parsing dependency the teacher crate declares. This is
//! intentionally not a production Cypher/GQL front end — just enough of
//! the grammar to drive the match-and-execute pipeline end to end.

use crate::ast::{ActionTemplate, MatchClause, ReturnClause, ReturnItem, Rule};
use crate::error::EngineError;
use crate::expr::{ArithOp, CompareOp, Expression};
use crate::lexer::{
    boolean_literal, identifier, integer_literal, keyword, null_literal, number_literal, punct, string_literal, ws,
};
use crate::pattern::{HopSpec, NodePattern, PathPattern, PropertyConstraint, RelDirection, RelationshipPattern, Segment};
use crate::value::Value;
use nom::branch::alt;
use nom::combinator::{cut, map, opt, value};
use nom::multi::{many0, many1, separated_list0, separated_list1};
use nom::sequence::{delimited, pair, preceded, separated_pair, tuple};
use nom::IResult;
use std::collections::HashMap;

/// Parses one rule body: `MatchClause? WhereClause? Body ReturnClause?`.
/// `name`/`description`/`priority` come from the Markdown header, not
/// the rule text itself, so the caller fills those in afterward.
pub fn parse_rule_body(input: &str) -> Result<Rule, EngineError> {
    let (rest, (match_clause, where_clause, actions, return_clause)) =
        tuple((opt(match_clause), opt(where_clause), body, opt(return_clause)))(input)
            .map_err(|e| EngineError::ParseError(format!("{e}")))?;
    let (rest, _) = nom::character::complete::multispace0::<&str, nom::error::Error<&str>>(rest)
        .map_err(|e| EngineError::ParseError(format!("{e}")))?;
    if !rest.is_empty() {
        return Err(EngineError::ParseError(format!("unconsumed input: {rest:?}")));
    }
    Ok(Rule {
        name: String::new(),
        description: None,
        priority: 0,
        match_clause,
        where_clause,
        actions,
        return_clause,
    })
}

fn match_clause(input: &str) -> IResult<&str, MatchClause> {
    map(
        preceded(ws(keyword("match")), separated_list1(punct(","), path_pattern)),
        |patterns| MatchClause { patterns },
    )(input)
}

fn where_clause(input: &str) -> IResult<&str, Expression> {
    preceded(ws(keyword("where")), or_expr)(input)
}

fn body(input: &str) -> IResult<&str, Vec<ActionTemplate>> {
    map(many1(alt((create_clause, set_clause))), |groups| groups.into_iter().flatten().collect())(input)
}

fn create_clause(input: &str) -> IResult<&str, Vec<ActionTemplate>> {
    preceded(ws(keyword("create")), separated_list1(punct(","), create_item))(input)
}

fn create_item(input: &str) -> IResult<&str, ActionTemplate> {
    let (rest, raw_start) = raw_node_pattern(input)?;
    let (rest, raw_segments) = many0(pair(raw_rel_pattern, raw_node_pattern))(rest)?;
    if raw_segments.is_empty() {
        let label = raw_start.labels.first().cloned().unwrap_or_default();
        let properties = raw_start.properties.into_iter().collect();
        return Ok((rest, ActionTemplate::CreateNode { variable: raw_start.variable, label, properties }));
    }
    let (raw_rel, raw_end) = raw_segments.into_iter().next().expect("non-empty checked above");
    let from = raw_start.variable.unwrap_or_default();
    let to = raw_end.variable.unwrap_or_default();
    let rel_type = raw_rel.rel_type.unwrap_or_default();
    Ok((
        rest,
        ActionTemplate::CreateRelationship {
            variable: raw_rel.variable,
            from,
            to,
            rel_type,
            properties: raw_rel.properties.into_iter().collect(),
        },
    ))
}

fn set_clause(input: &str) -> IResult<&str, Vec<ActionTemplate>> {
    preceded(ws(keyword("set")), separated_list1(punct(","), set_item))(input)
}

fn set_item(input: &str) -> IResult<&str, ActionTemplate> {
    map(
        tuple((identifier, punct("."), cut(identifier), punct("="), cut(or_expr))),
        |(target, _, key, _, value)| ActionTemplate::SetProperty { target, key, value },
    )(input)
}

fn return_clause(input: &str) -> IResult<&str, ReturnClause> {
    map(preceded(ws(keyword("return")), separated_list1(punct(","), return_item)), |items| ReturnClause { items })(
        input,
    )
}

fn return_item(input: &str) -> IResult<&str, ReturnItem> {
    map(or_expr, |expression| ReturnItem { expression, alias: None })(input)
}

// ---- pattern grammar -------------------------------------------------

struct RawNode {
    variable: Option<String>,
    labels: Vec<String>,
    properties: Vec<(String, Expression)>,
}

struct RawRel {
    variable: Option<String>,
    rel_type: Option<String>,
    hops: HopSpec,
    properties: Vec<(String, Expression)>,
    direction: RelDirection,
}

fn raw_node_pattern(input: &str) -> IResult<&str, RawNode> {
    map(
        delimited(
            punct("("),
            tuple((opt(ws(identifier)), many0(preceded(punct(":"), ws(identifier))), opt(property_template))),
            cut(punct(")")),
        ),
        |(variable, labels, properties)| RawNode { variable, labels, properties: properties.unwrap_or_default() },
    )(input)
}

fn edge_token(input: &str) -> IResult<&str, &str> {
    alt((punct("->"), punct("<-"), punct("-")))(input)
}

fn raw_rel_pattern(input: &str) -> IResult<&str, RawRel> {
    map(
        tuple((
            edge_token,
            delimited(
                punct("["),
                tuple((
                    opt(ws(identifier)),
                    opt(preceded(punct(":"), ws(identifier))),
                    opt(hop_spec),
                    opt(property_template),
                )),
                cut(punct("]")),
            ),
            cut(edge_token),
        )),
        |(left, (variable, rel_type, hops, properties), right)| RawRel {
            variable,
            rel_type,
            hops: hops.unwrap_or(HopSpec::FIXED),
            properties: properties.unwrap_or_default(),
            direction: resolve_direction(left, right),
        },
    )(input)
}

fn resolve_direction(left: &str, right: &str) -> RelDirection {
    if left == "<-" {
        RelDirection::Incoming
    } else if right == "->" {
        RelDirection::Outgoing
    } else {
        RelDirection::Both
    }
}

fn hop_spec(input: &str) -> IResult<&str, HopSpec> {
    preceded(
        punct("*"),
        map(
            opt(pair(opt(integer_literal), opt(preceded(punct(".."), opt(integer_literal))))),
            |spec| match spec {
                None => HopSpec { min_hops: Some(1), max_hops: None },
                Some((n, None)) => {
                    let n = n.unwrap_or(1);
                    HopSpec { min_hops: Some(n), max_hops: Some(n) }
                }
                Some((n, Some(m))) => HopSpec { min_hops: Some(n.unwrap_or(1)), max_hops: m },
            },
        ),
    )(input)
}

fn path_pattern(input: &str) -> IResult<&str, PathPattern> {
    map(pair(raw_node_pattern, many0(pair(raw_rel_pattern, raw_node_pattern))), |(start, segments)| PathPattern {
        start: to_node_pattern(start),
        segments: segments
            .into_iter()
            .map(|(rel, node)| Segment { relationship: to_rel_pattern(rel), node: to_node_pattern(node) })
            .collect(),
    })(input)
}

fn to_node_pattern(raw: RawNode) -> NodePattern {
    let mut pattern = NodePattern { variable: raw.variable, labels: raw.labels, properties: HashMap::new() };
    for (key, expr) in raw.properties {
        if let Expression::Literal(v) = expr {
            pattern.properties.insert(key, PropertyConstraint::Exact(v));
        }
    }
    pattern
}

fn to_rel_pattern(raw: RawRel) -> RelationshipPattern {
    let mut pattern = RelationshipPattern {
        variable: raw.variable,
        rel_type: raw.rel_type,
        properties: HashMap::new(),
        direction: raw.direction,
        hops: raw.hops,
    };
    for (key, expr) in raw.properties {
        if let Expression::Literal(v) = expr {
            pattern.properties.insert(key, PropertyConstraint::Exact(v));
        }
    }
    pattern
}

fn property_template(input: &str) -> IResult<&str, Vec<(String, Expression)>> {
    delimited(
        punct("{"),
        separated_list0(punct(","), separated_pair(ws(identifier), punct(":"), or_expr)),
        cut(punct("}")),
    )(input)
}

// ---- expression grammar, lowest to highest precedence ----------------

fn or_expr(input: &str) -> IResult<&str, Expression> {
    let (rest, first) = and_expr(input)?;
    let (rest, rest_terms) = many0(preceded(ws(keyword("or")), and_expr))(rest)?;
    Ok((rest, rest_terms.into_iter().fold(first, |acc, rhs| Expression::Or(Box::new(acc), Box::new(rhs)))))
}

fn and_expr(input: &str) -> IResult<&str, Expression> {
    let (rest, first) = not_expr(input)?;
    let (rest, rest_terms) = many0(preceded(ws(keyword("and")), not_expr))(rest)?;
    Ok((rest, rest_terms.into_iter().fold(first, |acc, rhs| Expression::And(Box::new(acc), Box::new(rhs)))))
}

fn not_expr(input: &str) -> IResult<&str, Expression> {
    alt((map(preceded(ws(keyword("not")), not_expr), |e| Expression::Not(Box::new(e))), is_expr))(input)
}

fn is_expr(input: &str) -> IResult<&str, Expression> {
    let (rest, base) = in_expr(input)?;
    let (rest, suffix) = opt(preceded(
        ws(keyword("is")),
        pair(opt(ws(keyword("not"))), cut(ws(keyword("null")))),
    ))(rest)?;
    let expr = match suffix {
        None => base,
        Some((None, _)) => Expression::IsNull(Box::new(base)),
        Some((Some(_), _)) => Expression::IsNotNull(Box::new(base)),
    };
    Ok((rest, expr))
}

fn in_expr(input: &str) -> IResult<&str, Expression> {
    let (rest, base) = compare_expr(input)?;
    let (rest, suffix) = opt(preceded(ws(keyword("in")), cut(compare_expr)))(rest)?;
    Ok((rest, match suffix {
        None => base,
        Some(haystack) => Expression::In(Box::new(base), Box::new(haystack)),
    }))
}

fn compare_op(input: &str) -> IResult<&str, CompareOp> {
    alt((
        value(CompareOp::Ne, punct("<>")),
        value(CompareOp::Ne, punct("!=")),
        value(CompareOp::Le, punct("<=")),
        value(CompareOp::Ge, punct(">=")),
        value(CompareOp::Eq, punct("=")),
        value(CompareOp::Lt, punct("<")),
        value(CompareOp::Gt, punct(">")),
    ))(input)
}

fn compare_expr(input: &str) -> IResult<&str, Expression> {
    let (rest, lhs) = additive_expr(input)?;
    let (rest, suffix) = opt(pair(compare_op, cut(additive_expr)))(rest)?;
    Ok((rest, match suffix {
        None => lhs,
        Some((op, rhs)) => Expression::Compare(op, Box::new(lhs), Box::new(rhs)),
    }))
}

fn additive_expr(input: &str) -> IResult<&str, Expression> {
    let (rest, first) = multiplicative_expr(input)?;
    let (rest, terms) = many0(pair(alt((value(ArithOp::Add, punct("+")), value(ArithOp::Sub, punct("-")))), multiplicative_expr))(rest)?;
    Ok((rest, terms.into_iter().fold(first, |acc, (op, rhs)| Expression::Arithmetic(op, Box::new(acc), Box::new(rhs)))))
}

fn multiplicative_expr(input: &str) -> IResult<&str, Expression> {
    let (rest, first) = unary_expr(input)?;
    let (rest, terms) = many0(pair(
        alt((value(ArithOp::Mul, punct("*")), value(ArithOp::Div, punct("/")), value(ArithOp::Mod, punct("%")))),
        unary_expr,
    ))(rest)?;
    Ok((rest, terms.into_iter().fold(first, |acc, (op, rhs)| Expression::Arithmetic(op, Box::new(acc), Box::new(rhs)))))
}

fn unary_expr(input: &str) -> IResult<&str, Expression> {
    alt((
        map(preceded(punct("-"), unary_expr), |e| {
            Expression::Arithmetic(ArithOp::Sub, Box::new(Expression::Literal(Value::Number(0.0))), Box::new(e))
        }),
        atom,
    ))(input)
}

fn atom(input: &str) -> IResult<&str, Expression> {
    ws(alt((
        delimited(punct("("), or_expr, cut(punct(")"))),
        map(list_literal, Expression::Literal),
        map(literal_value, Expression::Literal),
        property_access_or_variable,
    )))(input)
}

fn property_access_or_variable(input: &str) -> IResult<&str, Expression> {
    map(pair(identifier, opt(preceded(punct("."), cut(identifier)))), |(head, tail)| match tail {
        Some(property) => Expression::PropertyAccess { object: head, property },
        None => Expression::Variable(head),
    })(input)
}

fn list_literal(input: &str) -> IResult<&str, Value> {
    map(delimited(punct("["), separated_list0(punct(","), literal_value), cut(punct("]"))), Value::List)(input)
}

fn literal_value(input: &str) -> IResult<&str, Value> {
    alt((
        map(string_literal, Value::String),
        map(number_literal, Value::Number),
        map(boolean_literal, Value::Boolean),
        value(Value::Null, null_literal),
    ))(input)
}
