// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Token-level primitives shared by `parser`. Not a standalone
//! tokenizing pass — each primitive consumes surrounding whitespace and
//! returns directly usable values, the common nom idiom for small
//! hand-rolled grammars.

use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag, tag_no_case};
use nom::character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, one_of};
use nom::combinator::{cut, map, map_res, opt, recognize, value};
use nom::multi::many0;
use nom::number::complete::double;
use nom::sequence::{delimited, pair, preceded};
use nom::IResult;

/// Wraps `f`, discarding leading and trailing whitespace.
pub fn ws<'a, O, F>(mut f: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    move |input: &'a str| {
        let (input, _) = multispace0(input)?;
        let (input, out) = f(input)?;
        let (input, _) = multispace0(input)?;
        Ok((input, out))
    }
}

/// Recognizes a keyword case-insensitively, requiring it not be
/// followed by another identifier character (so `MATCHER` doesn't
/// parse as `MATCH` + `ER`).
pub fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let (rest, matched) = tag_no_case(kw)(input)?;
        if rest.chars().next().map(|c| c.is_alphanumeric() || c == '_').unwrap_or(false) {
            return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
        }
        Ok((rest, matched))
    }
}

pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(alt((alpha1, tag("_"))), many0(alt((alphanumeric1, tag("_")))))),
        |s: &str| s.to_string(),
    )(input)
}

pub fn string_literal(input: &str) -> IResult<&str, String> {
    alt((double_quoted_string, single_quoted_string))(input)
}

fn double_quoted_string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(opt(escaped_transform(is_not("\"\\"), '\\', one_of("\"\\nt"))), |s: Option<String>| {
            s.unwrap_or_default()
        }),
        cut(char('"')),
    )(input)
}

fn single_quoted_string(input: &str) -> IResult<&str, String> {
    delimited(
        char('\''),
        map(opt(escaped_transform(is_not("'\\"), '\\', one_of("'\\nt"))), |s: Option<String>| s.unwrap_or_default()),
        cut(char('\'')),
    )(input)
}

pub fn number_literal(input: &str) -> IResult<&str, f64> {
    double(input)
}

pub fn integer_literal(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

pub fn boolean_literal(input: &str) -> IResult<&str, bool> {
    alt((value(true, keyword("true")), value(false, keyword("false"))))(input)
}

pub fn null_literal(input: &str) -> IResult<&str, ()> {
    value((), keyword("null"))(input)
}

pub fn punct<'a>(p: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_does_not_match_longer_identifier() {
        assert!(keyword("match")("matcher").is_err());
        assert!(keyword("match")("MATCH (n)").is_ok());
    }

    #[test]
    fn string_literal_handles_escapes() {
        let (_, s) = string_literal("\"a\\\"b\"").unwrap();
        assert_eq!(s, "a\"b");
    }

    #[test]
    fn identifier_allows_underscore_prefix() {
        let (rest, id) = identifier("_foo bar").unwrap();
        assert_eq!(id, "_foo");
        assert_eq!(rest, " bar");
    }
}
