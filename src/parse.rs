//! Typed parsing of context values.
//!
//! Turns `key=value` text (CLI arguments, config snippets) into a typed
//! [`Context`]: `true`/`false` become booleans, digit runs become numbers,
//! decimals become floats, and anything else — including double-quoted text
//! that should stay textual, like `"42"` — becomes a string.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0},
    combinator::{all_consuming, map, map_res, opt, recognize},
    error::ParseError,
    multi::many0_count,
    sequence::{delimited, pair, tuple},
    IResult,
};

use crate::error::FlagError;
use crate::eval::Context;
use crate::model::AttrValue;

/// A combinator that takes a parser `inner` and produces a parser that also
/// consumes both leading and trailing whitespace, returning the output of
/// `inner`.
fn ws<'a, F: 'a, O, E: ParseError<&'a str>>(
    inner: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    F: Fn(&'a str) -> IResult<&'a str, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

fn parse_boolean(i: &str) -> IResult<&str, AttrValue> {
    let parser = alt((
        map(tag_no_case("true"), |_| true),
        map(tag_no_case("false"), |_| false),
    ));
    map(parser, AttrValue::Boolean)(i)
}

fn parse_number(i: &str) -> IResult<&str, AttrValue> {
    let parser = recognize(pair(opt(tag("-")), digit1));
    // out-of-range digit runs fail the parser and fall back to a string
    map_res(parser, |num: &str| num.parse().map(AttrValue::Number))(i)
}

fn parse_float(i: &str) -> IResult<&str, AttrValue> {
    let parser = recognize(tuple((opt(tag("-")), digit1, tag("."), digit1)));
    map_res(parser, |num: &str| num.parse().map(AttrValue::Float))(i)
}

fn parse_quoted(i: &str) -> IResult<&str, AttrValue> {
    let parser = delimited(char('"'), opt(is_not("\"")), char('"'));
    map(parser, |s: Option<&str>| {
        AttrValue::String(s.unwrap_or_default().to_string())
    })(i)
}

fn parse_identifier(i: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(i)
}

/// Parses one value. Typed forms must consume the whole input; everything
/// else falls back to a plain string.
pub fn parse_value(i: &str) -> AttrValue {
    let i = i.trim();
    if let Ok((_, v)) = all_consuming(parse_quoted)(i) {
        return v;
    }
    if let Ok((_, v)) = all_consuming(parse_boolean)(i) {
        return v;
    }
    if let Ok((_, v)) = all_consuming(parse_float)(i) {
        return v;
    }
    if let Ok((_, v)) = all_consuming(parse_number)(i) {
        return v;
    }
    AttrValue::String(i.to_string())
}

/// Parses a `key=value` pair. The key must be an identifier; the remainder
/// after `=` is parsed as a value.
pub fn parse_context_pair(i: &str) -> Result<(String, AttrValue), FlagError> {
    let (rest, key) = ws(parse_identifier)(i)
        .map_err(|_: nom::Err<nom::error::Error<&str>>| bad_pair(i))?;
    let (value_text, _) = tag::<_, _, nom::error::Error<&str>>("=")(rest)
        .map_err(|_| bad_pair(i))?;
    Ok((key.to_string(), parse_value(value_text)))
}

/// Parses a list of `key=value` pairs into a [`Context`]. Later pairs win
/// on duplicate keys.
pub fn parse_context<S: AsRef<str>>(pairs: &[S]) -> Result<Context, FlagError> {
    let mut context = Context::new();
    for pair in pairs {
        let (key, value) = parse_context_pair(pair.as_ref())?;
        context.insert(key, value);
    }
    Ok(context)
}

fn bad_pair(i: &str) -> FlagError {
    FlagError::validation(format!("expected key=value, got '{i}'"))
}
