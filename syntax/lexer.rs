//! Read atoms from the tokens of an engine's answer lines
//! with [nom](https://crates.io/crates/nom).

use nom::{
    branch::alt,
    bytes::complete::{escaped, tag},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, none_of, one_of},
    combinator::{all_consuming, map, opt, recognize},
    multi::{many0_count, separated_list0},
    sequence::{delimited, pair},
    IResult,
};

use crate::{Atom, Symbol};

fn space(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_"), tag("'")))),
    ))(input)
}

/// A predicate or function name, possibly classically negated.
fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), identifier))(input)
}

fn integer(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), digit1))(input)
}

fn string(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('"'),
        opt(escaped(none_of(r#"\""#), '\\', one_of(r#"\"n"#))),
        char('"'),
    ))(input)
}

/// Integers, strings, constants, function terms, and tuples,
/// returned as the text they were read from.
fn term(input: &str) -> IResult<&str, &str> {
    alt((
        string,
        integer,
        tag("#inf"),
        tag("#sup"),
        recognize(pair(name, opt(arguments))),
        recognize(arguments),
    ))(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<&str>> {
    delimited(
        char('('),
        separated_list0(char(','), delimited(space, term, space)),
        char(')'),
    )(input)
}

fn atom(input: &str) -> IResult<&str, Atom> {
    map(pair(name, opt(arguments)), |(name, arguments)| {
        Atom::new(
            Symbol::from(name),
            arguments
                .unwrap_or_default()
                .into_iter()
                .map(String::from),
        )
    })(input)
}

/// Read exactly one atom, or nothing.
pub(crate) fn parse_atom(input: &str) -> Option<Atom> {
    all_consuming(atom)(input).ok().map(|(_, atom)| atom)
}
