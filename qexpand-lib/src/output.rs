//! Text form of query trees.
//!
//! Prefix notation, one operator per group:
//!
//! ```text
//! AND(OR(hest heste) OR(bil "rød bil"))
//! ```
//!
//! Terms are quoted when they contain whitespace, parentheses or quotes, or
//! collide with an operator keyword. Node names are not part of the text form.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt, value},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

use crate::error::QueryParseError;
use crate::query::{Operator, QueryItem, QueryNode};

/// Render a query tree in prefix notation.
pub fn render(node: &QueryNode) -> String {
    let items = node
        .items()
        .iter()
        .map(|item| match item {
            QueryItem::Term(t) => render_term(t),
            QueryItem::Node(n) => render(n),
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}({items})", node.operator().keyword())
}

fn render_term(term: &str) -> String {
    let needs_quotes = term.is_empty()
        || term == Operator::And.keyword()
        || term == Operator::Or.keyword()
        || term.chars().any(|c| !is_bare_char(c));
    if needs_quotes {
        format!("\"{}\"", term.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        term.to_string()
    }
}

fn is_bare_char(c: char) -> bool {
    !(c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\\'))
}

/// Parse the text produced by [`render`].
pub fn parse_query(input: &str) -> Result<QueryNode, QueryParseError> {
    match all_consuming(delimited(multispace0, node, multispace0))(input) {
        Ok((_, parsed)) => Ok(parsed),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            if e.code == nom::error::ErrorKind::Eof {
                Err(QueryParseError::Trailing(snippet(e.input)))
            } else {
                Err(QueryParseError::Syntax(snippet(e.input)))
            }
        }
        Err(nom::Err::Incomplete(_)) => Err(QueryParseError::Syntax(snippet(input))),
    }
}

fn snippet(s: &str) -> String {
    s.chars().take(40).collect()
}

fn operator(input: &str) -> IResult<&str, Operator> {
    alt((
        value(Operator::And, tag("AND")),
        value(Operator::Or, tag("OR")),
    ))(input)
}

fn node(input: &str) -> IResult<&str, QueryNode> {
    map(
        pair(
            terminated(operator, char('(')),
            terminated(
                delimited(multispace0, separated_list0(multispace1, item), multispace0),
                char(')'),
            ),
        ),
        |(op, items)| {
            let mut node = QueryNode::new(op);
            for item in items {
                match item {
                    QueryItem::Term(t) => node.append(t),
                    QueryItem::Node(n) => node.push(n),
                }
            }
            node
        },
    )(input)
}

fn item(input: &str) -> IResult<&str, QueryItem> {
    alt((
        map(node, QueryItem::Node),
        map(quoted, QueryItem::Term),
        map(bare, QueryItem::Term),
    ))(input)
}

fn bare(input: &str) -> IResult<&str, String> {
    map(take_while1(is_bare_char), str::to_string)(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    map(
        preceded(
            char('"'),
            terminated(
                opt(escaped_transform(
                    is_not("\\\""),
                    '\\',
                    alt((value("\\", tag("\\")), value("\"", tag("\"")))),
                )),
                char('"'),
            ),
        ),
        Option::unwrap_or_default,
    )(input)
}
