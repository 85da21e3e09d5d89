//! Chat mention syntax.
//!
//! | Syntax      | Meaning                       |
//! |-------------|-------------------------------|
//! | `<@123>`    | user / member                 |
//! | `<@!123>`   | user / member (nickname form) |
//! | `<@&123>`   | role                          |
//! | `<#123>`    | channel                       |

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt},
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::error::{ParseError, Result};

/// A parsed mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mention {
    /// `<@id>` or `<@!id>`.
    User(u64),
    /// `<@&id>`.
    Role(u64),
    /// `<#id>`.
    Channel(u64),
}

impl Mention {
    /// The id carried by the mention, whatever its kind.
    pub fn id(self) -> u64 {
        match self {
            Self::User(id) | Self::Role(id) | Self::Channel(id) => id,
        }
    }
}

fn snowflake(input: &str) -> IResult<&str, u64> {
    map_res(digit1, str::parse::<u64>)(input)
}

fn role(input: &str) -> IResult<&str, Mention> {
    let (rest, id) = preceded(tag("@&"), snowflake)(input)?;
    Ok((rest, Mention::Role(id)))
}

fn user(input: &str) -> IResult<&str, Mention> {
    let (rest, id) = preceded(tuple((char('@'), opt(char('!')))), snowflake)(input)?;
    Ok((rest, Mention::User(id)))
}

fn channel(input: &str) -> IResult<&str, Mention> {
    let (rest, id) = preceded(char('#'), snowflake)(input)?;
    Ok((rest, Mention::Channel(id)))
}

fn mention(input: &str) -> IResult<&str, Mention> {
    delimited(char('<'), alt((role, user, channel)), char('>'))(input)
}

/// Parse a token that consists of exactly one mention.
pub fn parse_mention(token: &str) -> Option<Mention> {
    all_consuming(mention)(token).ok().map(|(_, m)| m)
}

/// Parse a leading mention, returning it with the unparsed remainder.
///
/// Used for the "mention as prefix" header form.
pub(crate) fn parse_leading_mention(line: &str) -> Option<(Mention, &str)> {
    mention(line).ok().map(|(rest, m)| (m, rest))
}

/// Parse a token as an id of the given kind: either a bare snowflake or a
/// mention whose kind matches `expect`.
///
/// `expect` is a constructor such as `Mention::Role`; only its discriminant
/// is inspected.
pub fn parse_id(token: &str, expect: fn(u64) -> Mention) -> Result<u64> {
    if token.is_empty() {
        return Err(ParseError::Empty);
    }
    if token.bytes().all(|b| b.is_ascii_digit()) {
        return token
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidId(token.to_string()));
    }
    match parse_mention(token) {
        Some(m) if std::mem::discriminant(&m) == std::mem::discriminant(&expect(0)) => Ok(m.id()),
        Some(_) => Err(ParseError::WrongMentionKind(token.to_string())),
        None => Err(ParseError::InvalidId(token.to_string())),
    }
}
