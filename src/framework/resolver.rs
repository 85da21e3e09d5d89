//! Resolvers: raw text to typed argument values.
//!
//! Scalar resolvers consume exactly one token; a `rest` argument hands its
//! resolver the verbatim remainder of the line and consumes every remaining
//! token. Member, role and channel lookups are tiered:
//!
//! 1. an id, either a mention (`<@id>`, `<@&id>`, `<#id>`) or a bare snowflake
//! 2. an exact name, case-insensitive
//! 3. a unique name prefix, case-insensitive
//!
//! More than one candidate at tier 2 or 3 fails with
//! [`ResolutionError::Ambiguous`]. Resolvers only read guild state.

use super::command::{ArgValue, Resolver};
use super::dispatcher::CommandTable;
use crate::api::{Guild, Member};
use crate::error::ResolutionError;
use imbot_proto::{Mention, ParseError, eq_ignore_case, parse_id, parse_mention, starts_with_ignore_case};

/// At most this many candidates are listed in an ambiguity reply.
pub const MAX_CANDIDATES: usize = 10;

/// What a resolver reads from.
#[derive(Clone, Copy)]
pub struct ResolveScope<'a> {
    pub guild: Option<&'a Guild>,
    /// Guild members; empty unless the command declares a member argument.
    pub members: &'a [Member],
    pub commands: &'a CommandTable,
}

/// Input handed to a resolver.
#[derive(Debug, Clone, Copy)]
pub enum RawInput<'a> {
    Token(&'a str),
    /// The verbatim remainder, made of `tokens` tokens.
    Rest { text: &'a str, tokens: usize },
}

impl Resolver {
    /// Resolve `input` for the argument called `arg`, returning the value and
    /// the number of tokens consumed.
    pub fn resolve(
        &self,
        arg: &str,
        input: RawInput<'_>,
        scope: &ResolveScope<'_>,
    ) -> Result<(ArgValue, usize), ResolutionError> {
        let (text, consumed) = match input {
            RawInput::Token(token) => (token, 1),
            RawInput::Rest { text, tokens } => (text, tokens),
        };
        Ok((self.resolve_text(arg, text, scope)?, consumed))
    }

    fn resolve_text(
        &self,
        arg: &str,
        text: &str,
        scope: &ResolveScope<'_>,
    ) -> Result<ArgValue, ResolutionError> {
        let invalid = |expected: String| ResolutionError::InvalidFormat {
            arg: arg.to_string(),
            input: text.to_string(),
            expected,
        };
        let not_found = || ResolutionError::NotFound {
            arg: arg.to_string(),
            input: text.to_string(),
        };

        match self {
            Self::String => Ok(ArgValue::Text(text.to_string())),

            Self::Number { min, max } => {
                let n: i64 = text
                    .trim()
                    .parse()
                    .map_err(|_| invalid(self.expected().to_string()))?;
                match (min, max) {
                    (Some(lo), Some(hi)) if n < *lo || n > *hi => {
                        Err(invalid(format!("number between {} and {}", lo, hi)))
                    }
                    (Some(lo), None) if n < *lo => Err(invalid(format!("number of at least {}", lo))),
                    (None, Some(hi)) if n > *hi => Err(invalid(format!("number of at most {}", hi))),
                    _ => Ok(ArgValue::Number(n)),
                }
            }

            Self::Boolean => parse_bool(text)
                .map(ArgValue::Bool)
                .ok_or_else(|| invalid(self.expected().to_string())),

            Self::Enum(choices) => choices
                .iter()
                .find(|c| eq_ignore_case(c, text))
                .map(|c| ArgValue::Choice(*c))
                .ok_or_else(|| invalid(format!("choice (one of {})", choices.join(", ")))),

            Self::Command => scope
                .commands
                .find(text)
                .map(|c| ArgValue::Command(c.descriptor.name.to_string()))
                .ok_or_else(not_found),

            Self::Member => match_entity(
                arg,
                text,
                Mention::User,
                scope.members,
                |m| m.id(),
                |m| {
                    let mut names = vec![m.user.name.as_str()];
                    names.extend(m.nick.as_deref());
                    names
                },
                |m| format!("{} ({})", m.display_name(), m.id()),
            )
            .map(|m| ArgValue::Member(m.clone())),

            Self::Role => {
                let roles = scope.guild.map(|g| g.roles.as_slice()).unwrap_or_default();
                match_entity(
                    arg,
                    text,
                    Mention::Role,
                    roles,
                    |r| r.id,
                    |r| vec![r.name.as_str()],
                    |r| format!("{} ({})", r.name, r.id),
                )
                .map(|r| ArgValue::Role(r.clone()))
            }

            Self::Channel => {
                let channels = scope
                    .guild
                    .map(|g| g.channels.as_slice())
                    .unwrap_or_default();
                match_entity(
                    arg,
                    text,
                    Mention::Channel,
                    channels,
                    |c| c.id,
                    |c| vec![c.name.as_str()],
                    |c| format!("#{} ({})", c.name, c.id),
                )
                .map(|c| ArgValue::Channel(c.clone()))
            }
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    const TRUE: &[&str] = &["true", "yes", "on", "1"];
    const FALSE: &[&str] = &["false", "no", "off", "0"];
    let text = text.trim();
    if TRUE.iter().any(|t| eq_ignore_case(t, text)) {
        Some(true)
    } else if FALSE.iter().any(|f| eq_ignore_case(f, text)) {
        Some(false)
    } else {
        None
    }
}

/// Tiered lookup of `input` among `entities`.
fn match_entity<'e, E>(
    arg: &str,
    input: &str,
    expect: fn(u64) -> Mention,
    entities: &'e [E],
    id_of: impl Fn(&E) -> u64,
    names_of: impl Fn(&'e E) -> Vec<&'e str>,
    label: impl Fn(&E) -> String,
) -> Result<&'e E, ResolutionError> {
    let input = input.trim();
    let not_found = || ResolutionError::NotFound {
        arg: arg.to_string(),
        input: input.to_string(),
    };

    match parse_id(input, expect) {
        Ok(id) => {
            if let Some(found) = entities.iter().find(|&e| id_of(e) == id) {
                return Ok(found);
            }
            // A bare number may still be a name; a mention may not.
            if parse_mention(input).is_some() {
                return Err(not_found());
            }
        }
        Err(ParseError::WrongMentionKind(_)) => {
            return Err(ResolutionError::InvalidFormat {
                arg: arg.to_string(),
                input: input.to_string(),
                expected: match expect(0) {
                    Mention::User(_) => "member",
                    Mention::Role(_) => "role",
                    Mention::Channel(_) => "channel",
                }
                .to_string(),
            });
        }
        Err(ParseError::Empty) => return Err(not_found()),
        // Not an id or mention: fall through to name matching.
        Err(_) => {}
    }

    let pick = |matches: Vec<&'e E>| -> Option<Result<&'e E, ResolutionError>> {
        match matches.len() {
            0 => None,
            1 => Some(Ok(matches[0])),
            _ => Some(Err(ResolutionError::Ambiguous {
                arg: arg.to_string(),
                input: input.to_string(),
                candidates: matches.iter().take(MAX_CANDIDATES).map(|&e| label(e)).collect(),
            })),
        }
    };

    let exact: Vec<&E> = entities
        .iter()
        .filter(|&e| names_of(e).iter().any(|n| eq_ignore_case(n, input)))
        .collect();
    if let Some(result) = pick(exact) {
        return result;
    }

    let prefixed: Vec<&E> = entities
        .iter()
        .filter(|&e| names_of(e).iter().any(|n| starts_with_ignore_case(n, input)))
        .collect();
    pick(prefixed).unwrap_or_else(|| Err(not_found()))
}
