//! The argument pipeline: flag extraction, then positional resolution.

use super::command::{ArgValue, CommandDescriptor, FlagKind, Resolver};
use super::resolver::{RawInput, ResolveScope};
use crate::error::ResolutionError;
use imbot_proto::{FlagToken, Token, classify_flag, tokenize};
use std::collections::HashMap;
use std::ops::Range;

/// Resolved flags: switches map to `None`, value flags to their value.
pub type FlagValues = HashMap<&'static str, Option<ArgValue>>;

/// Output of the pipeline, in descriptor order.
#[derive(Debug, Default)]
pub struct ParsedArgs {
    pub args: Vec<Option<ArgValue>>,
    pub flags: FlagValues,
}

/// Resolve the text after the command name against `descriptor`.
///
/// Unquoted flag-shaped tokens are matched against the declared flags first,
/// wherever they appear. Unknown flags stay positional text unless
/// `strict_flags` is set. Positional arguments are then resolved in order;
/// surplus tokens are ignored.
pub fn parse_arguments(
    descriptor: &CommandDescriptor,
    rest: &str,
    scope: &ResolveScope<'_>,
    strict_flags: bool,
) -> Result<ParsedArgs, ResolutionError> {
    let tokens = tokenize(rest);
    let mut flags = FlagValues::new();
    let mut flag_spans: Vec<Range<usize>> = Vec::new();
    let mut positional: Vec<&Token> = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        i += 1;

        let classified = if token.quoted {
            None
        } else {
            classify_flag(&token.value)
        };
        let Some(flag) = classified else {
            positional.push(token);
            continue;
        };

        let spec = match flag {
            FlagToken::Long { name, .. } => descriptor.flag_spec(name),
            FlagToken::Short { name, .. } => descriptor.short_flag_spec(name),
        };
        let Some(spec) = spec else {
            if strict_flags {
                return Err(ResolutionError::UnknownFlag(token.value.clone()));
            }
            positional.push(token);
            continue;
        };

        flag_spans.push(token.span.clone());
        match &spec.kind {
            FlagKind::Switch => {
                flags.insert(spec.name, None);
            }
            FlagKind::Value(resolver) => {
                let raw = match flag.inline_value() {
                    Some(inline) => inline.to_string(),
                    None => {
                        let next = tokens.get(i).ok_or_else(|| ResolutionError::FlagMissingValue {
                            flag: spec.name.to_string(),
                        })?;
                        i += 1;
                        flag_spans.push(next.span.clone());
                        next.value.clone()
                    }
                };
                let (value, _) = resolver.resolve(spec.name, RawInput::Token(&raw), scope)?;
                flags.insert(spec.name, Some(value));
            }
        }
    }

    let mut args = Vec::with_capacity(descriptor.args.len());
    let mut cursor = 0;
    for spec in &descriptor.args {
        let remaining = &positional[cursor.min(positional.len())..];

        if remaining.is_empty() {
            if spec.required {
                return Err(ResolutionError::MissingArgument {
                    arg: spec.name.to_string(),
                });
            }
            let fallback = match (&spec.default, spec.rest, &spec.resolver) {
                (Some(default), _, _) => Some(default.clone()),
                (None, true, Resolver::String) => Some(ArgValue::Text(String::new())),
                _ => None,
            };
            args.push(fallback);
            continue;
        }

        let rest_buf: String;
        let input = if spec.rest {
            rest_buf = rest_text(rest, remaining, &flag_spans);
            RawInput::Rest {
                text: &rest_buf,
                tokens: remaining.len(),
            }
        } else {
            RawInput::Token(&remaining[0].value)
        };
        let (value, consumed) = spec.resolver.resolve(spec.name, input, scope)?;
        cursor += consumed;
        args.push(Some(value));
    }

    Ok(ParsedArgs { args, flags })
}

/// The verbatim source text covered by `remaining`, minus extracted flags.
///
/// A remainder that is a single quoted token yields the unquoted value.
fn rest_text(source: &str, remaining: &[&Token], flag_spans: &[Range<usize>]) -> String {
    let (Some(first), Some(last)) = (remaining.first(), remaining.last()) else {
        return String::new();
    };
    if remaining.len() == 1 && first.quoted {
        return first.value.clone();
    }

    let mut pieces = Vec::new();
    let mut start = first.span.start;
    for span in flag_spans {
        if span.start >= start && span.end <= last.span.end {
            pieces.push(&source[start..span.start]);
            start = span.end;
        }
    }
    pieces.push(&source[start..last.span.end]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::command::{ArgSpec, FlagSpec};
    use crate::framework::dispatcher::CommandTable;

    fn parse(
        descriptor: &CommandDescriptor,
        rest: &str,
        strict: bool,
    ) -> Result<ParsedArgs, ResolutionError> {
        let commands = CommandTable::default();
        let scope = ResolveScope {
            guild: None,
            members: &[],
            commands: &commands,
        };
        parse_arguments(descriptor, rest, &scope, strict)
    }

    fn note() -> CommandDescriptor {
        CommandDescriptor::new("note")
            .arg(ArgSpec::required("target", Resolver::String))
            .arg(ArgSpec::optional("text", Resolver::String).rest())
            .flag(FlagSpec::switch("silent").short('s'))
    }

    fn ranks() -> CommandDescriptor {
        CommandDescriptor::new("ranks")
            .arg(ArgSpec::optional("page", Resolver::NUMBER).with_default(ArgValue::Number(1)))
            .flag(FlagSpec::switch("compact").short('c'))
            .flag(FlagSpec::value("limit", Resolver::NUMBER))
    }

    fn text(value: &Option<ArgValue>) -> &str {
        match value {
            Some(ArgValue::Text(t)) => t,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_argument() {
        assert_eq!(
            parse(&note(), "   ", false).unwrap_err(),
            ResolutionError::MissingArgument {
                arg: "target".into()
            }
        );
    }

    #[test]
    fn test_rest_is_verbatim_including_quoted_flags() {
        let parsed = parse(&note(), r#"bob spamming   "--loud" a lot"#, false).unwrap();
        assert_eq!(text(&parsed.args[0]), "bob");
        assert_eq!(text(&parsed.args[1]), r#"spamming   "--loud" a lot"#);
        assert!(parsed.flags.is_empty());
    }

    #[test]
    fn test_declared_flags_are_cut_from_rest() {
        let parsed = parse(&note(), "bob first --silent second", false).unwrap();
        assert_eq!(text(&parsed.args[1]), "first second");
        assert_eq!(parsed.flags.get("silent"), Some(&None));

        let parsed = parse(&note(), "-s bob", false).unwrap();
        assert_eq!(text(&parsed.args[0]), "bob");
        assert!(parsed.flags.contains_key("silent"));
    }

    #[test]
    fn test_single_quoted_rest_is_unquoted() {
        let parsed = parse(&note(), r#"bob "all of this""#, false).unwrap();
        assert_eq!(text(&parsed.args[1]), "all of this");
    }

    #[test]
    fn test_empty_optional_rest() {
        let parsed = parse(&note(), "bob", false).unwrap();
        assert_eq!(text(&parsed.args[1]), "");
    }

    #[test]
    fn test_flags_anywhere_and_defaults() {
        let parsed = parse(&ranks(), "--compact 2", false).unwrap();
        assert_eq!(parsed.args[0], Some(ArgValue::Number(2)));
        assert!(parsed.flags.contains_key("compact"));

        let parsed = parse(&ranks(), "", false).unwrap();
        assert_eq!(parsed.args[0], Some(ArgValue::Number(1)));

        let parsed = parse(&ranks(), "--limit=5 3 extra tokens", false).unwrap();
        assert_eq!(parsed.args[0], Some(ArgValue::Number(3)));
        assert_eq!(parsed.flags.get("limit"), Some(&Some(ArgValue::Number(5))));

        let parsed = parse(&ranks(), "--limit 5", false).unwrap();
        assert_eq!(parsed.flags.get("limit"), Some(&Some(ArgValue::Number(5))));
        assert_eq!(parsed.args[0], Some(ArgValue::Number(1)));
    }

    #[test]
    fn test_value_flag_without_value() {
        assert_eq!(
            parse(&ranks(), "--limit", false).unwrap_err(),
            ResolutionError::FlagMissingValue {
                flag: "limit".into()
            }
        );
    }

    #[test]
    fn test_unknown_flags_follow_strictness() {
        let parsed = parse(&note(), "--verbose text", false).unwrap();
        assert_eq!(text(&parsed.args[0]), "--verbose");
        assert_eq!(text(&parsed.args[1]), "text");

        assert_eq!(
            parse(&note(), "--verbose text", true).unwrap_err(),
            ResolutionError::UnknownFlag("--verbose".into())
        );
    }

    #[test]
    fn test_negative_numbers_are_not_flags() {
        let parsed = parse(&ranks(), "-3", true).unwrap();
        assert_eq!(parsed.args[0], Some(ArgValue::Number(-3)));
    }
}
