//! Command header parsing.
//!
//! A line is a command when it starts with the guild prefix or with a
//! mention of the bot. The first whitespace separated word after the trigger
//! is the command name; everything after it (leading whitespace removed) is
//! the remainder handed to the tokenizer.

use crate::mention::{parse_leading_mention, Mention};

/// What made the line a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The configured prefix.
    Prefix,
    /// A direct mention of the bot.
    Mention,
}

/// The split header of a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    /// What triggered the command.
    pub trigger: Trigger,
    /// The command word as typed. May be empty only for [`Trigger::Mention`]
    /// (a bare mention of the bot).
    pub command: &'a str,
    /// The remainder after the command word, leading whitespace trimmed.
    pub rest: &'a str,
}

fn split_command(body: &str) -> (&str, &str) {
    let body = body.trim_start();
    match body.find(char::is_whitespace) {
        Some(idx) => (&body[..idx], body[idx..].trim_start()),
        None => (body, ""),
    }
}

/// Parse the header of `line`.
///
/// Returns `None` when the line is not addressed to the bot at all, which
/// callers treat as "ignore", never as an error. A prefix followed directly
/// by whitespace (`! ranks`) is not a command.
pub fn parse_header<'a>(line: &'a str, prefix: &str, bot_id: u64) -> Option<Header<'a>> {
    let line = line.trim_start();

    if let Some((Mention::User(id), after)) = parse_leading_mention(line) {
        if id == bot_id && (after.is_empty() || after.starts_with(char::is_whitespace)) {
            let (command, rest) = split_command(after);
            return Some(Header {
                trigger: Trigger::Mention,
                command,
                rest,
            });
        }
    }

    if prefix.is_empty() {
        return None;
    }
    let body = line.strip_prefix(prefix)?;
    if body.is_empty() || body.starts_with(char::is_whitespace) {
        return None;
    }
    let (command, rest) = split_command(body);
    Some(Header {
        trigger: Trigger::Prefix,
        command,
        rest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_header() {
        let h = parse_header("!ranks 2", "!", 1).unwrap();
        assert_eq!(h.trigger, Trigger::Prefix);
        assert_eq!(h.command, "ranks");
        assert_eq!(h.rest, "2");
    }

    #[test]
    fn test_multi_char_prefix() {
        let h = parse_header("im!warn <@5>   spamming a lot", "im!", 1).unwrap();
        assert_eq!(h.command, "warn");
        assert_eq!(h.rest, "<@5>   spamming a lot");
    }

    #[test]
    fn test_no_prefix_is_ignored() {
        assert_eq!(parse_header("ranks 2", "!", 1), None);
        assert_eq!(parse_header("!", "!", 1), None);
        assert_eq!(parse_header("! ranks", "!", 1), None);
    }

    #[test]
    fn test_mention_header() {
        let h = parse_header("<@!42> help warn", "!", 42).unwrap();
        assert_eq!(h.trigger, Trigger::Mention);
        assert_eq!(h.command, "help");
        assert_eq!(h.rest, "warn");

        let h = parse_header("<@42>", "!", 42).unwrap();
        assert_eq!(h.command, "");
    }

    #[test]
    fn test_mention_of_someone_else_is_not_a_header() {
        assert_eq!(parse_header("<@7> help", "!", 42), None);
        assert_eq!(parse_header("<@42>help", "!", 42), None);
    }
}
