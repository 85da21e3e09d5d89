//! Flag token classification.
//!
//! Recognised shapes:
//!
//! - `--name` and `--name=value` where `name` starts with an ASCII letter and
//!   continues with letters, digits, `-` or `_`
//! - `-n` and `-n=value` where `n` is a single ASCII letter
//!
//! Anything else, including negative numbers such as `-3` and the bare `--`,
//! is positional text. Whether a classified flag is actually *recognised* is
//! up to the command's flag specs; this module only looks at syntax.

/// A token that has the shape of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagToken<'a> {
    /// `--name` / `--name=value`.
    Long {
        /// Flag name without dashes.
        name: &'a str,
        /// Inline value after `=`.
        value: Option<&'a str>,
    },
    /// `-n` / `-n=value`.
    Short {
        /// Flag letter.
        name: char,
        /// Inline value after `=`.
        value: Option<&'a str>,
    },
}

impl FlagToken<'_> {
    /// The inline `=value`, if any.
    pub fn inline_value(&self) -> Option<&str> {
        match self {
            Self::Long { value, .. } | Self::Short { value, .. } => *value,
        }
    }
}

fn split_value(body: &str) -> (&str, Option<&str>) {
    match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    }
}

fn is_long_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Classify an unquoted token.
pub fn classify_flag(token: &str) -> Option<FlagToken<'_>> {
    if let Some(body) = token.strip_prefix("--") {
        let (name, value) = split_value(body);
        return is_long_name(name).then_some(FlagToken::Long { name, value });
    }

    let body = token.strip_prefix('-')?;
    let (name, value) = split_value(body);
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(FlagToken::Short { name: c, value }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_flags() {
        assert_eq!(
            classify_flag("--compact"),
            Some(FlagToken::Long {
                name: "compact",
                value: None
            })
        );
        assert_eq!(
            classify_flag("--page=2"),
            Some(FlagToken::Long {
                name: "page",
                value: Some("2")
            })
        );
        assert_eq!(classify_flag("--dry-run").unwrap().inline_value(), None);
    }

    #[test]
    fn test_short_flags() {
        assert_eq!(
            classify_flag("-c"),
            Some(FlagToken::Short {
                name: 'c',
                value: None
            })
        );
        assert_eq!(classify_flag("-p=3").unwrap().inline_value(), Some("3"));
    }

    #[test]
    fn test_not_flags() {
        for token in ["-3", "--", "-", "---x", "--9lives", "-ab", "word", "—dash"] {
            assert_eq!(classify_flag(token), None, "{token}");
        }
    }
}
