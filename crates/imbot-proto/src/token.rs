//! Whitespace tokenizer with double quote support.
//!
//! Tokens are separated by Unicode whitespace. A token that starts with `"`
//! runs until the next unescaped `"`; inside quotes `\"` and `\\` are the
//! only escapes. An unterminated quote swallows the rest of the line rather
//! than failing, since a user who forgot the closing quote almost always
//! meant "everything up to the end".
//!
//! Every token records the byte span it occupied in the input (quotes
//! included), so callers can slice the original text back out.

use smallvec::SmallVec;
use std::ops::Range;

/// A single token of the remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token text with quotes removed and escapes applied.
    pub value: String,
    /// Byte span in the tokenized input, including any quotes.
    pub span: Range<usize>,
    /// Whether the token was written in quotes. Quoted tokens are never
    /// treated as flags.
    pub quoted: bool,
}

/// Token list. Most command lines have only a handful of tokens.
pub type Tokens = SmallVec<[Token; 8]>;

/// Split `input` into tokens.
pub fn tokenize(input: &str) -> Tokens {
    let mut tokens = Tokens::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut value = String::new();
            let mut end = input.len();
            while let Some((i, c)) = chars.next() {
                match c {
                    '\\' => match chars.peek() {
                        Some(&(_, next @ ('"' | '\\'))) => {
                            value.push(next);
                            chars.next();
                        }
                        _ => value.push('\\'),
                    },
                    '"' => {
                        end = i + 1;
                        break;
                    }
                    _ => value.push(c),
                }
            }
            tokens.push(Token {
                value,
                span: start..end,
                quoted: true,
            });
            continue;
        }

        let mut end = input.len();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() {
                end = i;
                break;
            }
            chars.next();
        }
        tokens.push(Token {
            value: input[start..end].to_string(),
            span: start..end,
            quoted: false,
        });
    }

    tokens
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn spans_are_ordered_and_in_bounds(input in "[a-z \"\\\\-]{0,40}") {
            let tokens = tokenize(&input);
            let mut last = 0;
            for t in &tokens {
                prop_assert!(t.span.start >= last);
                prop_assert!(t.span.start < t.span.end);
                prop_assert!(t.span.end <= input.len());
                last = t.span.end;
            }
        }
    }
}
