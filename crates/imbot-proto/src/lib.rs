//! # imbot-proto
//!
//! The command line grammar used by imbot-ng.
//!
//! A chat message becomes a command invocation in three steps, each of which
//! lives in its own module here:
//!
//! - [`header`]: strip the guild prefix (or a mention of the bot) and split
//!   the command token from the remainder.
//! - [`token`]: split the remainder into whitespace separated tokens, honouring
//!   double quoted strings. Every token keeps its byte span so that `rest`
//!   arguments can be sliced out of the original text verbatim.
//! - [`flag`]: classify unquoted tokens that look like `--name`, `--name=value`
//!   or `-n`.
//!
//! [`mention`] parses the chat mention syntax (`<@id>`, `<@!id>`, `<@&id>`,
//! `<#id>`) and [`casemap`] holds the case-insensitive comparisons used for
//! command and entity names.
//!
//! ## Quick Start
//!
//! ```rust
//! use imbot_proto::{parse_header, tokenize};
//!
//! let header = parse_header("!mentionRole \"Role with space\"", "!", 42).unwrap();
//! assert_eq!(header.command, "mentionRole");
//!
//! let tokens = tokenize(header.rest);
//! assert_eq!(tokens[0].value, "Role with space");
//! assert!(tokens[0].quoted);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod error;
pub mod flag;
pub mod header;
pub mod mention;
pub mod token;

pub use self::casemap::{eq_ignore_case, fold, starts_with_ignore_case};
pub use self::error::{ParseError, Result};
pub use self::flag::{classify_flag, FlagToken};
pub use self::header::{parse_header, Header, Trigger};
pub use self::mention::{parse_id, parse_mention, Mention};
pub use self::token::{tokenize, Token, Tokens};
