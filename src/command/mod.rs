//! Dual-namespace command processing.
//!
//! Two addressing schemes share one pipeline:
//!
//! - `@domain:command[:sub]` targets an external system (git, issue tracker,
//!   docs, bookmarks) or a plugin addressed by its agent identifier
//! - `/command` targets built-in behaviour owned by the `core` agent
//!
//! Text flows through [`parser::CommandParser`] into a
//! [`domain::Command`], is routed by [`services::CommandExecutor`] through
//! the [`services::CommandRegistry`], and always comes back as a
//! [`domain::CommandResult`].
//!
//! # Example
//!
//! ```
//! use command_deck::command::domain::{CommandPrefix, Domain};
//! use command_deck::command::parser::CommandParser;
//!
//! let parser = CommandParser::new();
//! let command = parser
//!     .parse(r#"@git:commit -m "fix: a b" --amend"#)
//!     .expect("valid command");
//!
//! assert_eq!(command.prefix, CommandPrefix::At);
//! assert_eq!(command.domain, Some(Domain::Git));
//! assert_eq!(command.command, "commit");
//! assert!(parser.parse("@someone said hi").is_none());
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
mod locks;
pub mod parser;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
