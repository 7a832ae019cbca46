//! Command Deck: the command-processing core of a chat-driven developer
//! assistant.
//!
//! This crate turns user-typed chat text into structured commands, routes
//! them to registered handlers or plugins, executes them with cooperative
//! cancellation, and shapes every outcome into one result envelope. It also
//! offers typo-tolerant suggestions and context-aware command synthesis.
//!
//! # Architecture
//!
//! Command Deck follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types and parsing with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for plugins, VCS clients, and models
//! - **Adapters**: In-memory implementations and compatibility shims
//! - **Services**: Registry, executor, and the façade that owns them
//!
//! # Modules
//!
//! - [`command`]: Command grammar, registry, execution, and contextual
//!   generation

pub mod command;
