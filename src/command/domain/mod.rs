//! Domain types for command processing.
//!
//! This module contains pure types with no infrastructure dependencies.

mod addressing;
mod command;
mod context;
mod error;
mod history;
mod ids;
mod result;
mod similarity;
mod usage;

pub use addressing::{
    CORE_AGENT, CommandAddress, CommandKind, CommandPrefix, Domain, ParseDomainError,
};
pub use command::{Command, CommandArgs, CommandFlags, ParsedCommand};
pub use context::{BranchInfo, CommandContext, ContextDomain, GitContext, IntegrationContext};
pub use error::{CommandError, ParseError, PluginAvailability};
pub use history::{ExecutionHistory, ExecutionRecord};
pub use ids::ExecutionId;
pub use result::{CommandResult, DisplayMode, HandlerOutput};
pub use similarity::{edit_distance, similarity};
pub use usage::CommandUsage;
