//! Command management and dispatch framework for chat agents
//!
//! This crate provides the contract for chat command handlers, the parser
//! that turns `!keyword args...` messages into invocations, and the registry
//! the agent loop resolves keywords against.

pub mod command;
pub mod context;
pub mod registry;

pub use command::{COMMAND_MARKER, CommandHandler, CommandInvocation, Outcome};
pub use context::{CommandContext, IgnoreList};
pub use registry::CommandRegistry;
