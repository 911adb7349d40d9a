//! Agent runtime for chat command bots
//!
//! This crate provides the loop that ties a channel session to a command
//! registry: authenticate once, poll the latest message, dispatch commands
//! one at a time, and cool down between cycles until asked to stop.

pub mod agent_loop;
pub mod shutdown;

// Re-export key types
pub use agent_loop::{
    AgentLoop, AgentLoopBuilder, Cycle, DEFAULT_PANIC_NOTICE, LoopConfig, LoopState, LoopStats,
};
pub use shutdown::ShutdownHandle;
