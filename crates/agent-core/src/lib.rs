//! Core abstractions for chat agents
//!
//! This crate defines the types shared by every part of the bot: the
//! channel session contract, observed messages, the clock used for
//! cooldowns, and the error taxonomy.

pub mod clock;
pub mod error;
pub mod memory;
pub mod message;
pub mod session;

pub use clock::{Clock, ManualClock, TokioClock};
pub use error::{Error, Result, SessionError};
pub use memory::{MemorySession, ScriptStep};
pub use message::{ChannelMessage, Credentials};
pub use session::ChannelSession;
