//! Shared utilities for agent-rs
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and environment-based configuration helpers.

pub mod config;
pub mod logging;

pub use config::{EnvError, env_list, env_parse, env_var, require_env};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
