//! Concrete channel sessions

pub mod console;

pub use console::ConsoleSession;
