//! Per-invocation context handed to command handlers

use crate::registry::CommandRegistry;
use std::collections::HashSet;
use std::time::Duration;

/// Authors whose messages are never dispatched
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    authors: HashSet<String>,
}

impl IgnoreList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an author; returns `false` if already ignored
    pub fn insert(&mut self, author: impl Into<String>) -> bool {
        self.authors.insert(author.into())
    }

    pub fn remove(&mut self, author: &str) -> bool {
        self.authors.remove(author)
    }

    pub fn contains(&self, author: &str) -> bool {
        self.authors.contains(author)
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoreList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            authors: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Loop-owned state a handler may read or change during one invocation
///
/// Borrows the registry and ignore list from the agent loop for the duration
/// of a single dispatch.
pub struct CommandContext<'a> {
    author: &'a str,
    registry: &'a CommandRegistry,
    ignored: &'a mut IgnoreList,
    pause: Option<Duration>,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        author: &'a str,
        registry: &'a CommandRegistry,
        ignored: &'a mut IgnoreList,
    ) -> Self {
        Self {
            author,
            registry,
            ignored,
            pause: None,
        }
    }

    /// Author of the message being dispatched
    pub fn author(&self) -> &str {
        self.author
    }

    pub fn registry(&self) -> &CommandRegistry {
        self.registry
    }

    pub fn ignored(&self) -> &IgnoreList {
        self.ignored
    }

    /// Stop dispatching messages from `author`
    pub fn ignore(&mut self, author: impl Into<String>) -> bool {
        self.ignored.insert(author)
    }

    /// Ask the loop to stay idle for `duration` after posting the reply
    pub fn pause_for(&mut self, duration: Duration) {
        self.pause = Some(duration);
    }

    /// Pause requested by the handler, consumed by the loop
    pub fn take_pause(&mut self) -> Option<Duration> {
        self.pause.take()
    }
}
