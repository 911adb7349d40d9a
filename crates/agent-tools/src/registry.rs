//! Command registry for resolving keywords to handlers

use crate::CommandHandler;
use agent_core::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registry mapping command keywords to handlers
///
/// Built once at startup and owned by the agent loop. Registering a keyword
/// twice replaces the earlier handler (last write wins) but keeps the
/// keyword's first position in [`list`](Self::list).
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
    order: Vec<String>,
}

impl CommandRegistry {
    /// Create a new command registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its keyword
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) -> Result<()> {
        let keyword = handler.keyword().to_string();
        if keyword.is_empty() {
            return Err(Error::InitializationFailed(
                "Command keyword must not be empty".to_string(),
            ));
        }

        if self.handlers.insert(keyword.clone(), handler).is_some() {
            debug!("Replacing handler for !{}", keyword);
        } else {
            self.order.push(keyword);
        }
        Ok(())
    }

    /// Builder-style registration
    pub fn with(mut self, handler: Arc<dyn CommandHandler>) -> Result<Self> {
        self.register(handler)?;
        Ok(self)
    }

    /// Look up the handler for a keyword
    pub fn resolve(&self, keyword: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(keyword).cloned()
    }

    /// `(keyword, help_text)` pairs in registration order
    pub fn list(&self) -> Vec<(&str, &str)> {
        self.order
            .iter()
            .filter_map(|kw| {
                self.handlers
                    .get(kw)
                    .map(|h| (kw.as_str(), h.help_text()))
            })
            .collect()
    }

    /// Get the number of registered commands
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
