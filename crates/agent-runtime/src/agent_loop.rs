//! The observe → parse → dispatch → cooldown loop
//!
//! `AgentLoop` owns one channel session, the command registry and the ignore
//! list, and drives them strictly sequentially:
//!
//! 1. Authenticate once (fatal on failure)
//! 2. Read the latest message
//! 3. If the author is not ignored and the text starts with `!`, resolve and
//!    invoke the handler, then post its reply
//! 4. Sleep the cooldown before polling again
//!
//! A command is handled once. If its reply never reached the channel, or the
//! handler had nothing to say, the same message is read again on the next
//! poll and is skipped like plain chat.
//!
//! At most one handler runs at a time and nothing is polled while it runs. A
//! slow external call inside a handler stalls the whole loop; there is no
//! per-handler timeout.

use crate::shutdown::ShutdownHandle;
use agent_core::{ChannelMessage, ChannelSession, Clock, Credentials, Result, TokioClock};
use agent_tools::{CommandContext, CommandInvocation, CommandRegistry, IgnoreList, Outcome};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Notice posted when a handler panics
pub const DEFAULT_PANIC_NOTICE: &str = "Woops! Something went wrong :(";

/// Timing configuration for the loop
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Delay after every dispatch cycle before the next poll
    pub cooldown: Duration,

    /// Delay before re-polling a quiet or non-actionable channel
    pub backoff: Duration,

    /// Posted on behalf of a handler that panicked
    pub panic_notice: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(5),
            backoff: Duration::from_millis(100),
            panic_notice: DEFAULT_PANIC_NOTICE.to_string(),
        }
    }
}

/// Lifecycle state of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Authenticating,
    Polling,
    Dispatching,
    Cooldown,
    Stopped,
}

/// Counters reported when the loop stops
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Calls to `read_latest`
    pub polls: u64,
    /// Handlers invoked
    pub dispatches: u64,
    /// Command-form messages with no matching handler
    pub unknown_commands: u64,
    /// Messages skipped because the author is ignored
    pub ignored_messages: u64,
    /// Reads that failed for a reason other than a timeout
    pub read_failures: u64,
    /// Replies that could not be posted
    pub write_failures: u64,
    /// Handlers that panicked
    pub handler_panics: u64,
}

/// What a single cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// Nothing actionable, or the command was already handled; the brief
    /// backoff was applied
    Idle,
    /// Latest message came from an ignored author
    Ignored,
    /// A command-form message was processed and the cooldown applied
    Dispatched,
}

/// Single-channel command bot loop
pub struct AgentLoop<S: ChannelSession> {
    session: S,
    registry: CommandRegistry,
    ignored: IgnoreList,
    clock: Arc<dyn Clock>,
    config: LoopConfig,
    shutdown: ShutdownHandle,
    state: LoopState,
    stats: LoopStats,
    last_handled: Option<ChannelMessage>,
}

impl<S: ChannelSession> AgentLoop<S> {
    /// Create a new loop builder around a session
    pub fn builder(session: S) -> AgentLoopBuilder<S> {
        AgentLoopBuilder::new(session)
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn ignored(&self) -> &IgnoreList {
        &self.ignored
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    /// Handle that stops the loop at the top of its next iteration
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Authenticate, then poll and dispatch until a stop is requested
    ///
    /// The session is closed on every exit path. Authentication failure is
    /// returned as an error without retrying.
    pub async fn run(&mut self, credentials: &Credentials) -> Result<LoopStats> {
        info!(
            "Starting agent loop on {} with {} commands",
            self.session.channel_url(),
            self.registry.len()
        );

        self.state = LoopState::Authenticating;
        if let Err(e) = self.session.authenticate(credentials).await {
            error!("Authentication failed: {}", e);
            self.close_session().await;
            return Err(e.into());
        }
        info!("Authenticated as {}", credentials.username);

        while !self.shutdown.is_stopped() {
            self.cycle().await;
        }

        info!("Exiting!");
        self.close_session().await;
        Ok(self.stats.clone())
    }

    /// Run one observe/dispatch cycle, including its backoff or cooldown
    pub async fn cycle(&mut self) -> Cycle {
        self.state = LoopState::Polling;
        self.stats.polls += 1;

        let message = match self.session.read_latest().await {
            Ok(message) => message,
            Err(e) => {
                if e.is_timeout() {
                    debug!("{}", e);
                } else {
                    warn!("Failed to read channel: {}", e);
                    self.stats.read_failures += 1;
                }
                self.clock.sleep(self.config.backoff).await;
                return Cycle::Idle;
            }
        };

        if self.ignored.contains(&message.author) {
            self.stats.ignored_messages += 1;
            self.clock.sleep(self.config.backoff).await;
            return Cycle::Ignored;
        }

        let Some(invocation) = CommandInvocation::parse(&message.text) else {
            self.clock.sleep(self.config.backoff).await;
            return Cycle::Idle;
        };

        if self.last_handled.as_ref() == Some(&message) {
            debug!("Already handled {:?} from {}", message.text, message.author);
            self.clock.sleep(self.config.backoff).await;
            return Cycle::Idle;
        }

        self.state = LoopState::Dispatching;
        self.dispatch(&message.author, invocation).await;
        self.last_handled = Some(message);

        self.state = LoopState::Cooldown;
        self.clock.sleep(self.config.cooldown).await;
        Cycle::Dispatched
    }

    async fn dispatch(&mut self, author: &str, invocation: CommandInvocation) {
        let CommandInvocation { keyword, arguments } = invocation;

        let Some(handler) = self.registry.resolve(&keyword) else {
            debug!("Ignoring unknown command !{} from {}", keyword, author);
            self.stats.unknown_commands += 1;
            return;
        };

        info!("Dispatching !{} {:?} from {}", keyword, arguments, author);
        self.stats.dispatches += 1;

        let (outcome, pause) = {
            let mut ctx = CommandContext::new(author, &self.registry, &mut self.ignored);
            let result = AssertUnwindSafe(handler.invoke(&mut ctx, &arguments))
                .catch_unwind()
                .await;
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(panic) => {
                    let reason = panic
                        .downcast_ref::<&str>()
                        .map(ToString::to_string)
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    error!("Handler for !{} panicked: {}", keyword, reason);
                    self.stats.handler_panics += 1;
                    Outcome::Errored(self.config.panic_notice.clone())
                }
            };
            (outcome, ctx.take_pause())
        };

        if let Outcome::Errored(notice) = &outcome {
            debug!("!{} reported a failure: {}", keyword, notice);
        }

        if let Some(text) = outcome.text() {
            if let Err(e) = self.session.write(text).await {
                warn!("Reply to !{} was lost: {}", keyword, e);
                self.stats.write_failures += 1;
            }
        }

        if let Some(pause) = pause {
            info!("!{} paused the bot for {:?}", keyword, pause);
            self.clock.sleep(pause).await;
        }
    }

    async fn close_session(&mut self) {
        if let Err(e) = self.session.close().await {
            warn!("Failed to close session: {}", e);
        }
        self.state = LoopState::Stopped;
    }
}

/// Builder for AgentLoop
pub struct AgentLoopBuilder<S: ChannelSession> {
    session: S,
    registry: CommandRegistry,
    ignored: IgnoreList,
    clock: Arc<dyn Clock>,
    config: LoopConfig,
    shutdown: ShutdownHandle,
}

impl<S: ChannelSession> AgentLoopBuilder<S> {
    /// Create a new loop builder
    pub fn new(session: S) -> Self {
        Self {
            session,
            registry: CommandRegistry::new(),
            ignored: IgnoreList::new(),
            clock: Arc::new(TokioClock),
            config: LoopConfig::default(),
            shutdown: ShutdownHandle::new(),
        }
    }

    /// Set the command registry
    pub fn registry(mut self, registry: CommandRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the initial ignore list
    pub fn ignored(mut self, ignored: IgnoreList) -> Self {
        self.ignored = ignored;
        self
    }

    /// Set the time source
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the loop configuration
    pub fn config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the cooldown applied after each dispatch
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.config.cooldown = cooldown;
        self
    }

    /// Set the backoff applied to quiet polls
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.config.backoff = backoff;
        self
    }

    /// Share an existing shutdown handle
    pub fn shutdown(mut self, shutdown: ShutdownHandle) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Build the loop
    pub fn build(self) -> AgentLoop<S> {
        AgentLoop {
            session: self.session,
            registry: self.registry,
            ignored: self.ignored,
            clock: self.clock,
            config: self.config,
            shutdown: self.shutdown,
            state: LoopState::Idle,
            stats: LoopStats::default(),
            last_handled: None,
        }
    }
}
