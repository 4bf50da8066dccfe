//! Event dispatch with a single failure-isolation boundary.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use hellbot_gateway::MonitorLog;

use crate::events::GuildEvent;

/// A lifecycle handler. Handlers receive every event and ignore the kinds
/// they do not react to; an `Err` return is the failure channel and is
/// consumed at the router boundary.
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &GuildEvent) -> Result<()>;
}

/// Registry of handlers plus the catch-log-continue boundary.
///
/// Registration is explicit at bootstrap. `dispatch` hands the event to every
/// handler in registration order; a handler failure is logged, mirrored to
/// the monitor channel, and swallowed, so no error ever reaches the event
/// loop and no handler can starve another of an event.
pub struct EventRouter {
    handlers: Vec<Arc<dyn EventHandler>>,
    monitor: Arc<MonitorLog>,
}

impl EventRouter {
    pub fn new(monitor: Arc<MonitorLog>) -> Self {
        Self {
            handlers: Vec::new(),
            monitor,
        }
    }

    pub fn register(&mut self, handler: Arc<dyn EventHandler>) {
        tracing::info!("registered handler: {}", handler.name());
        self.handlers.push(handler);
    }

    pub async fn dispatch(&self, event: &GuildEvent) {
        for handler in &self.handlers {
            if let Err(error) = handler.handle(event).await {
                let line = format!(
                    "handler '{}' failed on {} event: {error:#}",
                    handler.name(),
                    event.kind()
                );
                self.monitor.error(&line).await;
            }
        }
    }
}
