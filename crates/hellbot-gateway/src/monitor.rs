//! Best-effort dual-sink operator logging.
//!
//! Every line always lands in the structured process logs; mirroring to the
//! monitor channel is best-effort and a mirror failure never propagates.

use std::sync::Arc;

use hellbot_core::ChannelId;

use crate::chat::ChatClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorLevel {
    Info,
    Warn,
    Error,
}

pub struct MonitorLog {
    chat: Arc<dyn ChatClient>,
    channel: ChannelId,
}

impl MonitorLog {
    pub fn new(chat: Arc<dyn ChatClient>, channel: ChannelId) -> Self {
        Self { chat, channel }
    }

    pub async fn info(&self, message: &str) {
        self.emit(MonitorLevel::Info, message).await;
    }

    pub async fn warn(&self, message: &str) {
        self.emit(MonitorLevel::Warn, message).await;
    }

    pub async fn error(&self, message: &str) {
        self.emit(MonitorLevel::Error, message).await;
    }

    async fn emit(&self, level: MonitorLevel, message: &str) {
        match level {
            MonitorLevel::Info => tracing::info!("{message}"),
            MonitorLevel::Warn => tracing::warn!("{message}"),
            MonitorLevel::Error => tracing::error!("{message}"),
        }
        if let Err(error) = self.chat.send_message(self.channel, message).await {
            tracing::warn!("failed to mirror log line to monitor channel: {error:#}");
        }
    }
}
