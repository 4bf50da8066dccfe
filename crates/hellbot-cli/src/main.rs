//! Process bootstrap: configuration, store connection, handler registration,
//! event loop.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use hellbot_core::BotConfig;
use hellbot_discord_runtime::DiscordChatClient;
use hellbot_gateway::{ChatClient, MonitorLog, RegistryStore};
use hellbot_runtime::handlers::{
    ArrivalHandler, DepartureHandler, NicknameHandler, PromotionHandler, ReconcileHandler,
};
use hellbot_runtime::EventRouter;
use hellbot_store::MongoRegistryStore;

#[derive(Debug, Parser)]
#[command(name = "hellbot", about = "Guild community-management bot", version)]
struct Cli {
    /// Validate the configuration and exit without connecting.
    #[arg(long)]
    validate_only: bool,
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // Configuration errors are fatal before anything connects.
    let config = BotConfig::from_env().context("configuration validation failed")?;
    if cli.validate_only {
        println!("configuration ok");
        return Ok(());
    }

    // The store connection is established once, here, before the event loop
    // starts; handlers share the same client and never open their own.
    let store = MongoRegistryStore::connect(&config.mongo_uri).await?;
    if let Err(error) = store.ensure_indexes().await {
        tracing::error!("failed to ensure document store indexes: {error:#}");
    }
    let store: Arc<dyn RegistryStore> = Arc::new(store);

    let chat: Arc<dyn ChatClient> =
        Arc::new(DiscordChatClient::from_token(&config.discord_token));
    let monitor = Arc::new(MonitorLog::new(chat.clone(), config.monitor_channel));

    let mut router = EventRouter::new(monitor);
    router.register(Arc::new(DepartureHandler::new(
        chat.clone(),
        config.kia_channel,
    )));
    router.register(Arc::new(NicknameHandler::new(store.clone())));
    router.register(Arc::new(PromotionHandler::new(
        chat.clone(),
        store.clone(),
        config.cadet_role,
        config.cadet_chat,
        config.class_a_role,
        config.welcome_channel,
    )));
    router.register(Arc::new(ArrivalHandler::new(
        chat.clone(),
        store.clone(),
        config.welcome_channel,
        config.standard_role,
    )));
    router.register(Arc::new(ReconcileHandler::new(
        chat.clone(),
        config.standard_role,
    )));

    hellbot_discord_runtime::run(&config.discord_token, Arc::new(router)).await
}
