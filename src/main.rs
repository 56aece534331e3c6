use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dptree;
use teloxide::prelude::*;
use std::sync::Arc;
use anyhow::Error;

use crate::commands::{AdminCommand, Command};
use crate::config::Config;
use crate::database::Database;
use crate::handlers::{
    BroadcastState, admin_command_handler, command_handler, receive_broadcast_message,
    start_broadcast,
};

mod commands;
mod config;
mod database;
mod handlers;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // --- Logging Setup ---
    use log::LevelFilter;
    use std::env;
    use std::io::Write;

    let console_level_str = env::var("CONSOLE_LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string());
    let console_level = match console_level_str.to_uppercase().as_str() {
        "ERROR" => LevelFilter::Error,
        "DEBUG" => LevelFilter::Debug,
        _ => LevelFilter::Info, // Default to Info
    };

    let mut builder = pretty_env_logger::formatted_builder();
    builder
        .filter(None, console_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    log::info!("Starting broadcast bot...");

    dotenv::dotenv().ok();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load environment: {}", e);
            return Err(e);
        }
    };

    let db = match Database::connect(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("Failed to connect to the database: {}", e);
            return Err(e.into());
        }
    };
    if let Err(e) = db.init_schema().await {
        log::error!("Failed to initialize the database: {}", e);
        return Err(e.into());
    }
    log::info!("Database initialized successfully.");

    let bot = Bot::new(config.bot_token.clone());
    let db = Arc::new(db);
    let config = Arc::new(config);

    let handler = Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<BroadcastState>, BroadcastState>()
        // While a broadcast is being composed, every message in that chat
        // belongs to the conversation.
        .branch(
            dptree::case![BroadcastState::WaitingForMessage].endpoint(receive_broadcast_message),
        )
        .branch(dptree::entry().filter_command::<Command>().endpoint(command_handler))
        .branch(
            dptree::entry()
                .filter_command::<AdminCommand>()
                .branch(dptree::case![AdminCommand::Broadcast].endpoint(start_broadcast))
                .endpoint(admin_command_handler),
        );

    log::info!("Starting to dispatch updates...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            db.clone(),
            config,
            InMemStorage::<BroadcastState>::new()
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    db.close().await;
    log::info!("Bot shutdown complete");
    Ok(())
}
