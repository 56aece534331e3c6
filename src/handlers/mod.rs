pub mod admin;
pub mod broadcast;
pub mod command;

use std::fmt::Display;

use teloxide::prelude::*;
use teloxide::types::ChatId;

pub use admin::admin_command_handler;
pub use broadcast::{BroadcastState, receive_broadcast_message, start_broadcast};
pub use command::command_handler;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Persistence failures are logged and forwarded to the configured
/// administrator, naming the handler that hit them. The handler itself then
/// returns normally so one bad update cannot take the dispatcher down.
pub async fn report_handler_error(
    bot: &Bot,
    admin_user_id: i64,
    handler: &str,
    error: &impl Display,
) {
    log::error!("{} failed: {}", handler, error);

    let report = format!("{} failed: {}", handler, error);
    if let Err(e) = bot.send_message(ChatId(admin_user_id), report).await {
        log::error!("Could not deliver error report to admin: {}", e);
    }
}
