use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::commands::{AdminCommand, Command};
use crate::config::Config;
use crate::database::Database;
use crate::handlers::admin::is_admin;
use crate::handlers::{HandlerResult, report_handler_error};
use std::sync::Arc;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    db: Arc<Database>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = from.id.0 as i64;

    match cmd {
        Command::Start => {
            let existing = match db.find_user(user_id).await {
                Ok(user) => user,
                Err(e) => {
                    report_handler_error(&bot, config.admin_user_id, "start", &e).await;
                    return Ok(());
                }
            };

            if existing.is_some() {
                bot.send_message(msg.chat.id, "You are already subscribed to the broadcast list.")
                    .await?;
                return Ok(());
            }

            // The configured id only seeds the flag here; every later admin
            // check reads the stored flag back.
            let is_admin = user_id == config.admin_user_id;
            if let Err(e) = db.create_user(user_id, is_admin).await {
                report_handler_error(&bot, config.admin_user_id, "start", &e).await;
                return Ok(());
            }

            bot.send_message(msg.chat.id, "You are subscribed to the broadcast list.")
                .await?;
            if is_admin {
                bot.send_message(msg.chat.id, "You are registered as the administrator.")
                    .await?;
            }
        }
        Command::Help => {
            let mut help_text = Command::descriptions().to_string();

            match is_admin(&db, user_id).await {
                Ok(true) => {
                    help_text.push_str("\n\n");
                    help_text.push_str(&AdminCommand::descriptions().to_string());
                }
                Ok(false) => {}
                Err(e) => {
                    report_handler_error(&bot, config.admin_user_id, "help", &e).await;
                    return Ok(());
                }
            }

            bot.send_message(msg.chat.id, help_text).await?;
        }
    };

    Ok(())
}
