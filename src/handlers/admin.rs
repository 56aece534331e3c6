use teloxide::prelude::*;

use crate::commands::AdminCommand;
use crate::config::Config;
use crate::database::{BroadcastMessage, Database};
use crate::handlers::{HandlerResult, report_handler_error};
use std::sync::Arc;

pub const NO_PERMISSION: &str = "⛔ This command is for admins only.";

/// The stored flag is the source of truth for admin status; it is seeded from
/// the configured id when the user first subscribes and never re-derived.
pub async fn is_admin(db: &Database, user_id: i64) -> Result<bool, sqlx::Error> {
    Ok(db
        .find_user(user_id)
        .await?
        .is_some_and(|user| user.is_admin))
}

pub fn format_history(messages: &[BroadcastMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{} - {}", m.timestamp.format("%Y-%m-%d %H:%M:%S"), m.message))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn admin_command_handler(
    bot: Bot,
    msg: Message,
    cmd: AdminCommand,
    db: Arc<Database>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = from.id.0 as i64;

    let admin = match is_admin(&db, user_id).await {
        Ok(admin) => admin,
        Err(e) => {
            report_handler_error(&bot, config.admin_user_id, "admin command", &e).await;
            return Ok(());
        }
    };
    if !admin {
        bot.send_message(msg.chat.id, NO_PERMISSION).await?;
        return Ok(());
    }

    match cmd {
        AdminCommand::ListUsers => match db.count_users().await {
            Ok(count) => {
                bot.send_message(msg.chat.id, format!("Subscribers: {}", count))
                    .await?;
            }
            Err(e) => {
                report_handler_error(&bot, config.admin_user_id, "list_users", &e).await;
            }
        },
        AdminCommand::ListMessages => match db.all_messages().await {
            Ok(messages) if messages.is_empty() => {
                bot.send_message(msg.chat.id, "No broadcast messages have been sent yet.")
                    .await?;
            }
            Ok(messages) => {
                bot.send_message(msg.chat.id, format_history(&messages)).await?;
            }
            Err(e) => {
                report_handler_error(&bot, config.admin_user_id, "list_messages", &e).await;
            }
        },
        // Routed to the broadcast dialogue before this endpoint is reached.
        AdminCommand::Broadcast => {}
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: i32, message: &str) -> BroadcastMessage {
        BroadcastMessage {
            id,
            user_id: 100,
            message: message.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_format_history_joins_one_line_per_record() {
        let messages = vec![record(1, "first announcement"), record(2, "second one")];

        assert_eq!(
            format_history(&messages),
            "2024-05-17 12:30:00 - first announcement\n2024-05-17 12:30:00 - second one"
        );
    }

    #[test]
    fn test_format_history_empty() {
        assert_eq!(format_history(&[]), "");
    }
}
