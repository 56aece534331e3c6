use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};
use teloxide::prelude::*;
use teloxide::types::ChatId;

use crate::config::Config;
use crate::database::Database;
use crate::handlers::admin::{NO_PERMISSION, is_admin};
use crate::handlers::{HandlerResult, report_handler_error};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

type BroadcastDialogue = Dialogue<BroadcastState, InMemStorage<BroadcastState>>;

const CANCEL_KEYWORD: &str = "/cancel";

#[derive(Clone, Default, Debug)]
pub enum BroadcastState {
    #[default]
    Idle,
    WaitingForMessage,
}

pub async fn start_broadcast(
    bot: Bot,
    dialogue: BroadcastDialogue,
    msg: Message,
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
            report_handler_error(&bot, config.admin_user_id, "broadcast", &e).await;
            return Ok(());
        }
    };
    if !admin {
        bot.send_message(msg.chat.id, NO_PERMISSION).await?;
        return Ok(());
    }

    bot.send_message(
        msg.chat.id,
        "📢 Send the message to broadcast.\n/cancel to abort.",
    )
    .await?;
    dialogue.update(BroadcastState::WaitingForMessage).await?;

    Ok(())
}

pub async fn receive_broadcast_message(
    bot: Bot,
    dialogue: BroadcastDialogue,
    msg: Message,
    db: Arc<Database>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(from) = msg.from.as_ref() else {
        dialogue.exit().await?;
        return Ok(());
    };
    let user_id = from.id.0 as i64;

    // The cancel keyword and anything without text both abort the broadcast.
    let text = match msg.text() {
        Some(text) if text != CANCEL_KEYWORD => text.to_owned(),
        _ => {
            bot.send_message(msg.chat.id, "❌ Broadcast cancelled.").await?;
            dialogue.exit().await?;
            return Ok(());
        }
    };

    // Re-read the stored flag at submit time; a sender that is no longer an
    // admin gets no reply and the conversation simply ends.
    let admin = match is_admin(&db, user_id).await {
        Ok(admin) => admin,
        Err(e) => {
            report_handler_error(&bot, config.admin_user_id, "broadcast", &e).await;
            dialogue.exit().await?;
            return Ok(());
        }
    };
    if !admin {
        dialogue.exit().await?;
        return Ok(());
    }

    let subscribers = match db.all_users().await {
        Ok(users) => users,
        Err(e) => {
            report_handler_error(&bot, config.admin_user_id, "broadcast", &e).await;
            dialogue.exit().await?;
            return Ok(());
        }
    };

    let recipients: Vec<i64> = subscribers.iter().map(|user| user.user_id).collect();
    let total = recipients.len();
    let (sent, failed) = deliver_to_all(recipients, |chat_id| {
        let bot = bot.clone();
        let text = text.clone();
        async move { bot.send_message(ChatId(chat_id), text).await.map(|_| ()) }
    })
    .await;
    log::info!("Broadcast delivered to {}/{} subscribers ({} failed)", sent, total, failed);

    if let Err(e) = db.add_message(user_id, &text).await {
        report_handler_error(&bot, config.admin_user_id, "broadcast", &e).await;
        dialogue.exit().await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, "✅ Broadcast sent.").await?;
    dialogue.exit().await?;

    Ok(())
}

/// Attempts delivery to every recipient and returns (sent, failed) counts.
/// Each send is isolated: a failure is logged and the loop moves on.
async fn deliver_to_all<F, Fut, E>(recipients: Vec<i64>, mut send: F) -> (usize, usize)
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let mut sent = 0;
    let mut failed = 0;

    for chat_id in recipients {
        match send(chat_id).await {
            Ok(()) => sent += 1,
            Err(e) => {
                log::warn!("Failed to send to {}: {}", chat_id, e);
                failed += 1;
            }
        }
    }

    (sent, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[tokio::test]
    async fn test_one_failed_delivery_does_not_stop_the_fan_out() {
        let attempted = RefCell::new(Vec::new());

        let (sent, failed) = deliver_to_all(vec![100, 200, 300], |chat_id| {
            attempted.borrow_mut().push(chat_id);
            async move {
                if chat_id == 200 {
                    Err("bot was blocked by the user".to_string())
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(*attempted.borrow(), vec![100, 200, 300]);
        assert_eq!(sent, 2);
        assert_eq!(failed, 1);
    }

    #[tokio::test]
    async fn test_all_deliveries_succeed() {
        let (sent, failed) = deliver_to_all(vec![1, 2, 3], |_| async { Ok::<_, String>(()) }).await;

        assert_eq!(sent, 3);
        assert_eq!(failed, 0);
    }

    #[tokio::test]
    async fn test_no_recipients() {
        let (sent, failed) = deliver_to_all(vec![], |_| async { Ok::<_, String>(()) }).await;

        assert_eq!(sent, 0);
        assert_eq!(failed, 0);
    }
}
