use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "snake_case",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "subscribe to the broadcast list.")]
    Start,
    #[command(description = "display this text.")]
    Help,
}

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "snake_case", description = "Administrator commands:")]
pub enum AdminCommand {
    #[command(description = "show the number of subscribers.")]
    ListUsers,
    #[command(description = "show the broadcast history.")]
    ListMessages,
    #[command(description = "send a message to every subscriber.")]
    Broadcast,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_commands_parse() {
        assert!(matches!(Command::parse("/start", "testbot"), Ok(Command::Start)));
        assert!(matches!(Command::parse("/help", "testbot"), Ok(Command::Help)));
    }

    #[test]
    fn test_admin_commands_parse() {
        assert!(matches!(
            AdminCommand::parse("/list_users", "testbot"),
            Ok(AdminCommand::ListUsers)
        ));
        assert!(matches!(
            AdminCommand::parse("/list_messages", "testbot"),
            Ok(AdminCommand::ListMessages)
        ));
        assert!(matches!(
            AdminCommand::parse("/broadcast", "testbot"),
            Ok(AdminCommand::Broadcast)
        ));
    }

    #[test]
    fn test_admin_commands_are_not_user_commands() {
        assert!(Command::parse("/broadcast", "testbot").is_err());
        assert!(Command::parse("/list_users", "testbot").is_err());
    }

    #[test]
    fn test_descriptions_list_every_command() {
        let help = Command::descriptions().to_string();
        assert!(help.contains("/start"));
        assert!(help.contains("/help"));

        let admin_help = AdminCommand::descriptions().to_string();
        assert!(admin_help.contains("/list_users"));
        assert!(admin_help.contains("/list_messages"));
        assert!(admin_help.contains("/broadcast"));
    }
}
