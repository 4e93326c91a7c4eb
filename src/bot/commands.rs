//! Keyword commands understood by the bot

/// What a message asks the bot to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Unsubscribe,
    Subscribe,
    Help,
    /// Fallback: reply with the current released versions
    Version,
}

/// Keywords in precedence order. "unsubscribe" must come before
/// "subscribe" since the former contains the latter.
const COMMANDS: &[(&str, Command)] = &[
    ("unsubscribe", Command::Unsubscribe),
    ("subscribe", Command::Subscribe),
    ("help", Command::Help),
];

/// Resolves a message body to the first matching command
pub fn parse_command(text: &str) -> Command {
    let text = text.to_lowercase();
    COMMANDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, command)| *command)
        .unwrap_or(Command::Version)
}
