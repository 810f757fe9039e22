use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a chat bubble. `System` is used for status and error notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
    System,
}

/// Extra payload attached to a message. A closed set so renderers can match
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageExtra {
    None,
    QuickActions { actions: Vec<String> },
}

impl Default for MessageExtra {
    fn default() -> Self {
        MessageExtra::None
    }
}

/// One entry in the conversation view. Lives only in the browser's message
/// list; the server only produces the seed messages below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    /// Display time, e.g. "14:05".
    pub timestamp: String,
    #[serde(default)]
    pub extra: MessageExtra,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, sender: Sender, extra: MessageExtra) -> Self {
        ChatMessage {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            timestamp: chrono::Local::now().format("%H:%M").to_string(),
            extra,
        }
    }
}

/// Status lines cycled through while a query is outstanding. The UI advances
/// one stage every few seconds and holds on the last.
pub const LOADING_STAGES: [&str; 7] = [
    "Scanning for real-time disruption data...",
    "Gathering information from multiple sources...",
    "Processing real-time updates... (1/3)",
    "Processing real-time updates... (2/3)",
    "Processing real-time updates... (3/3)",
    "Identifying relevant information...",
    "Summarizing findings...",
];

/// The welcome message seeded into every fresh conversation.
pub fn welcome_message() -> ChatMessage {
    let date = chrono::Local::now().format("%A, %B %-d").to_string();
    ChatMessage::new(
        format!(
            "\u{1F44B} Hello! Welcome to Hyperlocal.\n\nToday is {date} and I'm here to help \
you with real-time information about disruptions in your area, including traffic delays, \
public transport issues, weather events, and more.\n\nJust let me know which city or area \
you're interested in, and I'll find the latest updates for you! You can also click one of \
the buttons below to get started with some live examples."
        ),
        Sender::Ai,
        MessageExtra::QuickActions {
            actions: vec![
                "Any road closed in Paris?".to_string(),
                "Weather alerts in California".to_string(),
                "Airport delays in New York City".to_string(),
                "Public transport issues in London".to_string(),
            ],
        },
    )
}

/// Shown right after the welcome message when the password gate is active.
pub fn password_notice() -> ChatMessage {
    ChatMessage::new(
        "Hyperlocal is currently password-protected for jury members only due to unexpected \
automated queries from bots. To ensure the application remains functional for the hackathon \
evaluation, we've implemented this protection measure.\n\nPlease enter the jury password to \
access the full functionality.",
        Sender::System,
        MessageExtra::None,
    )
}
