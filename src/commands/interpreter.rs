use super::replies;
use super::search::{search_request, NavigationRequest, SearchConfig};
use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which rule produced a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    PlayMusic,
    OpenFolder,
    WebSearch,
    Shutdown,
    Time,
    Weather,
    Greeting,
    Fallback,
}

impl CommandKind {
    /// Whether a lowercased utterance triggers this rule
    fn matches(self, lower: &str) -> bool {
        match self {
            CommandKind::PlayMusic => lower.contains("play") && lower.contains("spotify"),
            CommandKind::OpenFolder => {
                lower.contains("open") && (lower.contains("documents") || lower.contains("folder"))
            }
            CommandKind::WebSearch => lower.contains("search") && lower.contains("google"),
            CommandKind::Shutdown => lower.contains("shut down") || lower.contains("shutdown"),
            CommandKind::Time => lower.contains("time"),
            CommandKind::Weather => lower.contains("weather"),
            // Substring match: "this" and "which" greet too
            CommandKind::Greeting => lower.contains("hello") || lower.contains("hi"),
            CommandKind::Fallback => true,
        }
    }
}

/// Rules in priority order. The first match wins.
const RULES: [CommandKind; 8] = [
    CommandKind::PlayMusic,
    CommandKind::OpenFolder,
    CommandKind::WebSearch,
    CommandKind::Shutdown,
    CommandKind::Time,
    CommandKind::Weather,
    CommandKind::Greeting,
    CommandKind::Fallback,
];

/// Outcome of interpreting one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub kind: CommandKind,
    pub reply: String,
    /// Page to open as a side effect of the reply
    pub navigation: Option<NavigationRequest>,
}

/// Format a wall-clock time the way an en-US locale prints it (`3:07:09 PM`)
pub fn format_local_time(time: NaiveTime) -> String {
    time.format("%-I:%M:%S %p").to_string()
}

#[derive(Debug, Clone, Default)]
pub struct CommandInterpreter {
    search: SearchConfig,
}

impl CommandInterpreter {
    pub fn new(search: SearchConfig) -> Self {
        Self { search }
    }

    /// Interpret an utterance against the current local time
    pub fn interpret(&self, utterance: &str) -> Interpretation {
        self.interpret_at(utterance, Local::now().time())
    }

    /// Interpret an utterance; `now` feeds the time rule
    pub fn interpret_at(&self, utterance: &str, now: NaiveTime) -> Interpretation {
        let lower = utterance.to_lowercase();
        let kind = RULES
            .into_iter()
            .find(|rule| rule.matches(&lower))
            .unwrap_or(CommandKind::Fallback);

        debug!("Utterance matched {:?}", kind);

        let mut navigation = None;
        let reply = match kind {
            CommandKind::PlayMusic => replies::PLAY_MUSIC.to_string(),
            CommandKind::OpenFolder => replies::OPEN_FOLDER.to_string(),
            CommandKind::WebSearch => {
                navigation = search_request(utterance, &self.search);
                replies::WEB_SEARCH.to_string()
            }
            CommandKind::Shutdown => replies::SHUTDOWN_REFUSAL.to_string(),
            CommandKind::Time => replies::current_time(&format_local_time(now)),
            CommandKind::Weather => replies::WEATHER.to_string(),
            CommandKind::Greeting => replies::GREETING.to_string(),
            CommandKind::Fallback => replies::FALLBACK.to_string(),
        };

        Interpretation {
            kind,
            reply,
            navigation,
        }
    }
}
