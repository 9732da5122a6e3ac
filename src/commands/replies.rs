//! Canned assistant replies

pub const PLAY_MUSIC: &str = "I'd love to play music on Spotify for you! 🎵 In a real implementation, I would connect to the Spotify API to play your requested song.";

pub const OPEN_FOLDER: &str = "Opening your documents folder! 📁 In a full implementation, I would access your local file system to open the requested folder.";

pub const WEB_SEARCH: &str = "Searching Google for you! 🔍 I would normally open a new browser tab with your search query.";

pub const SHUTDOWN_REFUSAL: &str = "I cannot shut down your system for security reasons, but I understand you want to power off your device! 💻";

pub const WEATHER: &str = "I'd love to check the weather for you! ☀️ In a full implementation, I would connect to a weather API to get current conditions.";

pub const GREETING: &str = "Hello there! 👋 I'm your AI assistant. How can I help you today?";

pub const FALLBACK: &str = "I hear you! While I'm still learning, I can help with basic commands like playing music, opening folders, searching Google, and checking the time. What would you like me to do? ✨";

/// Reply for the time rule
pub fn current_time(formatted: &str) -> String {
    format!("The current time is {}! ⏰", formatted)
}

/// Example commands shown on the welcome screen
pub const EXAMPLE_COMMANDS: [&str; 4] = [
    "Play my favorite song on Spotify",
    "Open my documents folder",
    "Search Google for pizza places",
    "What time is it?",
];
