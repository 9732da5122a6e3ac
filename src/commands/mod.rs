//! Keyword command interpretation
//!
//! Maps a free-text utterance to a canned reply using an ordered rule list.
//! The only rule with an external effect (web search) returns its navigation
//! request as data so the interpreter itself stays pure.

pub mod interpreter;
pub mod replies;
pub mod search;

pub use interpreter::{CommandInterpreter, CommandKind, Interpretation};
pub use search::{NavigationRequest, SearchConfig};
