use super::types::Message;
use parking_lot::RwLock;
use std::sync::Arc;

/// Append-only, session-lifetime message log shared between the
/// conversation core and the UI.
#[derive(Debug, Clone)]
pub struct MessageStorage {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl MessageStorage {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn add(&self, message: Message) {
        self.messages.write().push(message);
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    /// The most recent `n` entries, oldest first
    pub fn last_n(&self, n: usize) -> Vec<Message> {
        let messages = self.messages.read();
        let start = messages.len().saturating_sub(n);
        messages[start..].to_vec()
    }

    pub fn clear(&self) {
        self.messages.write().clear();
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

impl Default for MessageStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_between_clones() {
        let storage = MessageStorage::new();
        let view = storage.clone();
        storage.add(Message::user("one"));
        assert_eq!(view.len(), 1);
        assert!(!view.is_empty());
    }

    #[test]
    fn test_last_n() {
        let storage = MessageStorage::new();
        for text in ["a", "b", "c"] {
            storage.add(Message::user(text));
        }
        let tail: Vec<String> = storage.last_n(2).into_iter().map(|m| m.text).collect();
        assert_eq!(tail, vec!["b", "c"]);
        assert_eq!(storage.last_n(10).len(), 3);
    }
}
