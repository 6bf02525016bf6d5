//! Conversation memory — the ordered message list sent to the gateway in
//! stateful mode.
//!
//! The first message, once seeded, is the system primer. `clear` drops it
//! along with everything else; the session controller re-seeds right after.
//! An optional cap bounds the number of non-primer messages (FIFO eviction,
//! oldest first, primer never evicted). After eviction the first non-primer
//! message is never an assistant reply.

use crate::llm::{Message, Role};

/// Default cap on non-primer messages.
pub const DEFAULT_MEMORY_CAP: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    messages: Vec<Message>,
    /// `None` = unbounded.
    cap: Option<usize>,
}

impl ConversationMemory {
    pub fn new(cap: Option<usize>) -> Self {
        Self { messages: Vec::new(), cap }
    }

    /// Set or overwrite the primer.
    pub fn seed(&mut self, system_text: &str) {
        let primer = Message::system(system_text);
        match self.messages.first_mut() {
            Some(first) if first.role == Role::System => *first = primer,
            _ => self.messages.insert(0, primer),
        }
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
        self.enforce_cap();
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn as_prompt_context(&self) -> &[Message] {
        &self.messages
    }

    pub fn primer(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn enforce_cap(&mut self) {
        let Some(cap) = self.cap else { return };
        let keep_from = usize::from(self.primer().is_some());
        let turns = self.messages.len() - keep_from;
        if turns <= cap {
            return;
        }
        let mut evict = turns - cap;
        // Never leave a reply whose question was evicted.
        while self.messages.get(keep_from + evict).is_some_and(|m| m.role == Role::Assistant) {
            evict += 1;
        }
        self.messages.drain(keep_from..keep_from + evict);
    }
}
