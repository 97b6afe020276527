//! Bounded transcript of a single chat run.

use std::collections::VecDeque;

use crate::chat::ChatMessage;

/// Sliding window over the most recent messages of a run.
///
/// FIFO: once the window is full, remembering a new message drops the
/// oldest one. Nothing is persisted; the transcript lives and dies with the
/// run.
///
/// ## Example
///
/// ```
/// use chatform::chat::ChatMessage;
/// use chatform::memory::SlidingWindowMemory;
///
/// let mut memory = SlidingWindowMemory::new(2);
/// memory.remember(&ChatMessage::user().content("Hello").build());
/// memory.remember(&ChatMessage::assistant().content("Hi there!").build());
/// memory.remember(&ChatMessage::user().content("How are you?").build());
///
/// // Only the last 2 messages are kept
/// assert_eq!(memory.len(), 2);
/// assert_eq!(memory.messages()[0].content, "Hi there!");
/// ```
#[derive(Debug, Clone)]
pub struct SlidingWindowMemory {
    messages: VecDeque<ChatMessage>,
    window_size: usize,
}

impl SlidingWindowMemory {
    /// Creates a window that keeps at most `window_size` messages.
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is 0
    pub fn new(window_size: usize) -> Self {
        if window_size == 0 {
            panic!("Window size must be greater than 0");
        }

        Self {
            messages: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// The configured capacity of the window.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Remembers a message, dropping the oldest one once the window is full.
    pub fn remember(&mut self, message: &ChatMessage) {
        if self.messages.len() >= self.window_size {
            self.messages.pop_front();
        }
        self.messages.push_back(message.clone());
    }

    /// All stored messages, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        Vec::from(self.messages.clone())
    }

    /// The most recent `limit` messages, oldest first.
    pub fn recent_messages(&self, limit: usize) -> Vec<ChatMessage> {
        let len = self.messages.len();
        let start = len.saturating_sub(limit);
        self.messages.range(start..).cloned().collect()
    }

    /// How many messages the window currently holds.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when the window holds nothing.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Forgets every stored message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(content: &str) -> ChatMessage {
        ChatMessage::user().content(content).build()
    }

    #[test]
    fn keeps_messages_in_arrival_order() {
        let mut memory = SlidingWindowMemory::new(5);
        memory.remember(&user("one"));
        memory.remember(&user("two"));
        let contents: Vec<_> = memory.messages().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, ["one", "two"]);
    }

    #[test]
    fn evicts_the_oldest_message_when_full() {
        let mut memory = SlidingWindowMemory::new(2);
        memory.remember(&user("one"));
        memory.remember(&user("two"));
        memory.remember(&user("three"));
        let contents: Vec<_> = memory.messages().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, ["two", "three"]);
    }

    #[test]
    fn recent_messages_returns_the_tail() {
        let mut memory = SlidingWindowMemory::new(5);
        for content in ["one", "two", "three"] {
            memory.remember(&user(content));
        }
        let recent: Vec<_> = memory
            .recent_messages(2)
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(recent, ["two", "three"]);
        assert_eq!(memory.recent_messages(10).len(), 3);
    }

    #[test]
    fn clear_empties_the_window() {
        let mut memory = SlidingWindowMemory::new(2);
        memory.remember(&user("one"));
        memory.clear();
        assert!(memory.is_empty());
        assert_eq!(memory.window_size(), 2);
    }

    #[test]
    #[should_panic(expected = "Window size must be greater than 0")]
    fn zero_window_panics() {
        SlidingWindowMemory::new(0);
    }
}
