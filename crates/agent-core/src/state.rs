//! Conversation State
//!
//! Owned by exactly one in-flight turn; never shared between conversations.

use crate::citation::{SearchResult, extract_sources};
use crate::message::{Conversation, Message};

/// State carried through the agent loop
#[derive(Clone, Debug)]
pub struct ConversationState {
    /// Append-only message log
    conversation: Conversation,

    /// Results of the most recent search, replaced wholesale per tool call
    search_results: Vec<SearchResult>,

    /// Citation candidates derived from `search_results`
    sources: Vec<String>,

    /// Model invocations made in the current turn
    step: usize,

    /// Maximum model invocations per turn
    step_budget: usize,
}

impl ConversationState {
    /// Fresh state; a budget of 0 is treated as 1
    pub fn new(step_budget: usize) -> Self {
        Self::with_history(Vec::new(), step_budget)
    }

    /// State seeded with earlier turns
    pub fn with_history(history: Vec<Message>, step_budget: usize) -> Self {
        Self {
            conversation: Conversation::from_messages(history),
            search_results: Vec::new(),
            sources: Vec::new(),
            step: 0,
            step_budget: step_budget.max(1),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn push(&mut self, message: Message) {
        self.conversation.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.conversation.extend(messages);
    }

    pub fn search_results(&self) -> &[SearchResult] {
        &self.search_results
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Replace the pending results with the output of the latest search
    pub fn replace_search_results(&mut self, results: Vec<SearchResult>) {
        self.sources = extract_sources(&results);
        self.search_results = results;
    }

    /// Drop pending results and citation candidates
    pub fn clear_search_results(&mut self) {
        self.search_results.clear();
        self.sources.clear();
    }

    /// Reset the per-turn step counter
    pub fn begin_turn(&mut self) {
        self.step = 0;
    }

    /// Count one model invocation
    pub fn advance_step(&mut self) {
        self.step += 1;
    }

    pub const fn step(&self) -> usize {
        self.step
    }

    pub const fn step_budget(&self) -> usize {
        self.step_budget
    }

    /// True while the current model invocation is the last one allowed
    pub const fn is_last_step(&self) -> bool {
        self.step >= self.step_budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_is_not_a_merge() {
        let mut state = ConversationState::new(5);
        state.replace_search_results(vec![SearchResult::new("A", ""), SearchResult::new("B", "")]);
        state.replace_search_results(vec![SearchResult::new("C", "")]);

        assert_eq!(state.search_results().len(), 1);
        assert_eq!(state.sources(), ["C".to_string()]);

        state.clear_search_results();
        assert!(state.search_results().is_empty());
        assert!(state.sources().is_empty());
    }

    #[test]
    fn test_step_budget() {
        let mut state = ConversationState::new(2);
        state.begin_turn();
        state.advance_step();
        assert!(!state.is_last_step());
        state.advance_step();
        assert!(state.is_last_step());

        state.begin_turn();
        assert_eq!(state.step(), 0);
    }

    #[test]
    fn test_zero_budget_is_clamped() {
        let mut state = ConversationState::new(0);
        assert_eq!(state.step_budget(), 1);
        state.advance_step();
        assert!(state.is_last_step());
    }
}
