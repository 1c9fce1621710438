//! Conversation context handed to end-of-turn predictors.
//!
//! [`ChatContext`] is an append-only list of [`ChatTurn`]s.  The evaluation
//! engine builds a fresh context per measurement (one user turn holding the
//! utterance) and drops it afterwards, so nothing leaks between samples.
//!
//! Backends that only look at recent history use [`ChatContext::recent`],
//! which returns the trailing window of turns (oldest first).

use serde::{Deserialize, Serialize};

/// Number of trailing turns a backend looks at by default.
pub const DEFAULT_HISTORY_TURNS: usize = 6;

// ---------------------------------------------------------------------------
// ChatRole
// ---------------------------------------------------------------------------

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Agent,
    System,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChatRole::User => "user",
            ChatRole::Agent => "agent",
            ChatRole::System => "system",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ChatTurn
// ---------------------------------------------------------------------------

/// A single `(role, content)` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

// ---------------------------------------------------------------------------
// ChatContext
// ---------------------------------------------------------------------------

/// Ordered dialogue history.
///
/// # Example
/// ```rust
/// use eot_compare::predictor::{ChatContext, ChatRole};
///
/// let mut ctx = ChatContext::new();
/// ctx.add_message(ChatRole::User, "Hello, how are you?");
/// assert_eq!(ctx.len(), 1);
/// assert!(ctx.ends_with_user());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatContext {
    turns: Vec<ChatTurn>,
}

impl ChatContext {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Context holding exactly one user turn.
    pub fn from_user(content: impl Into<String>) -> Self {
        let mut ctx = Self::new();
        ctx.add_message(ChatRole::User, content);
        ctx
    }

    /// Append a turn.  Turns are never removed or reordered.
    pub fn add_message(&mut self, role: ChatRole, content: impl Into<String>) {
        self.turns.push(ChatTurn {
            role,
            content: content.into(),
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Most recent turn, if any.
    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    /// Content of the most recent user turn.
    pub fn last_user_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == ChatRole::User)
            .map(|t| t.content.as_str())
    }

    /// `true` when the most recent turn is attributed to the user.
    pub fn ends_with_user(&self) -> bool {
        self.last().is_some_and(|t| t.role == ChatRole::User)
    }

    /// The last `max_turns` turns, oldest first.
    pub fn recent(&self, max_turns: usize) -> &[ChatTurn] {
        let start = self.turns.len().saturating_sub(max_turns);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let ctx = ChatContext::new();
        assert!(ctx.is_empty());
        assert!(ctx.last().is_none());
        assert!(!ctx.ends_with_user());
        assert_eq!(ctx.last_user_text(), None);
    }

    #[test]
    fn from_user_holds_single_user_turn() {
        let ctx = ChatContext::from_user("Xin chào, bạn khỏe không?");
        assert_eq!(ctx.len(), 1);
        assert!(ctx.ends_with_user());
        assert_eq!(ctx.last_user_text(), Some("Xin chào, bạn khỏe không?"));
    }

    #[test]
    fn agent_turn_last_is_not_user_terminated() {
        let mut ctx = ChatContext::from_user("hi");
        ctx.add_message(ChatRole::Agent, "hello!");
        assert!(!ctx.ends_with_user());
        // Last *user* text is still found behind the agent turn.
        assert_eq!(ctx.last_user_text(), Some("hi"));
    }

    #[test]
    fn recent_window_keeps_newest_turns_in_order() {
        let mut ctx = ChatContext::new();
        for i in 0..8 {
            ctx.add_message(ChatRole::User, format!("turn{i}"));
        }
        let window = ctx.recent(3);
        let texts: Vec<&str> = window.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(texts, vec!["turn5", "turn6", "turn7"]);
    }

    #[test]
    fn recent_larger_than_history_returns_everything() {
        let ctx = ChatContext::from_user("only");
        assert_eq!(ctx.recent(DEFAULT_HISTORY_TURNS).len(), 1);
    }

    #[test]
    fn serialises_as_message_list() {
        let mut ctx = ChatContext::new();
        ctx.add_message(ChatRole::System, "be brief");
        ctx.add_message(ChatRole::User, "你好");
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "role": "system", "content": "be brief" },
                { "role": "user", "content": "你好" }
            ])
        );
    }
}
