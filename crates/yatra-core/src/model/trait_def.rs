//! The `ChatModel` trait -- the adapter interface for generative models.
//!
//! Each request opens a fresh, uniquely identified session, sends one user
//! turn, and waits for one plain-text reply. There is no conversation
//! memory, so a session collapses into a single `complete` call.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// A single-turn conversation with a generative model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// Unique per call; never reused.
    pub session_id: String,
    /// System instructions for the session.
    pub system_message: String,
    /// The one user turn.
    pub prompt: String,
}

impl ChatRequest {
    /// Open a new session named `{prefix}_{uuid}`.
    pub fn new_session(
        prefix: &str,
        system_message: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            session_id: format!("{prefix}_{}", Uuid::new_v4()),
            system_message: system_message.into(),
            prompt: prompt.into(),
        }
    }
}

/// Adapter interface for a generative-model provider.
///
/// Implementations must not retry; a failed call is reported to the caller
/// as-is.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider/model label used in logs (e.g. "openai/gpt-4o-mini").
    fn name(&self) -> &str;

    /// Send the request's single user turn and return the reply text.
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

// Compile-time assertion: ChatModel must be usable as `dyn ChatModel`.
const _: () = {
    fn _assert_object_safe(_: &dyn ChatModel) {}
};
