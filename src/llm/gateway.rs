//! The gateway the session controller talks to.
//!
//! One capability, two modes. `Stateless` submits the user prompt alone;
//! `Stateful` submits the whole conversation followed by the new user turn.
//! The gateway only reads memory — recording a successful exchange is the
//! caller's job.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::llm::{LlmProvider, LlmResponse, Message, ProviderError};
use crate::memory::ConversationMemory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionMode {
    Stateless,
    #[default]
    Stateful,
}

impl FromStr for CompletionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stateless" | "completion" => Ok(CompletionMode::Stateless),
            "stateful" | "chat" => Ok(CompletionMode::Stateful),
            other => Err(format!(
                "unknown completion mode '{other}' (expected 'stateful' or 'stateless')"
            )),
        }
    }
}

impl fmt::Display for CompletionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionMode::Stateless => f.write_str("stateless"),
            CompletionMode::Stateful => f.write_str("stateful"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmGateway {
    provider: LlmProvider,
    mode: CompletionMode,
}

impl LlmGateway {
    pub fn new(provider: LlmProvider, mode: CompletionMode) -> Self {
        Self { provider, mode }
    }

    pub fn mode(&self) -> CompletionMode {
        self.mode
    }

    /// Ask the provider to answer `input`, with `memory` as context in
    /// stateful mode.
    pub async fn complete(
        &self,
        input: &str,
        memory: &ConversationMemory,
    ) -> Result<LlmResponse, ProviderError> {
        let messages = self.build_messages(input, memory);
        debug!(mode = %self.mode, messages = messages.len(), "gateway request");
        self.provider.complete(&messages).await
    }

    fn build_messages(&self, input: &str, memory: &ConversationMemory) -> Vec<Message> {
        match self.mode {
            CompletionMode::Stateless => vec![Message::user(input)],
            CompletionMode::Stateful => {
                let context = memory.as_prompt_context();
                let mut messages = Vec::with_capacity(context.len() + 1);
                messages.extend_from_slice(context);
                messages.push(Message::user(input));
                messages
            }
        }
    }
}
