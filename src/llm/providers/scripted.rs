//! Test-only provider that replays queued results and records every call.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::llm::{LlmResponse, LlmUsage, Message, ProviderError};

#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    queue: Arc<Mutex<VecDeque<Result<LlmResponse, ProviderError>>>>,
    calls: Arc<Mutex<Vec<Vec<Message>>>>,
    /// When set, calls are recorded and then never complete.
    stalled: Arc<AtomicBool>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, text: &str, total_tokens: u64) {
        let input_tokens = total_tokens / 2;
        let usage = LlmUsage {
            input_tokens,
            output_tokens: total_tokens - input_tokens,
            cached_input_tokens: 0,
        };
        let response = LlmResponse { text: text.to_string(), usage: Some(usage) };
        self.queue.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_error(&self, err: ProviderError) {
        self.queue.lock().unwrap().push_back(Err(err));
    }

    pub fn stall(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Messages submitted on the most recent call.
    pub fn last_call(&self) -> Option<Vec<Message>> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// Pops the next queued result; falls back to `"ok"` once the queue is drained.
    pub async fn complete(&self, messages: &[Message]) -> Result<LlmResponse, ProviderError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(LlmResponse { text: "ok".into(), usage: None }))
    }
}
