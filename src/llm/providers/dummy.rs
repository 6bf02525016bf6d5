//! Dummy LLM provider — echoes the last user message back prefixed with `[echo]`.
//! Used to run the console loop without a real API key.

use crate::llm::{LlmResponse, Message, ProviderError, Role};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, messages: &[Message]) -> Result<LlmResponse, ProviderError> {
        let content = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(LlmResponse {
            text: format!("[echo] {content}"),
            usage: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn complete_prefixes_echo() {
        let p = DummyProvider;
        let msgs = [Message::system("be brief"), Message::user("hello")];
        assert_eq!(p.complete(&msgs).await.unwrap().text, "[echo] hello");
    }

    #[tokio::test]
    async fn complete_echoes_latest_user_turn() {
        let p = DummyProvider;
        let msgs = [
            Message::user("first"),
            Message::assistant("[echo] first"),
            Message::user("second"),
        ];
        assert_eq!(p.complete(&msgs).await.unwrap().text, "[echo] second");
    }

    #[tokio::test]
    async fn complete_empty_input() {
        let p = DummyProvider;
        assert_eq!(p.complete(&[]).await.unwrap().text, "[echo] ");
    }

    #[tokio::test]
    async fn complete_usage_is_none() {
        let p = DummyProvider;
        assert!(p.complete(&[Message::user("test")]).await.unwrap().usage.is_none());
    }
}
