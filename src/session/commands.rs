//! Per-line classification.
//!
//! Checked in priority order, first match wins:
//! empty → exit keyword → reset keyword → `/order` prefix → FAQ hit → LLM query.

use crate::knowledge::FaqIndex;

pub const EXIT_KEYWORDS: &[&str] = &["выход", "стоп", "конец", "exit"];
pub const RESET_KEYWORD: &str = "сброс";
pub const ORDER_COMMAND: &str = "/order";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent<'a> {
    Empty,
    Exit,
    Reset,
    /// Trailing token after `/order`, `None` when no id was given.
    Order(Option<&'a str>),
    /// Cached FAQ answer.
    Faq(String),
    /// Trimmed text to forward to the gateway.
    Query(&'a str),
}

pub fn classify<'a>(input: &'a str, faq: &FaqIndex) -> Intent<'a> {
    let text = input.trim();
    if text.is_empty() {
        return Intent::Empty;
    }

    let folded = text.to_lowercase();
    if EXIT_KEYWORDS.contains(&folded.as_str()) {
        return Intent::Exit;
    }
    if folded == RESET_KEYWORD {
        return Intent::Reset;
    }

    if let Some(rest) = strip_order_command(text) {
        return Intent::Order(rest.split_whitespace().last());
    }

    if let Some(answer) = faq.lookup(text) {
        return Intent::Faq(answer.to_string());
    }

    Intent::Query(text)
}

/// Text after a case-insensitive `/order` prefix.
fn strip_order_command(text: &str) -> Option<&str> {
    let prefix = text.get(..ORDER_COMMAND.len())?;
    prefix
        .eq_ignore_ascii_case(ORDER_COMMAND)
        .then(|| &text[ORDER_COMMAND.len()..])
}
