//! FAQ index: normalized question → canned answer.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::AppError;

/// One record of the FAQ dataset.
#[derive(Debug, Deserialize)]
struct FaqRecord {
    #[serde(alias = "question")]
    q: String,
    #[serde(alias = "answer")]
    a: String,
}

/// Trim and lowercase. Index keys and queries must both go through this.
pub fn normalize_question(text: &str) -> String {
    text.trim().to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct FaqIndex {
    entries: HashMap<String, String>,
}

impl FaqIndex {
    /// Load a JSON array of `{"q": ..., "a": ...}` records.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let records: Vec<FaqRecord> = super::read_json(path)?;
        Ok(Self::from_pairs(records.into_iter().map(|r| (r.q, r.a))))
    }

    /// Build from raw (question, answer) pairs. Later duplicates win.
    pub fn from_pairs<Q, A>(pairs: impl IntoIterator<Item = (Q, A)>) -> Self
    where
        Q: AsRef<str>,
        A: Into<String>,
    {
        let mut entries = HashMap::new();
        for (q, a) in pairs {
            let key = normalize_question(q.as_ref());
            if entries.insert(key.clone(), a.into()).is_some() {
                warn!(question = %key, "duplicate FAQ question; keeping the later answer");
            }
        }
        Self { entries }
    }

    /// Look up `query` after normalizing it.
    pub fn lookup(&self, query: &str) -> Option<&str> {
        self.entries.get(&normalize_question(query)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        let idx = FaqIndex::from_pairs([("How do I reset my password?", "Visit /reset.")]);
        for q in [
            "How do I reset my password?",
            "  HOW DO I RESET MY PASSWORD?  ",
            "\thow do i reset my password?\n",
        ] {
            assert_eq!(idx.lookup(q), Some("Visit /reset."), "query {q:?}");
        }
    }

    #[test]
    fn lookup_handles_cyrillic_case() {
        let idx = FaqIndex::from_pairs([("Как оплатить заказ?", "Картой или наличными.")]);
        assert_eq!(idx.lookup("КАК ОПЛАТИТЬ ЗАКАЗ?"), Some("Картой или наличными."));
    }

    #[test]
    fn lookup_miss_returns_none() {
        let idx = FaqIndex::from_pairs([("a?", "b")]);
        assert_eq!(idx.lookup("a"), None);
    }

    #[test]
    fn duplicate_questions_keep_last() {
        let idx = FaqIndex::from_pairs([("Hours?", "9-5"), (" hours? ", "10-6")]);
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.lookup("HOURS?"), Some("10-6"));
    }

    #[test]
    fn load_accepts_short_and_long_field_names() {
        let f = write_json(
            r#"[{"q": "Hours?", "a": "9-5"}, {"question": "Phone?", "answer": "+1 555 0100"}]"#,
        );
        let idx = FaqIndex::load(f.path()).unwrap();
        assert_eq!(idx.lookup("phone?"), Some("+1 555 0100"));
        assert_eq!(idx.lookup("hours?"), Some("9-5"));
    }

    #[test]
    fn record_without_answer_is_malformed() {
        let f = write_json(r#"[{"q": "Hours?"}]"#);
        let err = FaqIndex::load(f.path()).unwrap_err();
        assert!(matches!(err, AppError::DataSource(ref m) if m.contains("malformed")));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let f = write_json("not json");
        assert!(matches!(FaqIndex::load(f.path()), Err(AppError::DataSource(_))));
    }

    #[test]
    fn missing_file_errors() {
        let err = FaqIndex::load(Path::new("/nonexistent/faq.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
