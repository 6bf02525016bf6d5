//! Configuration loading from the environment.
//!
//! `main` loads `.env` (if present) first, so every value below may come
//! from either the process environment or that file. `OPENAI_*` values are
//! required when the `openai` provider is active; everything else has a
//! default.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;
use crate::llm::gateway::CompletionMode;
use crate::memory::DEFAULT_MEMORY_CAP;

/// OpenAI / OpenAI-compatible provider configuration (`OPENAI_*`).
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Sampling temperature (ignored for models that forbid it).
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Upper bound on generated tokens; `0` omits the field.
    pub max_tokens: u32,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"openai"` or `"dummy"`).
    pub provider: String,
    pub mode: CompletionMode,
    /// `Some` whenever `provider` is `"openai"`.
    pub openai: Option<OpenAiConfig>,
}

/// Where the session reads its datasets and writes its transcript.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub log_dir: PathBuf,
    pub faq_path: PathBuf,
    pub orders_path: PathBuf,
    pub system_prompt_path: Option<PathBuf>,
    /// Max non-primer messages kept in memory; `None` = unbounded.
    pub memory_cap: Option<usize>,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub session: SessionConfig,
    pub log_level: String,
    /// Diagnostics go here instead of stderr when set.
    pub log_file: Option<PathBuf>,
}

const DEFAULT_PROVIDER: &str = "openai";
const DEFAULT_TEMPERATURE: f32 = 0.5;
const DEFAULT_TIMEOUT_SECONDS: u64 = 20;
const DEFAULT_MAX_TOKENS: u32 = 300;
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_FAQ_PATH: &str = "data/faq.json";
const DEFAULT_ORDERS_PATH: &str = "data/orders.json";
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Load config from the process environment.
pub fn load() -> Result<Config, AppError> {
    load_from(|key| env::var(key).ok())
}

/// Internal loader — resolves every setting through `lookup`.
/// Tests pass a map-backed closure instead of mutating env vars.
pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, AppError> {
    // Blank values count as unset.
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let provider = get("BOT_PROVIDER").unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
    let mode = parse_or(&get, "BOT_LLM_MODE", CompletionMode::default())?;

    let openai = match provider.as_str() {
        "openai" | "openai-compatible" => Some(OpenAiConfig {
            api_key: require(&get, "OPENAI_API_KEY")?,
            api_base_url: chat_completions_url(&require(&get, "OPENAI_BASE_URL")?),
            model: require(&get, "OPENAI_MODEL_NAME")?,
            temperature: parse_or(&get, "OPENAI_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            timeout_seconds: parse_or(&get, "OPENAI_REQUEST_TIMEOUT", DEFAULT_TIMEOUT_SECONDS)?,
            max_tokens: parse_or(&get, "OPENAI_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
        }),
        _ => None,
    };

    let memory_cap = match parse_or(&get, "BOT_MEMORY_CAP", DEFAULT_MEMORY_CAP)? {
        0 => None,
        n => Some(n),
    };

    Ok(Config {
        llm: LlmConfig { provider, mode, openai },
        session: SessionConfig {
            log_dir: path_or(&get, "BOT_LOG_DIR", DEFAULT_LOG_DIR),
            faq_path: path_or(&get, "BOT_FAQ_FILE", DEFAULT_FAQ_PATH),
            orders_path: path_or(&get, "BOT_ORDERS_FILE", DEFAULT_ORDERS_PATH),
            system_prompt_path: get("BOT_SYSTEM_PROMPT_FILE").map(|p| expand_home(&p)),
            memory_cap,
        },
        log_level: get("BOT_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        log_file: get("BOT_LOG_FILE").map(|p| expand_home(&p)),
    })
}

fn path_or(get: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> PathBuf {
    expand_home(&get(key).unwrap_or_else(|| default.to_string()))
}

fn require(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, AppError> {
    get(key).ok_or_else(|| AppError::Config(format!("{key} is required but not set")))
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key}: invalid value '{raw}': {e}"))),
    }
}

/// Accept either a bare API root (`https://api.openai.com/v1`) or the full
/// endpoint; always return the full `/chat/completions` URL.
pub fn chat_completions_url(base: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{base}/chat/completions")
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests — dummy LLM, no API keys, no external calls.
#[cfg(test)]
impl Config {
    pub fn test_default(work_dir: &std::path::Path) -> Self {
        Self {
            llm: LlmConfig {
                provider: "dummy".into(),
                mode: CompletionMode::Stateful,
                openai: None,
            },
            session: SessionConfig {
                log_dir: work_dir.join("logs"),
                faq_path: work_dir.join("faq.json"),
                orders_path: work_dir.join("orders.json"),
                system_prompt_path: None,
                memory_cap: None,
            },
            log_level: "info".into(),
            log_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const OPENAI_MINIMAL: &[(&str, &str)] = &[
        ("OPENAI_API_KEY", "sk-test"),
        ("OPENAI_BASE_URL", "https://api.openai.com/v1"),
        ("OPENAI_MODEL_NAME", "gpt-4o-mini"),
    ];

    #[test]
    fn openai_defaults_apply() {
        let cfg = load_from(env_of(OPENAI_MINIMAL)).unwrap();
        let oai = cfg.llm.openai.unwrap();
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.mode, CompletionMode::Stateful);
        assert_eq!(oai.api_base_url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(oai.temperature, 0.5);
        assert_eq!(oai.timeout_seconds, 20);
        assert_eq!(oai.max_tokens, 300);
        assert_eq!(cfg.session.faq_path, PathBuf::from("data/faq.json"));
        assert_eq!(cfg.session.memory_cap, Some(DEFAULT_MEMORY_CAP));
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let err = load_from(env_of(&OPENAI_MINIMAL[1..])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut pairs = OPENAI_MINIMAL.to_vec();
        pairs[2] = ("OPENAI_MODEL_NAME", "   ");
        let err = load_from(env_of(&pairs)).unwrap_err();
        assert!(err.to_string().contains("OPENAI_MODEL_NAME"));
    }

    #[test]
    fn mistyped_timeout_is_fatal() {
        let mut pairs = OPENAI_MINIMAL.to_vec();
        pairs.push(("OPENAI_REQUEST_TIMEOUT", "soon"));
        let err = load_from(env_of(&pairs)).unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("OPENAI_REQUEST_TIMEOUT")));
    }

    #[test]
    fn dummy_provider_needs_no_openai_settings() {
        let cfg =
            load_from(env_of(&[("BOT_PROVIDER", "dummy"), ("BOT_LLM_MODE", "stateless")])).unwrap();
        assert!(cfg.llm.openai.is_none());
        assert_eq!(cfg.llm.mode, CompletionMode::Stateless);
    }

    #[test]
    fn memory_cap_zero_means_unbounded() {
        let cfg = load_from(env_of(&[("BOT_PROVIDER", "dummy"), ("BOT_MEMORY_CAP", "0")])).unwrap();
        assert_eq!(cfg.session.memory_cap, None);
    }

    #[test]
    fn session_paths_override() {
        let cfg = load_from(env_of(&[
            ("BOT_PROVIDER", "dummy"),
            ("BOT_LOG_DIR", "/tmp/bot-logs"),
            ("BOT_FAQ_FILE", "/srv/faq.json"),
            ("BOT_SYSTEM_PROMPT_FILE", "prompts/system.txt"),
        ]))
        .unwrap();
        assert_eq!(cfg.session.log_dir, PathBuf::from("/tmp/bot-logs"));
        assert_eq!(cfg.session.faq_path, PathBuf::from("/srv/faq.json"));
        assert_eq!(cfg.session.system_prompt_path, Some(PathBuf::from("prompts/system.txt")));
    }

    #[test]
    fn endpoint_url_normalised() {
        assert_eq!(
            chat_completions_url("http://localhost:11434/v1/"),
            "http://localhost:11434/v1/chat/completions"
        );
        assert_eq!(
            chat_completions_url("https://api.openai.com/v1/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/bot-logs");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with("bot-logs"));
    }

    #[test]
    fn test_default_is_offline() {
        let cfg = Config::test_default(std::path::Path::new("/tmp/bot-test"));
        assert_eq!(cfg.llm.provider, "dummy");
        assert!(cfg.llm.openai.is_none());
        assert_eq!(cfg.session.log_dir, PathBuf::from("/tmp/bot-test/logs"));
        assert!(crate::llm::providers::build(&cfg.llm).is_ok());
    }

    #[test]
    fn absolute_path_unchanged() {
        assert_eq!(expand_home("/absolute/path"), PathBuf::from("/absolute/path"));
    }
}
