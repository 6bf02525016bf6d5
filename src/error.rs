//! Application-wide error types.

use thiserror::Error;

use crate::llm::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    /// Missing or malformed FAQ / orders dataset. Fatal at startup.
    #[error("data source error: {0}")]
    DataSource(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("transcript error: {0}")]
    Transcript(String),

    #[error("llm provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(e.to_string().contains("config error"));
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn data_source_error_display() {
        let e = AppError::DataSource("data/faq.json: not found".into());
        assert!(e.to_string().starts_with("data source error"));
        assert!(e.to_string().contains("data/faq.json"));
    }

    #[test]
    fn provider_error_converts() {
        let e: AppError = ProviderError::UnknownProvider("acme".into()).into();
        assert!(e.to_string().contains("acme"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
