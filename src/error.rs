// src/error.rs

//! Unified error handling for the watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Fetching a page failed at the transport layer
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// An expected node was missing from a listing page
    #[error("Markup error ({context}): {message}")]
    Markup { context: String, message: String },

    /// A listing post carried a date in an unexpected shape
    #[error("Date parse error for '{text}': {source}")]
    DateParse {
        text: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A detail page did not follow the description grammar
    #[error("Extraction error at step '{step}': {message}")]
    Extraction { step: &'static str, message: String },

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Template rendering failed
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// A blocking task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A run was aborted before or during delivery
    #[error("Run aborted: {0}")]
    Aborted(String),
}

impl AppError {
    /// Create a transport error for a URL.
    pub fn transport(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a markup error with context.
    pub fn markup(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Markup {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create an extraction error for a named grammar step.
    pub fn extraction(step: &'static str, message: impl fmt::Display) -> Self {
        Self::Extraction {
            step,
            message: message.to_string(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Short, stable label used when reporting failures.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } | Self::Http(_) => "transport",
            Self::Markup { .. } | Self::Selector { .. } => "markup",
            Self::DateParse { .. } => "date",
            Self::Extraction { .. } => "extraction",
            Self::Validation(_) => "validation",
            Self::Io(_) => "io",
            Self::Json(_) | Self::Toml(_) | Self::Url(_) | Self::Config(_) => "config",
            Self::Template(_) => "template",
            Self::Task(_) => "task",
            Self::Aborted(_) => "aborted",
        }
    }
}
