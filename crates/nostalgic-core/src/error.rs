// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every layer below the HTTP boundary.

use thiserror::Error;

/// The primary error type returned by repositories and services.
///
/// `Validation`, `NotFound` and `Storage` form the domain taxonomy. `Config`
/// and `Internal` only occur at startup or at the transport boundary.
#[derive(Debug, Error)]
pub enum NostalgicError {
    /// Bad input or a business-rule violation. The message is safe to show to callers.
    #[error("{0}")]
    Validation(String),

    /// A referenced widget or child resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Backing-store failure (connection, query, row decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors surfaced after the config crate has validated its input.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NostalgicError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// True for errors caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}

impl From<serde_json::Error> for NostalgicError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage {
            source: Box::new(err),
        }
    }
}

/// Result alias used across the workspace.
pub type Result<T, E = NostalgicError> = std::result::Result<T, E>;
