//! Error types and exit codes for sync-overlays

use std::process::ExitCode;
use thiserror::Error;
use uuid::Uuid;

/// Main error type for sync-overlays operations
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("No overlay handler registered for class id {class_id}")]
    ClassNotAvailable { class_id: Uuid },

    #[error("Cannot resolve hosting module path: {reason}")]
    ModulePath { reason: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("Status channel unavailable: {message}")]
    ChannelUnavailable { message: String },

    #[error("Unknown overlay category: {name}")]
    UnknownCategory { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OverlayError {
    /// Convert error to appropriate exit code:
    /// - 0: Success
    /// - 1: IO / channel error
    /// - 2: Unknown class id, category, or path argument
    /// - 3: Module path resolution failure
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::ClassNotAvailable { .. } => ExitCode::from(2),
            Self::UnknownCategory { .. } => ExitCode::from(2),
            Self::InvalidPath { .. } => ExitCode::from(2),
            Self::ModulePath { .. } => ExitCode::from(3),
            Self::ChannelUnavailable { .. } => ExitCode::from(1),
            Self::Io(_) => ExitCode::from(1),
        }
    }
}

/// Result type alias for sync-overlays operations
pub type Result<T> = std::result::Result<T, OverlayError>;
