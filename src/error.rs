//! Error types for mytodos.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Query answered "no" (`can-update` on a task the user cannot touch)
//! - 2: User error (bad args, missing user, broken language file)
//! - 3: Access denied
//! - 4: Operation failed (IO, serialization)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const NEGATIVE: i32 = 1;
    pub const USER_ERROR: i32 = 2;
    pub const ACCESS_DENIED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for mytodos operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("No current user: pass --user or set user_id in the config file")]
    NoCurrentUser,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Ticket {0} not found")]
    TicketNotFound(u64),

    #[error("Invalid INI syntax on line {line}: {message}")]
    IniSyntax { line: usize, message: String },

    #[error("Language file is empty: {0}")]
    EmptyLanguageFile(PathBuf),

    #[error("Language file is missing messages: {}", .0.join(", "))]
    MissingMessages(Vec<String>),

    // Policy (exit code 3)
    #[error("Not allowed to update ticket {0}")]
    AccessDenied(u64),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NoCurrentUser
            | Error::InvalidArgument(_)
            | Error::TicketNotFound(_)
            | Error::IniSyntax { .. }
            | Error::EmptyLanguageFile(_)
            | Error::MissingMessages(_) => exit_codes::USER_ERROR,

            Error::AccessDenied(_) => exit_codes::ACCESS_DENIED,

            Error::Io(_) | Error::Json(_) | Error::TomlParse(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for mytodos operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::NoCurrentUser.exit_code(), exit_codes::USER_ERROR);
        assert_eq!(Error::AccessDenied(7).exit_code(), exit_codes::ACCESS_DENIED);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(Error::from(io).exit_code(), exit_codes::OPERATION_FAILED);
    }

    #[test]
    fn test_missing_messages_display() {
        let err = Error::MissingMessages(vec!["a.b".into(), "c.d".into()]);
        assert_eq!(err.to_string(), "Language file is missing messages: a.b, c.d");
    }
}
