//! Centralized error types for incubadmin.
//!
//! This module provides a unified error hierarchy for the application with
//! user-friendly error messages.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::table::TableError;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Record table precondition errors.
    #[error("{0}")]
    Table(TableError),
}

impl From<TableError> for AppError {
    /// API failures surfaced through the table are reported as API errors.
    fn from(err: TableError) -> Self {
        match err {
            TableError::Api(api) => AppError::Api(api),
            other => AppError::Table(other),
        }
    }
}

impl AppError {
    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::CreateDirError(_) => {
                    "Could not create configuration directory. Check file permissions.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check the file is readable."
                        .to_string()
                }
                ConfigError::WriteError(_) => {
                    "Could not save configuration. Please check file permissions.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::SerializeError(_) => {
                    "Could not save configuration. Internal error.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
                ConfigError::EntityNotFound(name) => format!("Table '{}' is not configured.", name),
            },
            AppError::Api(e) => match e {
                ApiError::Network(_) => {
                    "Connection failed. Please check that the API server is reachable.".to_string()
                }
                ApiError::Unauthorized => {
                    "Authentication failed. Please check your API token.".to_string()
                }
                ApiError::Forbidden => {
                    "Access denied. You don't have permission to change this record.".to_string()
                }
                ApiError::NotFound(resource) => format!("'{}' was not found.", resource),
                ApiError::Validation(msg) => format!("Rejected by server: {}", msg),
                ApiError::Server { status, message } => {
                    format!("Server error ({}): {}", status, message)
                }
                ApiError::InvalidResponse(_) => {
                    "Unexpected response from the server. Please try again.".to_string()
                }
                ApiError::InvalidUrl(msg) => format!("Invalid API URL: {}", msg),
                ApiError::Keyring(_) => {
                    "Could not access secure storage for the API token.".to_string()
                }
            },
            AppError::Table(e) => match e {
                TableError::Busy => "Please wait for the current save to finish.".to_string(),
                TableError::AlreadyEditing(_) => {
                    "Finish or cancel the current edit first.".to_string()
                }
                other => other.to_string(),
            },
        }
    }

    /// Check if this error is critical and requires user acknowledgment.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::Api(ApiError::Unauthorized)
                | AppError::Api(ApiError::InvalidUrl(_))
                | AppError::Api(ApiError::Keyring(_))
        )
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::ParseError(_))
            | AppError::Config(ConfigError::ValidationError(_)) => {
                Some("Run 'incubadmin init-config' to write a fresh configuration file.")
            }
            AppError::Api(ApiError::Unauthorized) => {
                Some("Pass --token or set INCUBADMIN_TOKEN, then restart.")
            }
            AppError::Api(ApiError::Network(_)) => {
                Some("Check the API server and base_url, then press 'r' to reload.")
            }
            AppError::Api(ApiError::Validation(_)) => Some("Fix the highlighted field and save again."),
            _ => None,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
