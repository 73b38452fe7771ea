//! CLI-specific error types.

use infoblox_client::InfobloxError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Infoblox API error
    #[error("Infoblox error: {0}")]
    Infoblox(#[from] InfobloxError),

    /// Argument that clap accepted but the command cannot use
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Output could not be rendered
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}
