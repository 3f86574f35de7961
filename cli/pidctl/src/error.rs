//! Error handling and display for the CLI.

use colored::Colorize;
use pidman_client::{ClientError, ConfigError, TransportError};
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("No pidman server specified. Use --url or set PIDMAN_HOST.")]
    MissingUrl,

    #[error("{count} of {total} values are not valid ARKs")]
    InvalidArks { count: usize, total: usize },
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    if let Some(CliError::MissingUrl) = err.downcast_ref::<CliError>() {
        eprintln!(
            "\n{}",
            "Hint: Pass --url https://pid.example.org/ or export PIDMAN_HOST.".yellow()
        );
        return;
    }

    let Some(client_err) = err.downcast_ref::<ClientError>() else {
        return;
    };
    if let Some(hint) = hint_for(client_err) {
        eprintln!("\n{}", hint.yellow());
    }
}

fn hint_for(err: &ClientError) -> Option<&'static str> {
    match err {
        ClientError::Http { status: 401, .. } => {
            Some("Hint: Check --username/--password or PIDMAN_USER/PIDMAN_PASSWORD.")
        }
        ClientError::Http { status: 403, .. } => {
            Some("Hint: Your account may not have permission for this operation.")
        }
        ClientError::Http { status: 404, .. } => {
            Some("Hint: Check the identifier type, noid and qualifier.")
        }
        ClientError::Transport(TransportError::Network(_)) => {
            Some("Hint: Check your network connection and the server URL.")
        }
        ClientError::Config(ConfigError::Missing(_)) => {
            Some("Hint: Export PIDMAN_HOST, PIDMAN_USER and PIDMAN_PASSWORD.")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints_by_status() {
        let http = |status| ClientError::Http {
            status,
            reason: String::new(),
            detail: None,
        };
        assert!(hint_for(&http(401)).unwrap().contains("--username"));
        assert!(hint_for(&http(404)).is_some());
        assert!(hint_for(&http(500)).is_none());
        assert!(hint_for(&ClientError::invalid("x")).is_none());
    }
}
