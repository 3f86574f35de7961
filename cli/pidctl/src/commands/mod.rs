//! CLI commands.

mod ark;
mod domains;
mod pids;
mod retarget;
mod targets;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pidman_client::config::{ENV_HOST, ENV_PASSWORD, ENV_TIMEOUT, ENV_USER};
use pidman_client::{ClientConfig, PidType, PidmanClient};

use crate::error::CliError;
use crate::output::OutputFormat;

/// pidman CLI - Manage ARKs and PURLs in a pidman server.
#[derive(Debug, Parser)]
#[command(name = "pidman")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Base URL of the pidman server.
    #[arg(long, global = true, env = ENV_HOST)]
    url: Option<String>,

    /// Username for calls that modify data.
    #[arg(long, global = true, env = ENV_USER)]
    username: Option<String>,

    /// Password for calls that modify data.
    #[arg(long, global = true, env = ENV_PASSWORD, hide_env_values = true)]
    password: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = ENV_TIMEOUT)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage domains.
    Domains(domains::DomainsCommand),

    /// Search, mint and edit pids.
    Pids(pids::PidsCommand),

    /// Manage pid targets.
    Targets(targets::TargetsCommand),

    /// Parse and validate ARK strings (offline).
    Ark(ark::ArkCommand),

    /// Move every target in a domain from one host to another.
    Retarget(retarget::RetargetCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub fn run(self) -> Result<()> {
        let ctx = CommandContext {
            format: self.format,
            url: self.url,
            username: self.username,
            password: self.password,
            timeout: self.timeout,
        };

        match self.command {
            Commands::Domains(cmd) => cmd.run(ctx),
            Commands::Pids(cmd) => cmd.run(ctx),
            Commands::Targets(cmd) => cmd.run(ctx),
            Commands::Ark(cmd) => cmd.run(ctx),
            Commands::Retarget(cmd) => cmd.run(ctx),
            Commands::Version => {
                println!("pidman {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub format: OutputFormat,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Option<u64>,
}

impl CommandContext {
    /// Client configuration from flags and environment.
    pub fn config(&self) -> Result<ClientConfig> {
        let url = self.url.as_deref().ok_or(CliError::MissingUrl)?;
        let mut config = ClientConfig::new(url);
        config.username = self.username.clone();
        config.password = self.password.clone();
        config.timeout = self.timeout.map(std::time::Duration::from_secs);
        Ok(config)
    }

    /// Get an API client. Credentials are optional for read-only commands.
    pub fn client(&self) -> Result<PidmanClient> {
        Ok(PidmanClient::from_config(&self.config()?)?)
    }
}

/// Parse a pid type argument.
fn parse_pid_type(s: &str) -> Result<PidType, String> {
    s.to_ascii_lowercase().parse().map_err(|e: pidman_client::ClientError| e.to_string())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&[
            "pidman",
            "domains",
            "list",
            "--url",
            "http://pid.example.org/",
            "--format",
            "json",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.url.as_deref(), Some("http://pid.example.org/"));
    }

    #[test]
    fn pid_type_is_case_insensitive() {
        assert_eq!(parse_pid_type("ARK"), Ok(PidType::Ark));
        assert_eq!(parse_pid_type("purl"), Ok(PidType::Purl));
        assert!(parse_pid_type("doi").is_err());
    }

    #[test]
    fn context_requires_url() {
        let ctx = CommandContext {
            format: OutputFormat::Table,
            url: None,
            username: None,
            password: None,
            timeout: None,
        };
        let err = ctx.config().unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::MissingUrl)));
    }

    #[test]
    fn context_builds_config() {
        let ctx = CommandContext {
            format: OutputFormat::Table,
            url: Some("http://pid.example.org".to_string()),
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            timeout: Some(5),
        };
        let config = ctx.config().unwrap();
        assert!(config.credentials().is_some());
        assert_eq!(config.timeout, Some(std::time::Duration::from_secs(5)));
    }
}
