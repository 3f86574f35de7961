//! Offline ARK commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use pidman_ark::Ark;
use serde::Serialize;
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{dash, print_output, print_single, OutputFormat};

use super::CommandContext;

/// ARK commands.
#[derive(Debug, Args)]
pub struct ArkCommand {
    #[command(subcommand)]
    command: ArkSubcommand,
}

#[derive(Debug, Subcommand)]
enum ArkSubcommand {
    /// Split an ARK into its parts.
    Parse(ParseArgs),

    /// Check whether each value is a valid ARK.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// ARK, short or resolvable.
    value: String,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Values to check.
    #[arg(required = true)]
    values: Vec<String>,
}

impl ArkCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            ArkSubcommand::Parse(args) => parse_ark(ctx, args),
            ArkSubcommand::Check(args) => check_arks(ctx, args),
        }
    }
}

/// Parts of a parsed ARK.
#[derive(Debug, Serialize)]
struct ArkParts {
    ark: String,
    nma: Option<String>,
    naan: String,
    noid: String,
    qualifier: Option<String>,
    short_form: String,
}

impl From<&Ark> for ArkParts {
    fn from(ark: &Ark) -> Self {
        Self {
            ark: ark.to_string(),
            nma: ark.nma().map(str::to_string),
            naan: ark.naan().to_string(),
            noid: ark.noid().to_string(),
            qualifier: ark.qualifier().map(str::to_string),
            short_form: ark.short_form(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,

    #[tabled(rename = "Value")]
    value: String,
}

impl ArkParts {
    fn rows(&self) -> Vec<FieldRow> {
        vec![
            FieldRow {
                field: "nma",
                value: dash(self.nma.as_deref()),
            },
            FieldRow {
                field: "naan",
                value: self.naan.clone(),
            },
            FieldRow {
                field: "noid",
                value: self.noid.clone(),
            },
            FieldRow {
                field: "qualifier",
                value: dash(self.qualifier.as_deref()),
            },
            FieldRow {
                field: "short form",
                value: self.short_form.clone(),
            },
        ]
    }
}

fn parse_ark(ctx: CommandContext, args: ParseArgs) -> Result<()> {
    let ark = Ark::parse(&args.value)?;
    let parts = ArkParts::from(&ark);

    match ctx.format {
        OutputFormat::Table => print_output(&parts.rows(), ctx.format),
        OutputFormat::Json => print_single(&parts),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct CheckResult {
    value: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn check(value: &str) -> CheckResult {
    let error = Ark::parse(value).err().map(|e| e.to_string());
    CheckResult {
        value: value.to_string(),
        valid: error.is_none(),
        error,
    }
}

fn check_arks(ctx: CommandContext, args: CheckArgs) -> Result<()> {
    let results: Vec<CheckResult> = args.values.iter().map(|v| check(v)).collect();

    match ctx.format {
        OutputFormat::Table => {
            for result in &results {
                match &result.error {
                    None => println!("{} {}", "valid".green(), result.value),
                    Some(error) => println!("{} {} ({error})", "invalid".red(), result.value),
                }
            }
        }
        OutputFormat::Json => print_single(&results),
    }

    let count = results.iter().filter(|r| !r.valid).count();
    if count > 0 {
        return Err(CliError::InvalidArks {
            count,
            total: results.len(),
        }
        .into());
    }
    Ok(())
}
