//! Target commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use pidman_client::{PidType, Target, TargetChange, TargetUpdate};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{dash, print_output, print_single, print_success, OutputFormat};

use super::{parse_pid_type, CommandContext};

/// Target commands.
#[derive(Debug, Args)]
pub struct TargetsCommand {
    #[command(subcommand)]
    command: TargetsSubcommand,
}

#[derive(Debug, Subcommand)]
enum TargetsSubcommand {
    /// Get a single target.
    Get(TargetArgs),

    /// Update a target; a new ARK qualifier creates the target.
    Update(UpdateTargetArgs),

    /// Delete an ARK target.
    Delete(DeleteTargetArgs),
}

#[derive(Debug, Args)]
struct TargetArgs {
    /// Pid type (ark or purl).
    #[arg(value_parser = parse_pid_type)]
    pid_type: PidType,

    /// Noid of the pid.
    noid: String,

    /// Target qualifier; omit for the unqualified target.
    #[arg(default_value = "")]
    qualifier: String,
}

#[derive(Debug, Args)]
struct UpdateTargetArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// New target URI.
    #[arg(long)]
    target_uri: Option<String>,

    /// New proxy name; pass "" to clear.
    #[arg(long)]
    proxy: Option<String>,

    /// Whether the target resolves.
    #[arg(long)]
    active: Option<bool>,
}

#[derive(Debug, Args)]
struct DeleteTargetArgs {
    /// Noid of the ARK.
    noid: String,

    /// Target qualifier; omit for the unqualified target.
    #[arg(default_value = "")]
    qualifier: String,
}

impl TargetsCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            TargetsSubcommand::Get(args) => get_target(ctx, args),
            TargetsSubcommand::Update(args) => update_target(ctx, args),
            TargetsSubcommand::Delete(args) => delete_target(ctx, args),
        }
    }
}

/// Table row for a target.
#[derive(Debug, Serialize, Tabled)]
struct TargetRow {
    #[tabled(rename = "Qualifier")]
    qualifier: String,

    #[tabled(rename = "Target URI")]
    target_uri: String,

    #[tabled(rename = "Proxy")]
    proxy: String,

    #[tabled(rename = "Active")]
    active: String,

    #[tabled(rename = "Access URI")]
    access_uri: String,
}

impl From<&Target> for TargetRow {
    fn from(target: &Target) -> Self {
        Self {
            qualifier: dash(target.qualifier.as_deref()),
            target_uri: target.target_uri.clone(),
            proxy: dash(target.proxy.as_deref()),
            active: target
                .active
                .map(|a| if a { "yes" } else { "no" }.to_string())
                .unwrap_or_else(|| "-".to_string()),
            access_uri: dash(target.access_uri.as_deref()),
        }
    }
}

/// Print targets in the specified format.
pub(super) fn print_targets(targets: &[Target], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<TargetRow> = targets.iter().map(TargetRow::from).collect();
            print_output(&rows, format);
        }
        OutputFormat::Json => print_single(&targets),
    }
}

fn get_target(ctx: CommandContext, args: TargetArgs) -> Result<()> {
    let target = ctx
        .client()?
        .get_target(args.pid_type, &args.noid, &args.qualifier)?;
    print_targets(std::slice::from_ref(&target), ctx.format);
    Ok(())
}

fn update_target(ctx: CommandContext, args: UpdateTargetArgs) -> Result<()> {
    let update = TargetUpdate {
        target_uri: args.target_uri,
        proxy: args.proxy,
        active: args.active,
    };
    let TargetArgs {
        pid_type,
        noid,
        qualifier,
    } = args.target;

    let change = ctx
        .client()?
        .update_target(pid_type, &noid, &qualifier, &update)?;

    if ctx.format == OutputFormat::Table {
        let verb = match change {
            TargetChange::Created(_) => "Created",
            TargetChange::Updated(_) => "Updated",
        };
        print_success(&format!("{verb} target {}", describe(pid_type, &noid, &qualifier)));
    }
    print_targets(std::slice::from_ref(change.target()), ctx.format);
    Ok(())
}

fn delete_target(ctx: CommandContext, args: DeleteTargetArgs) -> Result<()> {
    ctx.client()?.delete_ark_target(&args.noid, &args.qualifier)?;

    match ctx.format {
        OutputFormat::Table => print_success(&format!(
            "Deleted target {}",
            describe(PidType::Ark, &args.noid, &args.qualifier)
        )),
        OutputFormat::Json => print_single(&serde_json::json!({
            "deleted": true,
            "noid": args.noid,
            "qualifier": args.qualifier,
        })),
    }
    Ok(())
}

fn describe(pid_type: PidType, noid: &str, qualifier: &str) -> String {
    if qualifier.is_empty() {
        format!("{pid_type}/{noid}")
    } else {
        format!("{pid_type}/{noid}/{qualifier}")
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(subcommand)]
        command: TargetsSubcommand,
    }

    #[test]
    fn qualifier_defaults_to_unqualified() {
        let harness = Harness::try_parse_from(["targets", "get", "purl", "aa"]).unwrap();
        let TargetsSubcommand::Get(args) = harness.command else {
            panic!("expected get");
        };
        assert_eq!(args.pid_type, PidType::Purl);
        assert_eq!(args.qualifier, "");
    }

    #[test]
    fn parses_active_flag() {
        let harness = Harness::try_parse_from([
            "targets", "update", "ark", "bb", "PDF", "--active", "false",
        ])
        .unwrap();
        let TargetsSubcommand::Update(args) = harness.command else {
            panic!("expected update");
        };
        assert_eq!(args.active, Some(false));
        assert_eq!(args.target.qualifier, "PDF");
    }

    #[test]
    fn describe_target() {
        assert_eq!(describe(PidType::Ark, "bb", ""), "ark/bb");
        assert_eq!(describe(PidType::Ark, "bb", "PDF"), "ark/bb/PDF");
    }
}
