//! Pid commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use pidman_client::{NewPid, Pid, PidType, PidUpdate, SearchQuery, SearchResults};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{dash, print_info, print_output, print_single, print_success, OutputFormat};

use super::targets::print_targets;
use super::{parse_pid_type, CommandContext};

/// Pid commands.
#[derive(Debug, Args)]
pub struct PidsCommand {
    #[command(subcommand)]
    command: PidsSubcommand,
}

#[derive(Debug, Subcommand)]
enum PidsSubcommand {
    /// Search pids.
    Search(SearchArgs),

    /// Mint a new ARK or PURL.
    Create(CreatePidArgs),

    /// Get pid details, including its targets.
    Get(PidArgs),

    /// Update pid metadata.
    Update(UpdatePidArgs),
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Exact pid (noid).
    #[arg(long)]
    pid: Option<String>,

    /// Pid type (ark or purl).
    #[arg(long = "type", value_parser = parse_pid_type)]
    pid_type: Option<PidType>,

    /// Exact target URI.
    #[arg(long)]
    target: Option<String>,

    /// Exact domain name.
    #[arg(long)]
    domain: Option<String>,

    /// Domain REST URI.
    #[arg(long)]
    domain_uri: Option<String>,

    /// Page of results, starting at 1.
    #[arg(long)]
    page: Option<u32>,

    /// Results per page.
    #[arg(long)]
    count: Option<u32>,
}

#[derive(Debug, Args)]
struct CreatePidArgs {
    /// Pid type (ark or purl).
    #[arg(value_parser = parse_pid_type)]
    pid_type: PidType,

    /// REST URI of the domain.
    #[arg(long)]
    domain: String,

    /// Target URI; `{%PID%}` is replaced with the new noid.
    #[arg(long)]
    target: String,

    /// Name or title.
    #[arg(long)]
    name: Option<String>,

    /// External system name.
    #[arg(long)]
    external_system: Option<String>,

    /// Key of the pid in the external system.
    #[arg(long)]
    external_system_key: Option<String>,

    /// Policy title.
    #[arg(long)]
    policy: Option<String>,

    /// Proxy name.
    #[arg(long)]
    proxy: Option<String>,

    /// Qualifier for the first target (ARK only).
    #[arg(long)]
    qualifier: Option<String>,
}

#[derive(Debug, Args)]
struct PidArgs {
    /// Pid type (ark or purl).
    #[arg(value_parser = parse_pid_type)]
    pid_type: PidType,

    /// Noid of the pid.
    noid: String,
}

#[derive(Debug, Args)]
struct UpdatePidArgs {
    #[command(flatten)]
    pid: PidArgs,

    /// New domain REST URI.
    #[arg(long)]
    domain: Option<String>,

    /// New name; pass "" to clear.
    #[arg(long)]
    name: Option<String>,

    /// New external system name.
    #[arg(long)]
    external_system: Option<String>,

    /// New external system key.
    #[arg(long)]
    external_system_key: Option<String>,

    /// New policy title.
    #[arg(long)]
    policy: Option<String>,
}

impl PidsCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            PidsSubcommand::Search(args) => search_pids(ctx, args),
            PidsSubcommand::Create(args) => create_pid(ctx, args),
            PidsSubcommand::Get(args) => get_pid(ctx, args),
            PidsSubcommand::Update(args) => update_pid(ctx, args),
        }
    }
}

/// Table row for a pid.
#[derive(Debug, Serialize, Tabled)]
struct PidRow {
    #[tabled(rename = "Pid")]
    pid: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Domain")]
    domain: String,

    #[tabled(rename = "External")]
    external: String,

    #[tabled(rename = "Targets")]
    targets: usize,
}

impl From<&Pid> for PidRow {
    fn from(pid: &Pid) -> Self {
        let external = match (pid.external_system_id.as_deref(), pid.external_system_key.as_deref()) {
            (Some(system), Some(key)) if !system.is_empty() => format!("{system}:{key}"),
            (system, _) => dash(system),
        };
        Self {
            pid: pid.pid.clone(),
            name: dash(pid.name.as_deref()),
            domain: dash(pid.domain.as_deref()),
            external,
            targets: pid.targets.len(),
        }
    }
}

fn print_results(results: &SearchResults, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<PidRow> = results.results.iter().map(PidRow::from).collect();
            print_output(&rows, format);
            if let (Some(page), Some(pages)) = (results.page, results.page_count) {
                print_info(&format!(
                    "Page {page} of {pages} ({} results)",
                    results.results_count.unwrap_or_default()
                ));
            }
        }
        OutputFormat::Json => print_single(results),
    }
}

fn search_pids(ctx: CommandContext, args: SearchArgs) -> Result<()> {
    let query = SearchQuery {
        pid: args.pid,
        pid_type: args.pid_type,
        target: args.target,
        domain: args.domain,
        domain_uri: args.domain_uri,
        page: args.page,
        count: args.count,
    };

    let results = ctx.client()?.search_pids(&query)?;
    print_results(&results, ctx.format);
    Ok(())
}

fn create_pid(ctx: CommandContext, args: CreatePidArgs) -> Result<()> {
    let pid = NewPid {
        domain: args.domain,
        target_uri: args.target,
        name: args.name,
        external_system: args.external_system,
        external_system_key: args.external_system_key,
        policy: args.policy,
        proxy: args.proxy,
        qualifier: args.qualifier,
    };

    let created = ctx.client()?.create_pid(args.pid_type, &pid)?;

    match ctx.format {
        OutputFormat::Table => print_success(&format!("Created {} {created}", args.pid_type)),
        OutputFormat::Json => print_single(&serde_json::json!({
            "type": args.pid_type,
            "pid": created,
        })),
    }
    Ok(())
}

fn print_pid(pid: &Pid, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_output(&[PidRow::from(pid)], format);
            print_targets(&pid.targets, format);
        }
        OutputFormat::Json => print_single(pid),
    }
}

fn get_pid(ctx: CommandContext, args: PidArgs) -> Result<()> {
    let pid = ctx.client()?.get_pid(args.pid_type, &args.noid)?;
    print_pid(&pid, ctx.format);
    Ok(())
}

fn update_pid(ctx: CommandContext, args: UpdatePidArgs) -> Result<()> {
    let update = PidUpdate {
        domain: args.domain,
        name: args.name,
        external_system: args.external_system,
        external_system_key: args.external_system_key,
        policy: args.policy,
    };

    let pid = ctx
        .client()?
        .update_pid(args.pid.pid_type, &args.pid.noid, &update)?;
    if ctx.format == OutputFormat::Table {
        print_success(&format!("Updated {} {}", args.pid.pid_type, args.pid.noid));
    }
    print_pid(&pid, ctx.format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(subcommand)]
        command: PidsSubcommand,
    }

    #[test]
    fn parses_create_with_token() {
        let harness = Harness::try_parse_from([
            "pids",
            "create",
            "ark",
            "--domain",
            "http://pid/domains/1/",
            "--target",
            "http://repo/objects/{%PID%}",
            "--qualifier",
            "PDF",
        ])
        .unwrap();
        let PidsSubcommand::Create(args) = harness.command else {
            panic!("expected create");
        };
        assert_eq!(args.pid_type, PidType::Ark);
        assert_eq!(args.target, "http://repo/objects/{%PID%}");
        assert_eq!(args.qualifier.as_deref(), Some("PDF"));
    }

    #[test]
    fn parses_search_type_flag() {
        let harness =
            Harness::try_parse_from(["pids", "search", "--type", "purl", "--count", "10"]).unwrap();
        let PidsSubcommand::Search(args) = harness.command else {
            panic!("expected search");
        };
        assert_eq!(args.pid_type, Some(PidType::Purl));
        assert_eq!(args.count, Some(10));
    }

    #[test]
    fn external_column() {
        let pid = Pid {
            pid: "1fx".to_string(),
            external_system_id: Some("EUCLID".to_string()),
            external_system_key: Some("ocm1234".to_string()),
            ..Pid::default()
        };
        assert_eq!(PidRow::from(&pid).external, "EUCLID:ocm1234");
        assert_eq!(PidRow::from(&Pid::default()).external, "-");
    }
}
