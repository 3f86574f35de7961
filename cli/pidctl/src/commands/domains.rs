//! Domain commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use pidman_client::{Domain, DomainUpdate, NewDomain};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{dash, print_output, print_single, print_success, OutputFormat};

use super::CommandContext;

/// Domain commands.
#[derive(Debug, Args)]
pub struct DomainsCommand {
    #[command(subcommand)]
    command: DomainsSubcommand,
}

#[derive(Debug, Subcommand)]
enum DomainsSubcommand {
    /// List all domains.
    List,

    /// Create a new domain.
    Create(CreateDomainArgs),

    /// Get domain details.
    Get(DomainIdArgs),

    /// Update a domain.
    Update(UpdateDomainArgs),

    /// Delete a domain (not supported by the service).
    Delete(DomainIdArgs),
}

#[derive(Debug, Args)]
struct CreateDomainArgs {
    /// Domain name.
    name: String,

    /// Policy title.
    #[arg(long)]
    policy: Option<String>,

    /// URI of the parent domain.
    #[arg(long)]
    parent: Option<String>,
}

#[derive(Debug, Args)]
struct DomainIdArgs {
    /// Domain ID.
    id: String,
}

#[derive(Debug, Args)]
struct UpdateDomainArgs {
    /// Domain ID.
    id: String,

    /// New domain name.
    #[arg(long)]
    name: Option<String>,

    /// New policy title; pass "" to clear.
    #[arg(long)]
    policy: Option<String>,

    /// New parent domain URI; pass "" to clear.
    #[arg(long)]
    parent: Option<String>,
}

impl DomainsCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            DomainsSubcommand::List => list_domains(ctx),
            DomainsSubcommand::Create(args) => create_domain(ctx, args),
            DomainsSubcommand::Get(args) => get_domain(ctx, args),
            DomainsSubcommand::Update(args) => update_domain(ctx, args),
            DomainsSubcommand::Delete(args) => delete_domain(ctx, args),
        }
    }
}

/// Table row for a domain.
#[derive(Debug, Serialize, Tabled)]
struct DomainRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Policy")]
    policy: String,

    #[tabled(rename = "Parent")]
    parent: String,

    #[tabled(rename = "URI")]
    uri: String,
}

impl From<&Domain> for DomainRow {
    fn from(domain: &Domain) -> Self {
        Self {
            id: domain.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            name: domain.name.clone(),
            policy: dash(domain.policy.as_deref()),
            parent: dash(domain.parent.as_deref()),
            uri: dash(domain.uri.as_deref()),
        }
    }
}

fn print_domain(domain: &Domain, format: OutputFormat) {
    match format {
        OutputFormat::Table => print_output(&[DomainRow::from(domain)], format),
        OutputFormat::Json => print_single(domain),
    }
}

fn list_domains(ctx: CommandContext) -> Result<()> {
    let domains = ctx.client()?.list_domains()?;

    match ctx.format {
        OutputFormat::Table => {
            let rows: Vec<DomainRow> = domains.iter().map(DomainRow::from).collect();
            print_output(&rows, ctx.format);
        }
        OutputFormat::Json => print_single(&domains),
    }
    Ok(())
}

fn create_domain(ctx: CommandContext, args: CreateDomainArgs) -> Result<()> {
    let mut domain = NewDomain::new(args.name);
    domain.policy = args.policy;
    domain.parent = args.parent;

    let uri = ctx.client()?.create_domain(&domain)?;

    match ctx.format {
        OutputFormat::Table => print_success(&format!("Created domain {uri}")),
        OutputFormat::Json => print_single(&serde_json::json!({ "uri": uri })),
    }
    Ok(())
}

fn get_domain(ctx: CommandContext, args: DomainIdArgs) -> Result<()> {
    let domain = ctx.client()?.get_domain(&args.id)?;
    print_domain(&domain, ctx.format);
    Ok(())
}

fn update_domain(ctx: CommandContext, args: UpdateDomainArgs) -> Result<()> {
    let update = DomainUpdate {
        name: args.name,
        policy: args.policy,
        parent: args.parent,
    };

    let domain = ctx.client()?.update_domain(&args.id, &update)?;
    if ctx.format == OutputFormat::Table {
        print_success(&format!("Updated domain {}", args.id));
    }
    print_domain(&domain, ctx.format);
    Ok(())
}

fn delete_domain(ctx: CommandContext, args: DomainIdArgs) -> Result<()> {
    ctx.client()?.delete_domain(&args.id)?;
    Ok(())
}
