//! Bulk host migration of pid targets.

use anyhow::{bail, Context, Result};
use clap::Args;
use pidman_client::{
    Pid, PidType, PidmanClient, SearchQuery, SearchResults, TargetUpdate, Transport,
};
use serde::Serialize;
use tabled::Tabled;
use tracing::{info, warn};
use url::Url;

use crate::output::{dash, print_info, print_output, print_single, print_success, OutputFormat};

use super::{parse_pid_type, CommandContext};

/// Rewrite targets in a domain that point at one host to point at another.
#[derive(Debug, Args)]
pub struct RetargetCommand {
    /// Domain name to migrate.
    #[arg(long)]
    domain: String,

    /// Current base URL of the targets, e.g. https://old.example.org:8443
    #[arg(long)]
    from: String,

    /// New base URL of the targets.
    #[arg(long)]
    to: String,

    /// Only migrate pids of this type (ark or purl).
    #[arg(long = "type", value_parser = parse_pid_type)]
    pid_type: Option<PidType>,

    /// Search page size.
    #[arg(long, default_value_t = 100)]
    page_size: u32,

    /// Show what would change without updating anything.
    #[arg(long)]
    dry_run: bool,
}

impl RetargetCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let from = parse_base(&self.from).context("--from")?;
        let to = parse_base(&self.to).context("--to")?;
        let client = ctx.client()?;

        let plan = Plan {
            domain: &self.domain,
            pid_type: self.pid_type,
            page_size: self.page_size,
            from: &from,
            to: &to,
            dry_run: self.dry_run,
        };
        let report = retarget(&client, &plan)?;

        match ctx.format {
            OutputFormat::Table => {
                print_output(&report.changes, ctx.format);
                let summary = format!(
                    "{} targets matched, {} left alone, {} skipped",
                    report.changes.len(),
                    report.unmatched,
                    report.skipped
                );
                if self.dry_run {
                    print_info(&format!("Dry run: {summary}"));
                } else {
                    print_success(&summary);
                }
            }
            OutputFormat::Json => print_single(&report),
        }
        Ok(())
    }
}

struct Plan<'a> {
    domain: &'a str,
    pid_type: Option<PidType>,
    page_size: u32,
    from: &'a Url,
    to: &'a Url,
    dry_run: bool,
}

/// One rewritten target.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
struct Change {
    #[tabled(rename = "Type")]
    pid_type: PidType,

    #[tabled(rename = "Pid")]
    noid: String,

    #[tabled(rename = "Qualifier", display = "display_qualifier")]
    qualifier: String,

    #[tabled(rename = "From")]
    from: String,

    #[tabled(rename = "To")]
    to: String,
}

fn display_qualifier(qualifier: &String) -> String {
    dash(Some(qualifier))
}

#[derive(Debug, Default, Serialize)]
struct Report {
    changes: Vec<Change>,
    unmatched: usize,
    skipped: usize,
    dry_run: bool,
}

fn parse_base(value: &str) -> Result<Url> {
    let url = Url::parse(value.trim()).with_context(|| format!("'{value}' is not a URL"))?;
    if url.host_str().is_none() {
        bail!("'{value}' has no host");
    }
    if url.query().is_some() || url.fragment().is_some() {
        bail!("'{value}' must not have a query or fragment");
    }
    Ok(url)
}

/// `target_uri` moved from `from` to `to`, or `None` if it is not under `from`.
///
/// The part of the path below `from`, the query and the fragment are kept.
fn rewrite_uri(target_uri: &str, from: &Url, to: &Url) -> Option<String> {
    let target = Url::parse(target_uri).ok()?;
    if target.origin() != from.origin() {
        return None;
    }

    let rest = target.path().strip_prefix(from.path().trim_end_matches('/'))?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }

    let mut moved = to.clone();
    moved.set_path(&format!("{}{rest}", to.path().trim_end_matches('/')));
    moved.set_query(target.query());
    moved.set_fragment(target.fragment());
    Some(moved.to_string())
}

/// Whether another search page follows `page`.
///
/// Without a `page_count`, a full page means there may be more.
fn has_next_page(results: &SearchResults, page: u32, page_size: u32) -> bool {
    if results.results.is_empty() {
        return false;
    }
    match results.page_count {
        Some(pages) => u64::from(page) < pages,
        None => results.results.len() >= page_size as usize,
    }
}

/// Type of a search result, from the filter or the record itself.
fn pid_type_of(pid: &Pid, filter: Option<PidType>) -> Option<PidType> {
    filter.or_else(|| pid.extra.get("type")?.as_str()?.parse().ok())
}

fn retarget<T: Transport>(client: &PidmanClient<T>, plan: &Plan<'_>) -> Result<Report> {
    let mut report = Report {
        dry_run: plan.dry_run,
        ..Report::default()
    };
    let mut page = 1;

    loop {
        let query = SearchQuery {
            domain: Some(plan.domain.to_string()),
            pid_type: plan.pid_type,
            page: Some(page),
            count: Some(plan.page_size),
            ..SearchQuery::default()
        };
        let results = client.search_pids(&query)?;
        info!(page, pids = results.results.len(), "Processing search page");

        for pid in &results.results {
            let Some(pid_type) = pid_type_of(pid, plan.pid_type) else {
                warn!(pid = %pid.pid, "Skipping pid of unknown type");
                report.skipped += pid.targets.len();
                continue;
            };

            for target in &pid.targets {
                let Some(new_uri) = rewrite_uri(&target.target_uri, plan.from, plan.to) else {
                    report.unmatched += 1;
                    continue;
                };
                let qualifier = match pid_type {
                    PidType::Ark => target.qualifier_or_default(),
                    PidType::Purl => "",
                };

                if !plan.dry_run {
                    client.update_target(
                        pid_type,
                        &pid.pid,
                        qualifier,
                        &TargetUpdate::default().target_uri(new_uri.clone()),
                    )?;
                    info!(pid = %pid.pid, qualifier, target = %new_uri, "Target moved");
                }

                report.changes.push(Change {
                    pid_type,
                    noid: pid.pid.clone(),
                    qualifier: qualifier.to_string(),
                    from: target.target_uri.clone(),
                    to: new_uri,
                });
            }
        }

        if !has_next_page(&results, page, plan.page_size) {
            break;
        }
        page += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use pidman_client::transport::Method;
    use pidman_client::{BaseEndpoint, Credentials, MockTransport, Response};
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn url(s: &str) -> Url {
        parse_base(s).unwrap()
    }

    #[rstest]
    #[case(
        "https://dev11.library.emory.edu:8443/fedora/objects/emory:8g6x3",
        Some("https://dev11.library.emory.edu:8943/fedora/objects/emory:8g6x3")
    )]
    #[case(
        "https://dev11.library.emory.edu:8443/fedora/objects/x/datastreams/PDF/content?download=true",
        Some("https://dev11.library.emory.edu:8943/fedora/objects/x/datastreams/PDF/content?download=true")
    )]
    #[case("https://dev11.library.emory.edu:9443/fedora/objects/x", None)]
    #[case("http://dev11.library.emory.edu:8443/fedora/objects/x", None)]
    #[case("not a url", None)]
    fn rewrites_matching_origin(#[case] target: &str, #[case] expected: Option<&str>) {
        let from = url("https://dev11.library.emory.edu:8443");
        let to = url("https://dev11.library.emory.edu:8943");
        assert_eq!(rewrite_uri(target, &from, &to).as_deref(), expected);
    }

    #[test]
    fn rewrites_path_prefix() {
        let from = url("http://old.example.org/fedora/");
        let to = url("https://repo.example.org/api/v2");
        assert_eq!(
            rewrite_uri("http://old.example.org/fedora/get/abc", &from, &to).as_deref(),
            Some("https://repo.example.org/api/v2/get/abc")
        );
        assert_eq!(
            rewrite_uri("http://old.example.org/fedoraX/get/abc", &from, &to),
            None
        );
    }

    #[test]
    fn rejects_bad_base() {
        assert!(parse_base("old.example.org").is_err());
        assert!(parse_base("http://old.example.org/?q=1").is_err());
    }

    fn client(responses: Vec<Response>) -> PidmanClient<MockTransport> {
        PidmanClient::with_transport(
            BaseEndpoint::parse("http://pid.example.org").unwrap(),
            Some(Credentials::new("user", "pass")),
            MockTransport::with_responses(responses),
        )
    }

    fn page(page: u64, page_count: u64, results: serde_json::Value) -> Response {
        Response::json(
            200,
            &json!({"page": page, "page_count": page_count, "results": results}),
        )
        .unwrap()
    }

    #[test]
    fn pages_through_domain_and_updates() {
        let client = client(vec![
            page(
                1,
                2,
                json!([{
                    "pid": "1fx",
                    "type": "ark",
                    "targets": [
                        {"target_uri": "http://old.org/a", "qualifier": ""},
                        {"target_uri": "http://elsewhere.org/a", "qualifier": "X"},
                        {"target_uri": "http://old.org/a.pdf", "qualifier": "PDF"}
                    ]
                }]),
            ),
            Response::json(200, &json!({"target_uri": "http://new.org/a"})).unwrap(),
            Response::json(200, &json!({"target_uri": "http://new.org/a.pdf"})).unwrap(),
            page(
                2,
                2,
                json!([{"pid": "2gz", "targets": [{"target_uri": "http://old.org/b"}]}]),
            ),
        ]);

        let (from, to) = (url("http://old.org"), url("http://new.org"));
        let plan = Plan {
            domain: "LSDI",
            pid_type: None,
            page_size: 1,
            from: &from,
            to: &to,
            dry_run: false,
        };
        let report = retarget(&client, &plan).unwrap();

        assert_eq!(report.changes.len(), 2);
        assert_eq!(report.changes[1].qualifier, "PDF");
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.skipped, 1);

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 4);
        assert!(requests[0].url.query().unwrap().contains("domain=LSDI"));
        assert_eq!(requests[1].method, Method::PUT);
        assert!(requests[1].url.as_str().ends_with("/ark/1fx/"));
        assert_eq!(
            requests[2].json_body(),
            Some(json!({"target_uri": "http://new.org/a.pdf"}))
        );
        assert!(requests[3].url.query().unwrap().contains("page=2"));
    }

    #[test]
    fn pages_without_page_count_until_short_page() {
        let unpaged = |results: serde_json::Value| {
            Response::json(200, &json!({"results": results})).unwrap()
        };
        let client = client(vec![
            unpaged(json!([
                {"pid": "aa", "targets": [{"target_uri": "http://old.org/a"}]},
                {"pid": "bb", "targets": [{"target_uri": "http://old.org/b"}]}
            ])),
            unpaged(json!([
                {"pid": "cc", "targets": [{"target_uri": "http://old.org/c"}]}
            ])),
        ]);

        let (from, to) = (url("http://old.org"), url("http://new.org"));
        let plan = Plan {
            domain: "General",
            pid_type: Some(PidType::Purl),
            page_size: 2,
            from: &from,
            to: &to,
            dry_run: true,
        };
        let report = retarget(&client, &plan).unwrap();

        assert_eq!(report.changes.len(), 3);
        assert_eq!(report.changes[2].noid, "cc");
        assert_eq!(client.transport().request_count(), 2);
    }

    #[test]
    fn dry_run_sends_no_updates() {
        let client = client(vec![page(
            1,
            1,
            json!([{"pid": "aa", "targets": [{"target_uri": "http://old.org/x"}]}]),
        )]);

        let (from, to) = (url("http://old.org"), url("http://new.org"));
        let plan = Plan {
            domain: "General",
            pid_type: Some(PidType::Purl),
            page_size: 100,
            from: &from,
            to: &to,
            dry_run: true,
        };
        let report = retarget(&client, &plan).unwrap();

        assert_eq!(report.changes[0].to, "http://new.org/x");
        assert_eq!(report.changes[0].pid_type, PidType::Purl);
        assert_eq!(client.transport().request_count(), 1);
        assert!(client.transport().requests()[0]
            .url
            .query()
            .unwrap()
            .contains("type=purl"));
    }
}
