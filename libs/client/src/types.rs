//! Request and response records for the pidman REST API.
//!
//! These are plain data shapes created and discarded per call. Optional
//! request fields left as `None` are omitted from the wire entirely; an
//! explicit empty string is sent and clears the field on the server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClientError;

// =============================================================================
// Identifier Type
// =============================================================================

/// Kind of persistent identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PidType {
    /// Archival Resource Key; may have qualified targets.
    Ark,
    /// Persistent URL; exactly one unqualified target.
    Purl,
}

impl PidType {
    /// All supported identifier types.
    pub const ALL: [PidType; 2] = [PidType::Ark, PidType::Purl];

    /// The URL path segment and wire name for this type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            PidType::Ark => "ark",
            PidType::Purl => "purl",
        }
    }

    /// Returns true if targets of this type may carry a qualifier.
    #[must_use]
    pub const fn supports_qualifiers(&self) -> bool {
        matches!(self, PidType::Ark)
    }
}

impl std::fmt::Display for PidType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PidType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PidType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ClientError::invalid(format!("pid type '{s}' is not recognized")))
    }
}

// =============================================================================
// Request Payloads
// =============================================================================

/// Fields for creating a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewDomain {
    /// Label for the new domain. Required.
    pub name: String,

    /// Policy title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    /// URI of the parent domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl NewDomain {
    /// A new domain with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Fields to change on an existing domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl DomainUpdate {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Fields for creating a pid with a single target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewPid {
    /// REST URI of the domain the pid belongs to. Required.
    pub domain: String,

    /// URI the target resolves to. Required. May contain
    /// [`PID_TOKEN`](crate::PID_TOKEN).
    pub target_uri: String,

    /// Name or title for the pid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// External system name.
    #[serde(rename = "external_system_id", skip_serializing_if = "Option::is_none")]
    pub external_system: Option<String>,

    /// Identifier of the pid within the external system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_system_key: Option<String>,

    /// Policy title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    /// Proxy name used to resolve the target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Qualifier for the first target (ARK only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl NewPid {
    /// A new pid with the required fields.
    pub fn new(domain: impl Into<String>, target_uri: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            target_uri: target_uri.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn external_system(mut self, system: impl Into<String>) -> Self {
        self.external_system = Some(system.into());
        self
    }

    #[must_use]
    pub fn external_system_key(mut self, key: impl Into<String>) -> Self {
        self.external_system_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    #[must_use]
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    #[must_use]
    pub fn qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }
}

/// Fields to change on an existing pid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PidUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "external_system_id", skip_serializing_if = "Option::is_none")]
    pub external_system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_system_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
}

impl PidUpdate {
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn external_system(mut self, system: impl Into<String>) -> Self {
        self.external_system = Some(system.into());
        self
    }

    #[must_use]
    pub fn external_system_key(mut self, key: impl Into<String>) -> Self {
        self.external_system_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }
}

/// Fields to change on a target. Updating a new ARK qualifier creates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Inactive targets are not resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl TargetUpdate {
    #[must_use]
    pub fn target_uri(mut self, uri: impl Into<String>) -> Self {
        self.target_uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}

/// Pid search filters. Unset and empty filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    /// Exact pid value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub pid_type: Option<PidType>,

    /// Exact target URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Exact domain name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Domain REST URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_uri: Option<String>,

    /// Page of results, starting at 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Results per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl SearchQuery {
    /// Query-string pairs for the filters that are set.
    pub fn pairs(&self) -> Result<Vec<(String, String)>, ClientError> {
        let pairs = crate::client::payload_fields(self)?
            .into_iter()
            .filter(|(_, value)| match value {
                Value::String(s) => !s.is_empty(),
                Value::Number(n) => n.as_u64() != Some(0),
                _ => true,
            })
            .map(|(key, value)| (key, crate::client::wire_string(&value)))
            .collect();
        Ok(pairs)
    }
}

// =============================================================================
// Response Records
// =============================================================================

/// A domain as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default)]
    pub name: String,

    /// REST URI of this domain.
    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default)]
    pub policy: Option<String>,

    /// REST URI of the parent domain.
    #[serde(default)]
    pub parent: Option<String>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A pid as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pid {
    /// The noid of this pid.
    #[serde(default)]
    pub pid: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub external_system_id: Option<String>,

    #[serde(default)]
    pub external_system_key: Option<String>,

    #[serde(default)]
    pub policy: Option<String>,

    #[serde(default)]
    pub targets: Vec<Target>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A resolution target as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub target_uri: String,

    /// Empty or absent for the unqualified target.
    #[serde(default)]
    pub qualifier: Option<String>,

    #[serde(default)]
    pub proxy: Option<String>,

    #[serde(default)]
    pub active: Option<bool>,

    /// Resolvable URI of this target.
    #[serde(default)]
    pub access_uri: Option<String>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Target {
    /// The qualifier, with the unqualified target as `""`.
    pub fn qualifier_or_default(&self) -> &str {
        self.qualifier.as_deref().unwrap_or_default()
    }
}

/// One page of pid search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<Pid>,

    #[serde(default)]
    pub results_count: Option<u64>,

    #[serde(default)]
    pub page_count: Option<u64>,

    #[serde(default)]
    pub page: Option<u64>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of a target update.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetChange {
    /// An existing target was modified (200).
    Updated(Target),
    /// A new qualified ARK target was created (201).
    Created(Target),
}

impl TargetChange {
    /// The target after the change.
    pub fn target(&self) -> &Target {
        match self {
            TargetChange::Updated(target) | TargetChange::Created(target) => target,
        }
    }

    /// Consume the outcome, keeping the target.
    pub fn into_target(self) -> Target {
        match self {
            TargetChange::Updated(target) | TargetChange::Created(target) => target,
        }
    }

    /// Returns true if the update created a new target.
    pub fn is_created(&self) -> bool {
        matches!(self, TargetChange::Created(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_type_parse() {
        assert_eq!("ark".parse::<PidType>().unwrap(), PidType::Ark);
        assert_eq!("purl".parse::<PidType>().unwrap(), PidType::Purl);
        let err = "faux-pid".parse::<PidType>().unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
        assert!("ARK".parse::<PidType>().is_err());
    }

    #[test]
    fn test_pid_type_display() {
        assert_eq!(PidType::Ark.to_string(), "ark");
        assert_eq!(serde_json::to_string(&PidType::Purl).unwrap(), "\"purl\"");
        assert!(PidType::Ark.supports_qualifiers());
        assert!(!PidType::Purl.supports_qualifiers());
    }

    #[test]
    fn test_omitted_fields_not_serialized() {
        let pid = NewPid::new("http://pid/domains/1/", "http://some.url");
        let value = serde_json::to_value(&pid).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["domain", "target_uri"]);
    }

    #[test]
    fn test_external_system_wire_name() {
        let update = PidUpdate::default().external_system("EUCLID");
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({"external_system_id": "EUCLID"}));
    }

    #[test]
    fn test_search_pairs_skip_empty() {
        let query = SearchQuery {
            pid_type: Some(PidType::Purl),
            domain: Some("General purchased collections".to_string()),
            target: Some(String::new()),
            page: Some(2),
            count: Some(0),
            ..SearchQuery::default()
        };
        let pairs = query.pairs().unwrap();
        assert!(pairs.contains(&("type".to_string(), "purl".to_string())));
        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert!(pairs.contains(&(
            "domain".to_string(),
            "General purchased collections".to_string()
        )));
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn test_search_pairs_keep_zero_noid() {
        let query = SearchQuery {
            pid: Some("0".to_string()),
            page: Some(0),
            ..SearchQuery::default()
        };
        assert_eq!(query.pairs().unwrap(), vec![("pid".to_string(), "0".to_string())]);
    }

    #[test]
    fn test_records_tolerate_unknown_fields() {
        let pid: Pid = serde_json::from_value(serde_json::json!({
            "pid": "1fx",
            "name": "A pid",
            "created_at": "2011-03-01T10:00:00",
            "targets": [
                {"target_uri": "http://foo.bar/", "active": true, "qualifier": ""},
                {"target_uri": "http://foo.bar/pdf", "qualifier": "PDF"}
            ]
        }))
        .unwrap();

        assert_eq!(pid.pid, "1fx");
        assert_eq!(pid.targets.len(), 2);
        assert_eq!(pid.targets[0].qualifier_or_default(), "");
        assert_eq!(pid.targets[1].qualifier_or_default(), "PDF");
        assert_eq!(pid.extra["created_at"], "2011-03-01T10:00:00");
    }

    #[test]
    fn test_target_change() {
        let target = Target {
            target_uri: "http://foo.bar/".to_string(),
            ..Target::default()
        };
        let created = TargetChange::Created(target.clone());
        assert!(created.is_created());
        assert_eq!(created.target(), &target);
        assert!(!TargetChange::Updated(target.clone()).is_created());
        assert_eq!(created.into_target(), target);
    }
}
