//! REST client for the pidman API.
//!
//! Every operation is one blocking round-trip: build the URL and payload,
//! attach credentials if the method modifies data, dispatch through the
//! [`Transport`], check the status against the expected set, then decode the
//! body.

use pidman_ark::Ark;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{ClientConfig, Credentials};
use crate::endpoint::BaseEndpoint;
use crate::error::{ClientError, Result};
use crate::transport::{HeaderMap, Method, ReqwestTransport, Request, Response, StatusCode, Transport};
use crate::types::{
    Domain, DomainUpdate, NewDomain, NewPid, Pid, PidType, PidUpdate, SearchQuery, SearchResults,
    Target, TargetChange, TargetUpdate,
};

/// `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("pidman-client/", env!("CARGO_PKG_VERSION"));

/// Placeholder in a create-pid target URI that the service replaces with the
/// newly minted noid.
pub const PID_TOKEN: &str = "{%PID%}";

const APPLICATION_JSON: &str = "application/json";
const TEXT_PLAIN: &str = "text/plain";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

const DOMAINS: &str = "domains";
const PIDS: &str = "pids";

/// Request body of an [`ApiCall`].
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Sent as `application/x-www-form-urlencoded`.
    Form(Map<String, Value>),
    /// Sent as `application/json`.
    Json(Map<String, Value>),
}

/// Description of a single API call, relative to the base endpoint.
#[derive(Debug, Clone)]
pub struct ApiCall {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Body>,
    accept: &'static str,
    expected: Vec<StatusCode>,
}

impl ApiCall {
    /// A call with the given method and path segments below the base URL.
    ///
    /// End the segments with `""` for a trailing slash.
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
            accept: APPLICATION_JSON,
            expected: vec![StatusCode::OK],
        }
    }

    pub fn get<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::GET, segments)
    }

    pub fn post<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::POST, segments)
    }

    pub fn put<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::PUT, segments)
    }

    pub fn delete<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::DELETE, segments)
    }

    /// Add query-string parameters.
    #[must_use]
    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Set a request body.
    #[must_use]
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the accepted response content type (default `application/json`).
    #[must_use]
    pub fn accept(mut self, content_type: &'static str) -> Self {
        self.accept = content_type;
        self
    }

    /// Set the status codes that count as success (default `200`).
    #[must_use]
    pub fn expect(mut self, statuses: impl IntoIterator<Item = StatusCode>) -> Self {
        self.expected = statuses.into_iter().collect();
        self
    }

    /// Returns true if this call modifies data and so carries credentials.
    pub fn requires_auth(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT | Method::DELETE)
    }
}

/// Client for the pidman REST API.
#[derive(Debug, Clone)]
pub struct PidmanClient<T: Transport = ReqwestTransport> {
    endpoint: BaseEndpoint,
    credentials: Option<Credentials>,
    transport: T,
}

impl PidmanClient<ReqwestTransport> {
    /// Create a client over HTTP(S).
    ///
    /// Credentials are kept only if both username and password are non-empty;
    /// without them, calls that modify data are sent unauthenticated.
    pub fn new(base_url: &str, username: Option<&str>, password: Option<&str>) -> Result<Self> {
        let endpoint = BaseEndpoint::parse(base_url)?;
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(
            endpoint,
            Credentials::from_parts(username, password),
            transport,
        ))
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let endpoint = BaseEndpoint::parse(&config.base_url)?;
        let transport = ReqwestTransport::with_timeout(config.timeout)?;
        Ok(Self::with_transport(endpoint, config.credentials(), transport))
    }

    /// Create a client from `PIDMAN_HOST`, `PIDMAN_USER` and `PIDMAN_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        Self::from_config(&config)
    }
}

impl<T: Transport> PidmanClient<T> {
    /// Create a client over any transport.
    pub fn with_transport(
        endpoint: BaseEndpoint,
        credentials: Option<Credentials>,
        transport: T,
    ) -> Self {
        Self {
            endpoint,
            credentials,
            transport,
        }
    }

    /// The normalized base endpoint.
    pub fn endpoint(&self) -> &BaseEndpoint {
        &self.endpoint
    }

    /// Returns true if credentials are configured.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -------------------------------------------------------------------------
    // Protocol
    // -------------------------------------------------------------------------

    /// Send a call and check its status, returning the raw response.
    pub fn execute(&self, call: ApiCall) -> Result<Response> {
        let authenticate = call.requires_auth();
        let ApiCall {
            method,
            segments,
            query,
            body,
            accept,
            expected,
        } = call;

        let mut url = self.endpoint.join(segments.iter().map(String::as_str))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(&query);
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        let accept = HeaderValue::from_str(accept)
            .map_err(|_| ClientError::invalid(format!("invalid accept type '{accept}'")))?;
        headers.insert(ACCEPT, accept);

        let body = match body {
            Some(Body::Form(fields)) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_URLENCODED));
                Some(form_encode(&fields).into_bytes())
            }
            Some(Body::Json(fields)) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
                Some(Value::Object(fields).to_string().into_bytes())
            }
            None => None,
        };

        let credentials = self.credentials.as_ref().filter(|_| authenticate);
        if let Some(credentials) = credentials {
            let mut value = HeaderValue::from_str(&credentials.basic_auth())
                .map_err(|_| ClientError::invalid("credentials contain invalid header characters"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        debug!(
            method = %method,
            url = %url,
            authenticated = credentials.is_some(),
            "Sending pidman request"
        );

        let response = self.transport.send(Request {
            method: method.clone(),
            url: url.clone(),
            headers,
            body,
        })?;

        if !expected.contains(&response.status) {
            let text = String::from_utf8_lossy(&response.body).trim().to_string();
            warn!(
                method = %method,
                url = %url,
                status = response.status.as_u16(),
                "Unexpected pidman response status"
            );
            return Err(ClientError::Http {
                status: response.status.as_u16(),
                reason: response.reason().to_string(),
                detail: (!text.is_empty()).then_some(text),
            });
        }

        Ok(response)
    }

    fn fetch_json<R: DeserializeOwned>(&self, call: ApiCall) -> Result<R> {
        self.execute(call.accept(APPLICATION_JSON))?.json_body()
    }

    fn fetch_text(&self, call: ApiCall) -> Result<String> {
        let text = self.execute(call.accept(TEXT_PLAIN))?.text()?;
        Ok(text.trim().to_string())
    }

    // -------------------------------------------------------------------------
    // Domains
    // -------------------------------------------------------------------------

    /// List all domains.
    pub fn list_domains(&self) -> Result<Vec<Domain>> {
        self.fetch_json(ApiCall::get([DOMAINS, ""]))
    }

    /// Create a domain, returning the URI of the new domain.
    pub fn create_domain(&self, domain: &NewDomain) -> Result<String> {
        if domain.name.is_empty() {
            return Err(ClientError::invalid("domain name cannot be empty"));
        }

        let call = ApiCall::post([DOMAINS, ""])
            .body(Body::Form(payload_fields(domain)?))
            .expect([StatusCode::CREATED]);
        self.fetch_text(call)
    }

    /// Get a single domain by id.
    pub fn get_domain(&self, domain_id: impl std::fmt::Display) -> Result<Domain> {
        let id = required_segment("domain id", domain_id.to_string())?;
        let body: DomainBody = self.fetch_json(ApiCall::get([DOMAINS, id.as_str(), ""]))?;
        body.into_domain()
    }

    /// Update a domain, returning it as stored after the change.
    pub fn update_domain(
        &self,
        domain_id: impl std::fmt::Display,
        update: &DomainUpdate,
    ) -> Result<Domain> {
        let id = required_segment("domain id", domain_id.to_string())?;
        let fields = update_fields(update, "domain")?;
        let body: DomainBody =
            self.fetch_json(ApiCall::put([DOMAINS, id.as_str(), ""]).body(Body::Json(fields)))?;
        body.into_domain()
    }

    /// Domains cannot be deleted; always fails without contacting the service.
    pub fn delete_domain(&self, _domain_id: impl std::fmt::Display) -> Result<()> {
        Err(ClientError::Unsupported("domains cannot be deleted"))
    }

    // -------------------------------------------------------------------------
    // Pids
    // -------------------------------------------------------------------------

    /// Search pids. Filters left unset are not sent.
    pub fn search_pids(&self, query: &SearchQuery) -> Result<SearchResults> {
        self.fetch_json(ApiCall::get([PIDS, ""]).query(query.pairs()?))
    }

    /// Create a pid with a single target, returning the new identifier in
    /// resolvable form.
    pub fn create_pid(&self, pid_type: PidType, pid: &NewPid) -> Result<String> {
        if pid.domain.trim().is_empty() {
            return Err(ClientError::invalid("pid domain cannot be empty"));
        }
        if pid.target_uri.trim().is_empty() {
            return Err(ClientError::invalid("pid target_uri cannot be empty"));
        }
        if pid.qualifier.is_some() && !pid_type.supports_qualifiers() {
            return Err(ClientError::invalid(format!(
                "{pid_type} targets cannot be qualified"
            )));
        }

        let call = ApiCall::post([pid_type.as_str(), ""])
            .body(Body::Form(payload_fields(pid)?))
            .expect([StatusCode::CREATED]);
        self.fetch_text(call)
    }

    pub fn create_ark(&self, pid: &NewPid) -> Result<String> {
        self.create_pid(PidType::Ark, pid)
    }

    pub fn create_purl(&self, pid: &NewPid) -> Result<String> {
        self.create_pid(PidType::Purl, pid)
    }

    /// Get a single pid.
    pub fn get_pid(&self, pid_type: PidType, noid: &str) -> Result<Pid> {
        self.fetch_json(ApiCall::get(pid_segments(pid_type, noid)?))
    }

    pub fn get_ark(&self, noid: &str) -> Result<Pid> {
        self.get_pid(PidType::Ark, noid)
    }

    pub fn get_purl(&self, noid: &str) -> Result<Pid> {
        self.get_pid(PidType::Purl, noid)
    }

    /// Update a pid, returning it as stored after the change.
    pub fn update_pid(&self, pid_type: PidType, noid: &str, update: &PidUpdate) -> Result<Pid> {
        let segments = pid_segments(pid_type, noid)?;
        let fields = update_fields(update, "pid")?;
        self.fetch_json(ApiCall::put(segments).body(Body::Json(fields)))
    }

    pub fn update_ark(&self, noid: &str, update: &PidUpdate) -> Result<Pid> {
        self.update_pid(PidType::Ark, noid, update)
    }

    pub fn update_purl(&self, noid: &str, update: &PidUpdate) -> Result<Pid> {
        self.update_pid(PidType::Purl, noid, update)
    }

    // -------------------------------------------------------------------------
    // Targets
    // -------------------------------------------------------------------------

    /// Get a single target. Use `""` for the unqualified target.
    pub fn get_target(&self, pid_type: PidType, noid: &str, qualifier: &str) -> Result<Target> {
        self.fetch_json(ApiCall::get(target_segments(pid_type, noid, qualifier)?))
    }

    pub fn get_ark_target(&self, noid: &str, qualifier: &str) -> Result<Target> {
        self.get_target(PidType::Ark, noid, qualifier)
    }

    /// A PURL has exactly one, unqualified target.
    pub fn get_purl_target(&self, noid: &str) -> Result<Target> {
        self.get_target(PidType::Purl, noid, "")
    }

    /// Get the target a parsed ARK refers to.
    pub fn get_target_for(&self, ark: &Ark) -> Result<Target> {
        self.get_ark_target(ark.noid(), ark.qualifier().unwrap_or_default())
    }

    /// Update a target.
    ///
    /// For an ARK, updating a qualifier that does not exist yet creates it and
    /// yields [`TargetChange::Created`].
    pub fn update_target(
        &self,
        pid_type: PidType,
        noid: &str,
        qualifier: &str,
        update: &TargetUpdate,
    ) -> Result<TargetChange> {
        let segments = target_segments(pid_type, noid, qualifier)?;
        let fields = update_fields(update, "target")?;

        let mut expected = vec![StatusCode::OK];
        if pid_type == PidType::Ark {
            expected.push(StatusCode::CREATED);
        }

        let call = ApiCall::put(segments)
            .body(Body::Json(fields))
            .accept(APPLICATION_JSON)
            .expect(expected);
        let response = self.execute(call)?;
        let target = response.json_body()?;

        Ok(if response.status == StatusCode::CREATED {
            TargetChange::Created(target)
        } else {
            TargetChange::Updated(target)
        })
    }

    pub fn update_ark_target(
        &self,
        noid: &str,
        qualifier: &str,
        update: &TargetUpdate,
    ) -> Result<TargetChange> {
        self.update_target(PidType::Ark, noid, qualifier, update)
    }

    pub fn update_purl_target(&self, noid: &str, update: &TargetUpdate) -> Result<TargetChange> {
        self.update_target(PidType::Purl, noid, "", update)
    }

    /// Delete an ARK target. PURL targets cannot be deleted.
    pub fn delete_ark_target(&self, noid: &str, qualifier: &str) -> Result<()> {
        let call = ApiCall::delete(target_segments(PidType::Ark, noid, qualifier)?);
        self.fetch_text(call)?;
        Ok(())
    }
}

// =============================================================================
// Payload helpers
// =============================================================================

/// A single-domain response, sent either as the record or wrapped in a
/// one-element list.
#[derive(Deserialize)]
#[serde(untagged)]
enum DomainBody {
    Many(Vec<Domain>),
    One(Domain),
}

impl DomainBody {
    fn into_domain(self) -> Result<Domain> {
        match self {
            DomainBody::One(domain) => Ok(domain),
            DomainBody::Many(domains) => domains
                .into_iter()
                .next()
                .ok_or_else(|| ClientError::Decode("empty domain list in response".to_string())),
        }
    }
}

/// The serialized fields of a payload record.
pub(crate) fn payload_fields<P: Serialize>(payload: &P) -> Result<Map<String, Value>> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(ClientError::invalid(format!(
            "payload must serialize to an object, got {other}"
        ))),
        Err(e) => Err(ClientError::invalid(format!("payload cannot be serialized: {e}"))),
    }
}

/// Fields of an update payload; at least one must be set.
fn update_fields<P: Serialize>(payload: &P, kind: &str) -> Result<Map<String, Value>> {
    let fields = payload_fields(payload)?;
    if fields.is_empty() {
        return Err(ClientError::invalid(format!("no {kind} update data specified")));
    }
    Ok(fields)
}

/// Scalar JSON value as it appears in a form or query string.
pub(crate) fn wire_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn form_encode(fields: &Map<String, Value>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        serializer.append_pair(key, &wire_string(value));
    }
    serializer.finish()
}

fn required_segment(name: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(ClientError::invalid(format!("{name} cannot be empty")));
    }
    Ok(value)
}

/// `{type}/{noid}`, with no trailing slash.
fn pid_segments(pid_type: PidType, noid: &str) -> Result<Vec<String>> {
    let noid = required_segment("noid", noid.to_string())?;
    Ok(vec![pid_type.as_str().to_string(), noid])
}

/// `{type}/{noid}/{qualifier}`; the qualifier may span several segments.
fn target_segments(pid_type: PidType, noid: &str, qualifier: &str) -> Result<Vec<String>> {
    if !qualifier.is_empty() && !pid_type.supports_qualifiers() {
        return Err(ClientError::invalid(format!(
            "{pid_type} targets cannot be qualified"
        )));
    }
    let mut segments = pid_segments(pid_type, noid)?;
    segments.extend(qualifier.split('/').map(str::to_string));
    Ok(segments)
}

// =============================================================================
// Tests
// =============================================================================
