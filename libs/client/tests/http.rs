//! End-to-end tests of the client over real HTTP against a mock server.

use pidman_client::{
    ClientError, DomainUpdate, NewPid, PidType, PidmanClient, SearchQuery, TargetUpdate,
};
use serde_json::json;
use wiremock::matchers::{
    basic_auth, body_json, body_string_contains, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER: &str = "testuser";
const PASSWORD: &str = "testuserpass";

/// Run a blocking client call off the async runtime.
async fn blocking<F, R>(f: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

/// An authenticated client for the mock server.
///
/// The blocking reqwest client must be built and dropped off the runtime, so
/// tests pass this closure into [`blocking`].
fn connect(server: &MockServer) -> impl FnOnce() -> PidmanClient {
    let base = format!("{}/pidman/", server.uri());
    move || PidmanClient::new(&base, Some(USER), Some(PASSWORD)).unwrap()
}

#[tokio::test]
async fn test_list_domains_is_anonymous() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pidman/domains/"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "General", "uri": "http://pid/domains/1/"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server);
    let domains = blocking(move || client().list_domains()).await.unwrap();
    assert_eq!(domains[0].name, "General");

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    let agent = requests[0].headers.get("user-agent").unwrap().to_str().unwrap();
    assert!(agent.starts_with("pidman-client/"));
}

#[tokio::test]
async fn test_create_ark_sends_form_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pidman/ark/"))
        .and(basic_auth(USER, PASSWORD))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(header("accept", "text/plain"))
        .and(body_string_contains("target_uri=http%3A%2F%2Fsome.url"))
        .and(body_string_contains("qualifier=PDF"))
        .respond_with(ResponseTemplate::new(201).set_body_string("http://pid/ark:/25593/1fx\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server);
    let pid = NewPid::new("http://pid/domains/1/", "http://some.url").qualifier("PDF");
    let ark = blocking(move || client().create_ark(&pid)).await.unwrap();
    assert_eq!(ark, "http://pid/ark:/25593/1fx");
}

#[tokio::test]
async fn test_update_domain_sends_json() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/pidman/domains/25/"))
        .and(basic_auth(USER, PASSWORD))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"policy": "Permanent"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 25,
            "name": "d",
            "policy": "Permanent"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server);
    let update = DomainUpdate::default().policy("Permanent");
    let domain = blocking(move || client().update_domain(25, &update))
        .await
        .unwrap();
    assert_eq!(domain.policy.as_deref(), Some("Permanent"));
}

#[tokio::test]
async fn test_search_sends_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pidman/pids/"))
        .and(query_param("type", "ark"))
        .and(query_param("target", "http://foo.bar/a b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results_count": 0, "page_count": 0, "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server);
    let query = SearchQuery {
        pid_type: Some(PidType::Ark),
        target: Some("http://foo.bar/a b".to_string()),
        ..SearchQuery::default()
    };
    let results = blocking(move || client().search_pids(&query)).await.unwrap();
    assert!(results.results.is_empty());
}

#[tokio::test]
async fn test_update_new_ark_qualifier_is_created() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/pidman/ark/bb/NEW"))
        .and(basic_auth(USER, PASSWORD))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"target_uri": "http://x/", "qualifier": "NEW"})),
        )
        .mount(&server)
        .await;

    let client = connect(&server);
    let update = TargetUpdate::default().target_uri("http://x/");
    let change = blocking(move || client().update_ark_target("bb", "NEW", &update))
        .await
        .unwrap();
    assert!(change.is_created());
}

#[tokio::test]
async fn test_delete_ark_target_and_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/pidman/ark/aa/"))
        .and(basic_auth(USER, PASSWORD))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pidman/purl/zz"))
        .respond_with(ResponseTemplate::new(404).set_body_string("No PURL found"))
        .mount(&server)
        .await;

    let client = connect(&server);
    let (deleted, missing) = blocking(move || {
        let client = client();
        (client.delete_ark_target("aa", ""), client.get_purl("zz"))
    })
    .await;
    deleted.unwrap();

    let err = missing.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, ClientError::Http { .. }));
    assert_eq!(err.to_string(), "HTTP 404 Not Found: No PURL found");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let server = MockServer::start().await;
    let base = format!("{}/pidman", server.uri());
    drop(server);

    let err = blocking(move || {
        PidmanClient::new(&base, None, None)
            .unwrap()
            .list_domains()
    })
    .await
    .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}
