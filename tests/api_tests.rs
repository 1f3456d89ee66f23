//! HTTP init client against local `tiny_http` servers.

use std::thread;
use std::time::Duration;

use hemdash::api::{HttpInitClient, InitClient, InitError};
use hemdash::config::schema::ApiConfig;
use hemdash::session::{InitOutcome, Session, SessionOptions, View};
use hemdash::store::MemoryStore;
use hemdash::web::{self, DemoBackend};
use tiny_http::{Response, Server};

/// Bind an ephemeral port and return the server with its base URL.
fn bind() -> (Server, String) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    (server, format!("http://{addr}"))
}

/// Serve exactly one request with `status` and `body`.
fn one_shot(status: u16, body: &'static str) -> String {
    let (server, base) = bind();
    thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let _ = request.respond(Response::from_string(body).with_status_code(status));
        }
    });
    base
}

fn client(base_url: String) -> HttpInitClient {
    HttpInitClient::from_config(&ApiConfig {
        base_url,
        timeout_ms: 5_000,
        ..ApiConfig::default()
    })
}

#[test]
fn decodes_a_successful_response() {
    let base = one_shot(
        200,
        r#"{"message":"System initialized successfully","devices_count":12,
            "homes":{"A":{"rooms":{}},"B":{"rooms":{}}}}"#,
    );

    let response = client(base).fetch_init().unwrap();
    assert_eq!(response.devices_count, 12);
    assert_eq!(response.resolved_homes_count(), 2);
}

#[test]
fn server_errors_map_to_status() {
    let base = one_shot(500, r#"{"error":"boom"}"#);
    let err = client(base).fetch_init().unwrap_err();
    assert!(matches!(err, InitError::Status { status: 500 }));
}

#[test]
fn unparseable_bodies_map_to_decode() {
    let base = one_shot(200, "<html>not json</html>");
    let err = client(base).fetch_init().unwrap_err();
    assert!(matches!(err, InitError::Decode(_)));
}

#[test]
fn localhost_is_pinned_to_ipv4() {
    let client = client("http://localhost:8000/".to_string());
    assert_eq!(client.url(), "http://127.0.0.1:8000/api/init");
}

#[test]
fn demo_backend_initializes_a_session() {
    let (server, base) = bind();
    thread::spawn(move || web::handle_requests(&server, &DemoBackend::sample()));

    let mut session = Session::load(SessionOptions::default(), MemoryStore::new(), client(base))
        .unwrap();
    assert_eq!(session.initialize().unwrap(), InitOutcome::Initialized);
    session.advance(Duration::from_secs(1));

    assert_eq!(session.view(), View::Dashboard);
    assert_eq!(session.state().devices_count, 9);
    assert_eq!(session.state().homes_count, 2);
    assert_eq!(
        session.state().home_names(),
        ["Lakeside Cottage", "City Flat"]
    );
}
