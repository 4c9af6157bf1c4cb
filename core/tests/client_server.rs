//! End-to-end exchanges against the live fixture server.
//!
//! # Design
//! Each test starts the mock server on a random port, then drives the real
//! client over actual sockets. The `/json` endpoint echoes the request back,
//! so assertions can check what was transmitted on the wire, not just what
//! the client believes it sent.

use std::net::TcpListener;
use std::time::Duration;

use http_core::{
    Body, Client, ClientError, Method, NetworkErrorKind, Request, RequestFactory,
    TransportOptions, Uri,
};

fn start_server() -> String {
    let _ = env_logger::builder().is_test(true).try_init();

    let std_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn get(url: &str) -> Request {
    Request::new(Method::Get, Uri::parse(url).unwrap())
}

#[test]
fn duplicate_response_headers_accumulate() {
    let base = start_server();
    let response = Client::new().send(&get(&format!("{base}/json"))).unwrap();

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.reason_phrase(), "OK");
    assert_eq!(response.header("foo"), ["Bar", "baZ"]);
    assert_eq!(response.header_line("foo"), "Bar, baZ");
}

#[test]
fn request_body_reaches_the_server_verbatim() {
    let base = start_server();
    let request = Request::new(Method::Post, Uri::parse(&format!("{base}/json")).unwrap())
        .with_body(Body::from("hello world!"));

    let response = Client::new().send(&request).unwrap();
    let echo: serde_json::Value =
        serde_json::from_slice(&response.body().full_contents()).unwrap();

    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["body"], "hello world!");
    assert_eq!(echo["headers"]["content-length"][0], "12");
}

#[test]
fn default_headers_fill_in_but_never_override() {
    let base = start_server();
    let client = Client::new()
        .default_header("X-Token", "from-default")
        .default_header("X-Kept", "default-value");

    let request = get(&format!("{base}/json")).with_header("X-Token", "from-request");
    let response = client.send(&request).unwrap();
    let echo: serde_json::Value =
        serde_json::from_slice(&response.body().full_contents()).unwrap();

    assert_eq!(echo["headers"]["x-token"][0], "from-request");
    assert_eq!(echo["headers"]["x-kept"][0], "default-value");
}

#[test]
fn base_uri_combines_with_relative_request_uris() {
    let base = start_server();
    let client = Client::new().base_uri(Uri::parse(&base).unwrap());

    let response = client.send(&get("json?q=1")).unwrap();
    let echo: serde_json::Value =
        serde_json::from_slice(&response.body().full_contents()).unwrap();

    assert_eq!(echo["uri"], "/json?q=1");
    assert_eq!(echo["query"]["q"], "1");
}

#[test]
fn host_header_tracks_the_combined_uri() {
    let base = start_server();
    let client = Client::new().base_uri(Uri::parse(&base).unwrap());

    let response = client.send(&get("json")).unwrap();
    let echo: serde_json::Value =
        serde_json::from_slice(&response.body().full_contents()).unwrap();

    let host = base.trim_start_matches("http://");
    assert_eq!(echo["headers"]["host"][0], host);
}

#[test]
fn factory_json_request_round_trips() {
    let base = start_server();
    let request = RequestFactory::new()
        .post_json(&format!("{base}/json"), &serde_json::json!({"k": "v"}))
        .unwrap();

    let response = Client::new().send(&request).unwrap();
    let echo: serde_json::Value =
        serde_json::from_slice(&response.body().full_contents()).unwrap();

    assert_eq!(echo["headers"]["content-type"][0], "application/json");
    assert_eq!(echo["body"], r#"{"k":"v"}"#);
}

#[test]
fn error_status_is_a_response_not_an_error() {
    let base = start_server();
    let response = Client::new().send(&get(&format!("{base}/nowhere"))).unwrap();

    assert_eq!(response.status_code(), 404);
    assert_eq!(response.reason_phrase(), "Not Found");
    assert!(!response.is_successful());
    assert_eq!(response.body().full_contents(), b"Endpoint not found");
}

#[test]
fn response_body_stream_is_rewindable() {
    let base = start_server();
    let response = Client::new().send(&get(&format!("{base}/ping"))).unwrap();

    assert_eq!(response.body().full_contents(), b"pong");
    // A second full read sees the same bytes again.
    assert_eq!(response.body().full_contents(), b"pong");
}

#[test]
fn redirects_are_followed_by_default() {
    let base = start_server();
    let response = Client::new().send(&get(&format!("{base}/redirect"))).unwrap();

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.body().full_contents(), b"pong");
}

#[test]
fn redirects_can_be_disabled_per_call() {
    let base = start_server();
    let options = TransportOptions {
        follow_redirects: Some(false),
        ..TransportOptions::default()
    };

    let response = Client::new()
        .send_with(&get(&format!("{base}/redirect")), &options)
        .unwrap();

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), ["/ping"]);
}

#[test]
fn refused_connection_is_a_network_error_carrying_the_request() {
    // Bind then drop to find a port with nothing listening.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{port}/x");
    let request = get(&url);

    let err = Client::new().send(&request).unwrap_err();
    assert_eq!(err.network_kind(), Some(NetworkErrorKind::Connect));

    let attached = err.request().unwrap();
    assert_eq!(attached.method(), request.method());
    assert_eq!(attached.uri(), request.uri());
}

#[test]
fn unresolvable_host_is_a_dns_error() {
    let err = Client::new()
        .send(&get("http://no-such-host.invalid/"))
        .unwrap_err();
    assert_eq!(err.network_kind(), Some(NetworkErrorKind::Dns));
}

#[test]
fn slow_response_times_out() {
    let base = start_server();
    let options = TransportOptions {
        timeout: Some(Duration::from_millis(250)),
        ..TransportOptions::default()
    };

    let err = Client::new()
        .send_with(&get(&format!("{base}/sleep?s=2")), &options)
        .unwrap_err();

    assert_eq!(err.network_kind(), Some(NetworkErrorKind::Timeout));
    assert!(matches!(err, ClientError::Network { .. }));
}

#[test]
fn per_call_method_override_wins_over_the_request() {
    let base = start_server();
    let options = TransportOptions {
        method: Some("DELETE".to_string()),
        ..TransportOptions::default()
    };

    let response = Client::new()
        .send_with(&get(&format!("{base}/json")), &options)
        .unwrap();
    let echo: serde_json::Value =
        serde_json::from_slice(&response.body().full_contents()).unwrap();

    assert_eq!(echo["method"], "DELETE");
}

#[test]
fn per_call_raw_body_override_wins_over_the_message_body() {
    let base = start_server();
    let request = Request::new(Method::Post, Uri::parse(&format!("{base}/json")).unwrap())
        .with_body(Body::from("from the message"));
    let options = TransportOptions {
        body: Some(b"from the override".to_vec()),
        ..TransportOptions::default()
    };

    let response = Client::new().send_with(&request, &options).unwrap();
    let echo: serde_json::Value =
        serde_json::from_slice(&response.body().full_contents()).unwrap();

    assert_eq!(echo["body"], "from the override");
}
