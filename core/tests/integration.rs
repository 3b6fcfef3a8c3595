//! Facade tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `HttpClient` with the
//! real `UreqInvoker` so content-type injection, body sniffing, header
//! listing and status policy are checked over actual HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use http_facade::{ClientConfig, ClientError, HttpClient};
use mock_server::Widget;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
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

    addr
}

fn client(addr: SocketAddr) -> HttpClient {
    HttpClient::new(ClientConfig::default().with_base_url(format!("http://{addr}/")))
}

#[test]
fn widget_lifecycle() {
    let client = client(start_server());

    // create: text payload goes out as JSON
    let created = client.post("widgets", r#"{"name":"Sprocket"}"#).unwrap();
    assert_eq!(created.status_code(), 201);
    assert_eq!(created.status_text(), Some("Created"));
    let widget: Widget = created.json().unwrap();
    assert_eq!(widget.name, "Sprocket");
    assert!(created.bytes().is_none());

    // get
    let fetched = client.get(&format!("widgets/{}", widget.id)).unwrap();
    assert_eq!(fetched.json::<Widget>().unwrap(), widget);
    assert_eq!(fetched.header("content-type"), Some("application/json"));
    assert_eq!(
        fetched.content_length(),
        fetched.text().unwrap().chars().count() as i64
    );

    // put replaces
    let updated = client
        .put(&format!("widgets/{}", widget.id), r#"{"name":"Gear"}"#)
        .unwrap();
    assert_eq!(updated.json::<Widget>().unwrap().name, "Gear");

    // delete
    let deleted = client.delete(&format!("widgets/{}", widget.id)).unwrap();
    assert_eq!(deleted.status_code(), 204);

    // gone
    let path = format!("widgets/{}", widget.id);
    let err = client.get(&path).unwrap_err();
    match err {
        ClientError::Status {
            status_code,
            status_text,
            uri,
        } => {
            assert_eq!(status_code, 404);
            assert_eq!(status_text, "Not Found");
            assert_eq!(uri, path);
        }
        other => panic!("expected status error, got {other:?}"),
    }

    let err = client.delete(&path).unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[test]
fn bytes_round_trip_as_octet_stream() {
    let client = client(start_server());

    let payload = vec![0u8, 159, 146, 150, 255];
    let response = client.post("echo", payload.clone()).unwrap();

    assert_eq!(response.content_type(), Some("application/octet-stream"));
    assert_eq!(response.bytes(), Some(payload.as_slice()));
    assert!(response.text().is_none());
    assert_eq!(response.content_length(), payload.len() as i64);
}

#[test]
fn bodies_over_ten_mib_are_read_fully() {
    let client = client(start_server());

    let response = client.get("big/12").unwrap();
    let bytes = response.bytes().unwrap();
    assert_eq!(bytes.len(), 12 * 1024 * 1024);
    assert_eq!(bytes[1000], (1000 % 251) as u8);
    assert_eq!(response.content_length(), 12 * 1024 * 1024);
}

#[test]
fn sub_second_timeout_still_completes() {
    let addr = start_server();
    let client = HttpClient::new(
        ClientConfig::default()
            .with_base_url(format!("http://{addr}/"))
            .with_timeout(Duration::from_millis(500)),
    );

    let response = client.get("status/200").unwrap();
    assert_eq!(response.status_code(), 200);
}

#[test]
fn text_echo_is_decoded() {
    let client = client(start_server());

    let response = client.put("echo", r#"{"a":1}"#).unwrap();
    assert_eq!(response.content_type(), Some("application/json"));
    assert_eq!(response.text(), Some(r#"{"a":1}"#));
    assert!(response.bytes().is_none());
}

#[test]
fn explicit_content_type_reaches_server() {
    let client = client(start_server());

    let response = client
        .post_with_headers("echo", &[("Content-Type", "text/plain; charset=utf-8")], "héllo")
        .unwrap();
    assert_eq!(response.content_type(), Some("text/plain; charset=utf-8"));
    assert_eq!(response.text(), Some("héllo"));
    assert_eq!(response.content_length(), 5);
}

#[test]
fn repeated_headers_are_listed_in_order() {
    let client = client(start_server());

    let response = client.get("multi").unwrap();
    assert_eq!(response.headers("X-A"), vec!["v1", "v2"]);
    assert_eq!(response.header("x-a"), Some("v1"));

    let listed = response.list_headers();
    let (_, values) = listed
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("x-a"))
        .unwrap();
    assert_eq!(values, &vec!["v1".to_string(), "v2".to_string()]);
    assert_eq!(response.text(), Some("multi"));
}

#[test]
fn error_statuses_raise_for_every_method() {
    let client = client(start_server());

    assert_eq!(client.get("status/500").unwrap_err().status_code(), 500);
    assert_eq!(client.post("status/409", "{}").unwrap_err().status_code(), 409);
    assert_eq!(client.put("status/400", "{}").unwrap_err().status_code(), 400);

    let err = client.delete("status/503").unwrap_err();
    assert_eq!(err.status_code(), 503);
    assert_eq!(err.status_text(), Some("Service Unavailable"));
    assert!(err.to_string().contains("status/503"));
}

#[test]
fn success_statuses_below_300_pass() {
    let client = client(start_server());

    let response = client.get("status/202").unwrap();
    assert_eq!(response.status_code(), 202);
    assert_eq!(response.text(), Some("Accepted"));
}

#[test]
fn unreachable_server_is_a_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr).get("widgets").unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }));
    assert_eq!(err.uri(), format!("http://{addr}/widgets"));
    assert!(std::error::Error::source(&err).is_some());
}
