//! API driver round trip against a local HTTP responder
//!
//! The responder serves a scripted sequence of responses, one per
//! connection, and records the request lines it saw.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use lockstep_e2e::telemetry::init_test_logging;
use lockstep_e2e::{ApiConfig, ApiDriver, E2eError, Matcher, MentalModel, RetryPolicy, Value};

struct Responder {
    base_url: String,
    requests: mpsc::Receiver<String>,
}

/// Serve `responses` (status, JSON body) in order, one per connection
fn respond_with(responses: Vec<(u16, &'static str)>) -> Responder {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (status, body) in responses {
            let (stream, _) = match listener.accept() {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut content_length = 0usize;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let _ = tx.send(request_line.trim_end().to_string());

            let reason = if status < 400 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
    });

    Responder {
        base_url,
        requests: rx,
    }
}

fn driver(base_url: &str) -> ApiDriver {
    ApiDriver::new(&ApiConfig {
        base_url: base_url.to_string(),
        timeout_ms: 5000,
        ..Default::default()
    })
    .unwrap()
    .route("widgets", "/api/widgets")
}

fn next_request(responder: &Responder) -> String {
    responder
        .requests
        .recv_timeout(Duration::from_secs(5))
        .expect("responder saw a request")
}

#[test]
fn test_create_observe_destroy_round_trip() {
    init_test_logging();
    let responder = respond_with(vec![
        (201, r#"{"id": 7, "name": "foo"}"#),
        (200, r#"[{"id": 7, "name": "foo"}, {"id": 9, "name": "other"}]"#),
        (204, ""),
        (200, r#"[{"id": 9, "name": "other"}]"#),
    ]);
    let mut api = driver(&responder.base_url);
    let mut model = MentalModel::new();
    let policy = RetryPolicy::new(Duration::from_millis(500)).with_poll_interval(Duration::from_millis(10));

    let created = api
        .create(&mut model, "widgets", "foo", &Value::map([("name", "foo")]))
        .unwrap();
    assert_eq!(created.get("id"), Some(&Value::Int(7)));
    assert_eq!(next_request(&responder), "POST /api/widgets HTTP/1.1");
    assert_eq!(model.collection("widgets").get("foo").unwrap(), &created);

    let mut matcher = Matcher::with_policy(&mut model, "widgets", policy);
    assert!(matcher.matches(&mut api).unwrap());
    assert_eq!(next_request(&responder), "GET /api/widgets HTTP/1.1");

    let destroyed = api.destroy(&mut model, "widgets", "foo").unwrap();
    assert_eq!(destroyed, created);
    assert_eq!(next_request(&responder), "DELETE /api/widgets/7 HTTP/1.1");
    assert!(model.collection("widgets").deleted().contains_key("foo"));

    let mut matcher = Matcher::with_policy(&mut model, "widgets", policy);
    assert!(matcher.matches(&mut api).unwrap());
    assert_eq!(next_request(&responder), "GET /api/widgets HTTP/1.1");
}

#[test]
fn test_error_status_is_reported_and_model_untouched() {
    init_test_logging();
    let responder = respond_with(vec![(422, r#"{"error": "name taken"}"#)]);
    let api = driver(&responder.base_url);
    let mut model = MentalModel::new();

    let err = api
        .create(&mut model, "widgets", "foo", &Value::map([("name", "foo")]))
        .unwrap_err();

    match err {
        E2eError::Api { method, url, status } => {
            assert_eq!(method, "POST");
            assert!(url.ends_with("/api/widgets"));
            assert_eq!(status, 422);
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    assert!(model.collection("widgets").is_empty());
}
