//! Client tests against a mock chat-completion endpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use v0_mcp::config::ClientSettings;
use v0_mcp::dispatch::http::V0Client;
use v0_mcp::dispatch::{GenerationRequest, ImageInput, ImageKind};
use v0_mcp::error::V0Error;

/// Helper: bind a TCP listener on localhost and return (listener, port).
async fn mock_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn client_for(port: u16) -> V0Client {
    let settings = ClientSettings::default()
        .with_base_url(format!("http://127.0.0.1:{port}/v1"))
        .with_backoff_step(Duration::from_millis(10));
    V0Client::new("test-key", settings)
}

/// Reads one HTTP request (headers + Content-Length body) and returns
/// (head, body).
async fn read_request(socket: &mut TcpStream) -> (String, String) {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(end) = find_header_end(&data) {
            let head = String::from_utf8_lossy(&data[..end]).to_string();
            let len = content_length(&head);
            while data.len() < end + 4 + len {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                data.extend_from_slice(&buf[..n]);
            }
            let body = String::from_utf8_lossy(&data[end + 4..]).to_string();
            return (head, body);
        }
    }
    (String::from_utf8_lossy(&data).to_string(), String::new())
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|l| {
            let (k, v) = l.split_once(':')?;
            if k.eq_ignore_ascii_case("content-length") {
                v.trim().parse().ok()
            } else {
                None
            }
        })
        .unwrap_or(0)
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn completion(content: &str) -> String {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
        "usage": {"total_tokens": 10}
    })
    .to_string()
}

const COMPONENT: &str = "```tsx\nexport default function Hero() {\n  return <section />\n}\n```";

/// Serves `responses` in order, one per connection, recording each request
/// body. Returns the connection counter and the recorded bodies.
/// (head, body) of every request the mock server received.
type Requests = Arc<Mutex<Vec<(String, String)>>>;

fn serve(listener: TcpListener, responses: Vec<String>) -> (Arc<AtomicUsize>, Requests) {
    let count = Arc::new(AtomicUsize::new(0));
    let seen: Requests = Arc::new(Mutex::new(Vec::new()));
    let (c, s) = (count.clone(), seen.clone());

    tokio::spawn(async move {
        for response in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            c.fetch_add(1, Ordering::SeqCst);
            let request = read_request(&mut socket).await;
            s.lock().await.push(request);
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (count, seen)
}

// ---------------------------------------------------------------------------
// Request shape and defaults
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_sends_one_post_with_defaults() {
    let (listener, port) = mock_listener().await;
    let (count, seen) = serve(listener, vec![http_response("200 OK", &completion(COMPONENT))]);

    let client = client_for(port);
    let resp = client
        .generate(&GenerationRequest::new("a hero section"))
        .await
        .unwrap();

    assert_eq!(resp.code, "export default function Hero() {\n  return <section />\n}");
    assert_eq!(resp.metadata.name, "Hero");
    assert_eq!(count.load(Ordering::SeqCst), 1);

    let seen = seen.lock().await;
    let (head, body) = &seen[0];
    assert!(head.starts_with("POST /v1/chat/completions"));
    assert!(head.to_lowercase().contains("authorization: bearer test-key"));

    let body: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(body["model"], "v0-1.5-md");
    assert_eq!(body["temperature"], 0.7);
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "a hero section");
    assert!(body.get("max_tokens").is_none());
}

#[tokio::test]
async fn explicit_temperature_is_sent() {
    let (listener, port) = mock_listener().await;
    let (_, seen) = serve(listener, vec![http_response("200 OK", &completion(COMPONENT))]);

    client_for(port)
        .generate(&GenerationRequest::new("x").with_temperature(1.5))
        .await
        .unwrap();

    let seen = seen.lock().await;
    let body: serde_json::Value = serde_json::from_str(&seen[0].1).unwrap();
    assert_eq!(body["temperature"], 1.5);
}

#[tokio::test]
async fn empty_prompt_fails_without_network_call() {
    let (listener, port) = mock_listener().await;
    let (count, _) = serve(listener, vec![http_response("200 OK", &completion(COMPONENT))]);

    let err = client_for(port)
        .generate(&GenerationRequest::new("   \n"))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_image_kind_fails_without_network_call() {
    let (listener, port) = mock_listener().await;
    let (count, _) = serve(listener, vec![http_response("200 OK", &completion(COMPONENT))]);

    let images = vec![
        ImageInput {
            data: "iVBORw0KGgo".to_string(),
            kind: ImageKind::Wireframe,
            description: None,
        },
        ImageInput {
            data: "iVBORw0KGgo".to_string(),
            kind: ImageKind::Screenshot,
            description: None,
        },
        ImageInput {
            data: "iVBORw0KGgo".to_string(),
            kind: ImageKind::from("sketch"),
            description: None,
        },
    ];
    let err = client_for(port)
        .generate_multimodal(&GenerationRequest::new("build it").with_images(images))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(err.to_string().starts_with("Image 3 has invalid type \"sketch\""));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn multimodal_request_carries_image_parts() {
    let (listener, port) = mock_listener().await;
    let (_, seen) = serve(listener, vec![http_response("200 OK", &completion(COMPONENT))]);

    let images = vec![ImageInput {
        data: "/9j/4AAQSkZJRg".to_string(),
        kind: ImageKind::Design,
        description: None,
    }];
    client_for(port)
        .generate_multimodal(&GenerationRequest::new("from design").with_images(images))
        .await
        .unwrap();

    let seen = seen.lock().await;
    let body: serde_json::Value = serde_json::from_str(&seen[0].1).unwrap();
    let parts = body["messages"][0]["content"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[1]["image_url"]["detail"], "auto");
    assert_eq!(
        parts[1]["image_url"]["url"],
        "data:image/jpeg;base64,/9j/4AAQSkZJRg"
    );
}

// ---------------------------------------------------------------------------
// Response validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn prose_answer_is_not_a_component() {
    let (listener, port) = mock_listener().await;
    serve(
        listener,
        vec![http_response("200 OK", &completion("plain prose with no code markers"))],
    );

    let err = client_for(port)
        .generate(&GenerationRequest::new("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, V0Error::MalformedResponse(_)));
    assert!(err.to_string().contains("valid React component"));
}

#[tokio::test]
async fn prose_answer_is_fine_for_complete() {
    let (listener, port) = mock_listener().await;
    serve(
        listener,
        vec![http_response("200 OK", &completion("1. VISUAL COMPONENT HIERARCHY:"))],
    );

    let text = client_for(port)
        .complete(&GenerationRequest::new("analyze"))
        .await
        .unwrap();
    assert_eq!(text, "1. VISUAL COMPONENT HIERARCHY:");
}

#[tokio::test]
async fn empty_choices_are_malformed() {
    let (listener, port) = mock_listener().await;
    serve(listener, vec![http_response("200 OK", r#"{"choices":[]}"#)]);

    let err = client_for(port)
        .generate(&GenerationRequest::new("x"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("missing or empty choices array"));
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let (listener, port) = mock_listener().await;
    serve(
        listener,
        vec![http_response("401 Unauthorized", r#"{"error":"invalid key"}"#)],
    );

    let err = client_for(port)
        .generate(&GenerationRequest::new("x"))
        .await
        .unwrap_err();
    assert!(err.is_auth());
    assert!(err.to_string().contains("V0_API_KEY"));
    assert!(!err.to_string().contains("test-key"));
}

#[tokio::test]
async fn multimodal_payload_too_large_is_validation() {
    let (listener, port) = mock_listener().await;
    serve(
        listener,
        vec![http_response("413 Payload Too Large", "too big")],
    );

    let images = vec![ImageInput {
        data: "iVBORw0KGgo".to_string(),
        kind: ImageKind::Screenshot,
        description: None,
    }];
    let err = client_for(port)
        .generate_multimodal(&GenerationRequest::new("x").with_images(images))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("compress images"));
}

#[tokio::test]
async fn bad_request_carries_provider_message() {
    let (listener, port) = mock_listener().await;
    serve(
        listener,
        vec![http_response(
            "400 Bad Request",
            r#"{"error":{"message":"model not found"}}"#,
        )],
    );

    let err = client_for(port)
        .generate(&GenerationRequest::new("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, V0Error::Upstream { status: 400, .. }));
    assert!(err.to_string().contains("model not found"));
}

// ---------------------------------------------------------------------------
// Retry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn auth_error_is_not_retried() {
    let (listener, port) = mock_listener().await;
    let (count, _) = serve(
        listener,
        vec![
            http_response("401 Unauthorized", "nope"),
            http_response("200 OK", &completion(COMPONENT)),
        ],
    );

    let err = client_for(port)
        .generate_with_retry(&GenerationRequest::new("x"))
        .await
        .unwrap_err();
    assert!(err.is_auth());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn server_errors_then_success_makes_three_calls() {
    let (listener, port) = mock_listener().await;
    let (count, _) = serve(
        listener,
        vec![
            http_response("500 Internal Server Error", "boom"),
            http_response("503 Service Unavailable", "busy"),
            http_response("200 OK", &completion(COMPONENT)),
        ],
    );

    let resp = client_for(port)
        .generate_with_retry(&GenerationRequest::new("x"))
        .await
        .unwrap();
    assert_eq!(resp.metadata.name, "Hero");
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_retries_return_last_error() {
    let (listener, port) = mock_listener().await;
    let (count, _) = serve(
        listener,
        vec![
            http_response("429 Too Many Requests", "slow down"),
            http_response("429 Too Many Requests", "slow down"),
            http_response("502 Bad Gateway", "gateway"),
        ],
    );

    let err = client_for(port)
        .generate_with_retry(&GenerationRequest::new("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, V0Error::Server { status: 502 }));
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn malformed_response_is_not_retried() {
    let (listener, port) = mock_listener().await;
    let (count, _) = serve(
        listener,
        vec![
            http_response("200 OK", &completion("just words")),
            http_response("200 OK", &completion(COMPONENT)),
        ],
    );

    let err = client_for(port)
        .generate_with_retry(&GenerationRequest::new("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, V0Error::MalformedResponse(_)));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Connectivity probe
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_connection_sends_minimal_request() {
    let (listener, port) = mock_listener().await;
    let (_, seen) = serve(listener, vec![http_response("200 OK", &completion("ok"))]);

    assert!(client_for(port).test_connection().await);

    let seen = seen.lock().await;
    let body: serde_json::Value = serde_json::from_str(&seen[0].1).unwrap();
    assert_eq!(body["max_tokens"], 1);
    assert_eq!(body["messages"][0]["content"], "test");
}

#[tokio::test]
async fn test_connection_reports_failure_as_false() {
    let (listener, port) = mock_listener().await;
    serve(listener, vec![http_response("401 Unauthorized", "nope")]);
    assert!(!client_for(port).test_connection().await);
}

#[tokio::test]
async fn test_connection_against_closed_port_is_false() {
    let (listener, port) = mock_listener().await;
    drop(listener);
    assert!(!client_for(port).test_connection().await);
}
