//! Streaming generation against a mock SSE endpoint.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use v0_mcp::config::ClientSettings;
use v0_mcp::dispatch::http::V0Client;
use v0_mcp::dispatch::{GenerationRequest, StreamingResponse};
use v0_mcp::error::V0Error;

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

/// Serves one SSE response. The body is written in the given pieces with a
/// short pause between them so the client sees several reads.
fn serve_sse(listener: TcpListener, pieces: Vec<String>) {
    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut buf = [0u8; 8192];
        let _ = socket.read(&mut buf).await;

        let header = "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n";
        let _ = socket.write_all(header.as_bytes()).await;
        for piece in pieces {
            let _ = socket.write_all(piece.as_bytes()).await;
            let _ = socket.flush().await;
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let _ = socket.shutdown().await;
    });
}

fn serve_status(listener: TcpListener, status: &'static str, body: &'static str) {
    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut buf = [0u8; 8192];
        let _ = socket.read(&mut buf).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });
}

fn done() -> String {
    "data: [DONE]\n\n".to_string()
}

fn delta(text: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"choices": [{"delta": {"content": text}}]})
    )
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chunk_then_done_yields_two_items() {
    let (listener, port) = mock_listener().await;
    let first = delta("Hi");
    serve_sse(listener, vec![first, done()]);

    let stream = client_for(port)
        .stream_generate(&GenerationRequest::new("x"))
        .await
        .unwrap();
    let items: Vec<StreamingResponse> = stream.map(|r| r.unwrap()).collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].chunk, "Hi");
    assert_eq!(items[0].progress, 5);
    assert!(!items[0].complete);
    assert_eq!(items[1], StreamingResponse::terminal());
}

#[tokio::test]
async fn event_split_across_writes_is_reassembled() {
    let (listener, port) = mock_listener().await;
    serve_sse(
        listener,
        vec![
            "data: {\"choices\":[{\"del".into(),
            "ta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n".into(),
            "\ndata: [DONE]\n\n".into(),
        ],
    );

    let text = client_for(port)
        .collect_stream(&GenerationRequest::new("x"))
        .await
        .unwrap();
    assert_eq!(text, "Hello");
}

#[tokio::test]
async fn unparsable_events_are_skipped() {
    let (listener, port) = mock_listener().await;
    let ok = delta("ok");
    serve_sse(
        listener,
        vec![": keepalive\n\n".into(), "data: not-json\n\n".into(), ok, done()],
    );

    let stream = client_for(port)
        .stream_generate(&GenerationRequest::new("x"))
        .await
        .unwrap();
    let items: Vec<StreamingResponse> = stream.map(|r| r.unwrap()).collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].chunk, "ok");
    assert!(items[1].complete);
}

#[tokio::test]
async fn streaming_complete_collects_component_text() {
    let (listener, port) = mock_listener().await;
    let a = delta("```tsx\nexport default function Card() {");
    let b = delta("\n  return <div />\n}\n```");
    serve_sse(listener, vec![a, b, done()]);

    let resp = client_for(port)
        .generate(&GenerationRequest::new("x").with_stream(true))
        .await
        .unwrap();
    assert_eq!(resp.metadata.name, "Card");
    assert!(resp.code.starts_with("export default function Card()"));
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stream_without_done_ends_in_error() {
    let (listener, port) = mock_listener().await;
    let partial = delta("partial");
    serve_sse(listener, vec![partial]);

    let stream = client_for(port)
        .stream_generate(&GenerationRequest::new("x"))
        .await
        .unwrap();
    let items: Vec<Result<StreamingResponse, V0Error>> = stream.collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().chunk, "partial");
    let err = items[1].as_ref().unwrap_err();
    assert!(matches!(err, V0Error::MalformedResponse(_)));
    assert!(err.to_string().contains("ended before completion"));
}

#[tokio::test]
async fn collect_stream_propagates_truncation() {
    let (listener, port) = mock_listener().await;
    let partial = delta("partial");
    serve_sse(listener, vec![partial]);

    let err = client_for(port)
        .collect_stream(&GenerationRequest::new("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, V0Error::MalformedResponse(_)));
}

#[tokio::test]
async fn non_success_status_fails_before_streaming() {
    let (listener, port) = mock_listener().await;
    serve_status(listener, "401 Unauthorized", "{\"error\":\"bad key\"}");

    let err = client_for(port)
        .stream_generate(&GenerationRequest::new("x"))
        .await
        .err()
        .unwrap();
    assert!(err.is_auth());
}

#[tokio::test]
async fn empty_stream_body_is_malformed() {
    let (listener, port) = mock_listener().await;
    serve_status(listener, "200 OK", "");

    let err = client_for(port)
        .stream_generate(&GenerationRequest::new("x"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, V0Error::MalformedResponse(_)));
}

#[tokio::test]
async fn empty_prompt_never_opens_a_stream() {
    let err = client_for(1)
        .stream_generate(&GenerationRequest::new(""))
        .await
        .err()
        .unwrap();
    assert!(err.is_validation());
}
