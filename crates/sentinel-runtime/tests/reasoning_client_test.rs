//! HTTP reasoning client against a one-shot local server.

use std::time::Duration;

use sentinel_core::errors::ReasoningError;
use sentinel_core::traits::{ReasoningPrompt, ReasoningService};
use sentinel_runtime::{HttpReasoningClient, ReasoningClientConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one request with `status` and `body`; the handle yields the raw
/// request (head and body).
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/v1/messages", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });
    (endpoint, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn client(endpoint: String, timeout: Duration) -> HttpReasoningClient {
    HttpReasoningClient::new(ReasoningClientConfig {
        endpoint,
        model: "test-model".into(),
        api_key: Some("secret".into()),
        request_timeout: timeout,
    })
    .unwrap()
}

fn prompt() -> ReasoningPrompt {
    ReasoningPrompt {
        system: "You are an analyst.".into(),
        user: "Assess the spike.".into(),
        max_tokens: 256,
        temperature: 0.2,
    }
}

/// TS-RC-01: text blocks are joined; the request carries model, prompt, and key.
#[tokio::test]
async fn test_success_joins_text_blocks() {
    let (endpoint, server) = serve_once(
        "200 OK",
        r#"{"content":[{"type":"text","text":"first"},{"type":"tool_use"},{"type":"text","text":"second"}]}"#,
    )
    .await;
    let reply = client(endpoint, Duration::from_secs(5)).complete(&prompt()).await.unwrap();
    assert_eq!(reply, "first\nsecond");

    let request = server.await.unwrap();
    let lower = request.to_lowercase();
    assert!(request.starts_with("POST /v1/messages"));
    assert!(lower.contains("x-api-key: secret"));
    assert!(lower.contains("anthropic-version: 2023-06-01"));
    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["model"], "test-model");
    assert_eq!(json["max_tokens"], 256);
    assert_eq!(json["system"], "You are an analyst.");
    assert_eq!(json["messages"][0]["role"], "user");
    assert_eq!(json["messages"][0]["content"], "Assess the spike.");
}

/// TS-RC-02: client errors are permanent.
#[tokio::test]
async fn test_bad_request_is_permanent() {
    let (endpoint, _server) = serve_once("400 Bad Request", r#"{"error":"bad prompt"}"#).await;
    let err = client(endpoint, Duration::from_secs(5)).complete(&prompt()).await.unwrap_err();
    match err {
        ReasoningError::Permanent(message) => assert!(message.contains("400")),
        other => panic!("expected permanent error, got {other:?}"),
    }
}

/// TS-RC-03: rate limiting and server errors are retryable.
#[tokio::test]
async fn test_server_errors_are_transient() {
    for status in ["503 Service Unavailable", "429 Too Many Requests"] {
        let (endpoint, _server) = serve_once(status, "{}").await;
        let err = client(endpoint, Duration::from_secs(5)).complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, ReasoningError::Transient(_)), "{status}: {err:?}");
        assert!(err.is_retryable());
    }
}

/// TS-RC-04: an unparseable success body is permanent.
#[tokio::test]
async fn test_malformed_body_is_permanent() {
    let (endpoint, _server) = serve_once("200 OK", "not json").await;
    let err = client(endpoint, Duration::from_secs(5)).complete(&prompt()).await.unwrap_err();
    assert!(matches!(err, ReasoningError::Permanent(_)));
}

/// TS-RC-05: a server that never answers times out.
#[tokio::test]
async fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/v1/messages", listener.local_addr().unwrap());
    let _server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });
    let err = client(endpoint, Duration::from_millis(100)).complete(&prompt()).await.unwrap_err();
    assert!(matches!(err, ReasoningError::Timeout { timeout_ms: 100 }));
}

/// TS-RC-06: nothing listening is a transient transport failure.
#[tokio::test]
async fn test_connection_refused_is_transient() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/v1/messages", listener.local_addr().unwrap());
    drop(listener);
    let err = client(endpoint, Duration::from_secs(2)).complete(&prompt()).await.unwrap_err();
    assert!(matches!(err, ReasoningError::Transient(_)));
}
