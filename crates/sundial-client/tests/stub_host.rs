//! Client behavior against a stub host that writes canned HTTP responses.

use serde_json::Value;
use sundial_client::{ACCEPT_HEADER, ClientError, FrameError, McpHttpClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// What the stub saw in the request.
struct Captured {
    head: String,
    body: Value,
}

/// Read one HTTP request off `socket`, returning its head and JSON body.
async fn read_request(socket: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let (head, body) = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(pos) = text.find("\r\n\r\n") {
            let head = text[..pos].to_string();
            let length: usize = head
                .lines()
                .find_map(|l| {
                    let (k, v) = l.split_once(':')?;
                    k.eq_ignore_ascii_case("content-length")
                        .then(|| v.trim().parse().ok())?
                })
                .unwrap_or(0);
            if buf.len() >= pos + 4 + length {
                break (head, buf[pos + 4..pos + 4 + length].to_vec());
            }
        }
        assert!(n > 0, "connection closed before full request");
    };
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    Captured { head, body }
}

/// Serve `count` requests, one connection each. `respond` builds the raw
/// HTTP response from the parsed request body.
async fn stub<F>(count: usize, respond: F) -> (String, tokio::task::JoinHandle<Vec<Captured>>)
where
    F: Fn(&Value) -> String + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/mcp", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let mut seen = Vec::with_capacity(count);
        for _ in 0..count {
            let (mut socket, _) = listener.accept().await.unwrap();
            let captured = read_request(&mut socket).await;
            let response = respond(&captured.body);
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            seen.push(captured);
        }
        seen
    });
    (url, handle)
}

/// Serve exactly one request.
async fn stub_once<F>(respond: F) -> (String, tokio::task::JoinHandle<Captured>)
where
    F: Fn(&Value) -> String + Send + 'static,
{
    let (url, handle) = stub(1, respond).await;
    let handle = tokio::spawn(async move { handle.await.unwrap().remove(0) });
    (url, handle)
}

/// Accept one request and never answer it.
async fn stub_silent() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/mcp", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(socket);
    });
    url
}

fn echo_id_response(req: &Value) -> String {
    sse_response(&format!(
        r#"{{"jsonrpc":"2.0","id":{},"result":{{}}}}"#,
        req["id"]
    ))
}

fn http_response(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn sse_response(payload: &str) -> String {
    http_response(
        "200 OK",
        "text/event-stream",
        &format!("event: message\r\ndata: {payload}\r\n\r\n"),
    )
}

#[tokio::test]
async fn request_envelope_and_headers_match_wire_contract() {
    let (url, handle) = stub_once(|req| {
        sse_response(&format!(
            r#"{{"jsonrpc":"2.0","id":{},"result":{{"tools":[]}}}}"#,
            req["id"]
        ))
    })
    .await;

    let client = McpHttpClient::new(url).unwrap();
    let value = client.send("tools/list", None).await.unwrap();
    assert_eq!(value["result"]["tools"], serde_json::json!([]));

    let captured = handle.await.unwrap();
    assert!(captured.head.starts_with("POST /mcp "));
    let head = captured.head.to_ascii_lowercase();
    assert!(head.contains(&format!("accept: {ACCEPT_HEADER}")));
    assert!(head.contains("content-type: application/json"));
    assert_eq!(captured.body["jsonrpc"], "2.0");
    assert_eq!(captured.body["method"], "tools/list");
    assert_eq!(captured.body["params"], serde_json::json!({}));
    assert!(captured.body["id"].is_u64());
}

#[tokio::test]
async fn body_without_data_line_is_error_value() {
    let (url, _handle) =
        stub_once(|_| http_response("200 OK", "text/event-stream", "event: message\r\n\r\n")).await;
    let client = McpHttpClient::new(url).unwrap();
    let err = client.send("tools/list", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Frame(FrameError::NoData)));
    assert_eq!(
        err.to_value(),
        serde_json::json!({"error": "No data found in SSE response"})
    );
}

#[tokio::test]
async fn non_success_status_shares_the_error_channel() {
    let (url, _handle) = stub_once(|_| {
        http_response(
            "406 Not Acceptable",
            "application/json",
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32600,"message":"nope"}}"#,
        )
    })
    .await;
    let client = McpHttpClient::new(url).unwrap();
    let err = client.send("tools/list", None).await.unwrap_err();
    match err {
        ClientError::Status { status, ref body } => {
            assert_eq!(status, 406);
            assert!(body.contains("nope"));
        }
        other => panic!("Expected Status, got: {other:?}"),
    }
}

#[tokio::test]
async fn mismatched_id_is_rejected() {
    let (url, _handle) =
        stub_once(|_| sse_response(r#"{"jsonrpc":"2.0","id":9999,"result":{}}"#)).await;
    let client = McpHttpClient::new(url).unwrap();
    let err = client.send("ping", None).await.unwrap_err();
    assert!(matches!(err, ClientError::IdMismatch { expected: 1, .. }));
}

#[tokio::test]
async fn rpc_error_member_surfaces_through_request() {
    let (url, _handle) = stub_once(|req| {
        sse_response(&format!(
            r#"{{"jsonrpc":"2.0","id":{},"error":{{"code":-32601,"message":"Method not found: nope"}}}}"#,
            req["id"]
        ))
    })
    .await;
    let client = McpHttpClient::new(url).unwrap();
    let err = client.request("nope", None).await.unwrap_err();
    match err {
        ClientError::JsonRpc { code, message } => {
            assert_eq!(code, -32601);
            assert!(message.contains("nope"));
        }
        other => panic!("Expected JsonRpc, got: {other:?}"),
    }
}

#[tokio::test]
async fn call_tool_parses_content_blocks() {
    let (url, handle) = stub_once(|req| {
        sse_response(&format!(
            r#"{{"jsonrpc":"2.0","id":{},"result":{{"content":[{{"type":"text","text":"The weather in Lima will be warm and sunny"}}],"isError":false}}}}"#,
            req["id"]
        ))
    })
    .await;
    let client = McpHttpClient::new(url).unwrap();
    let output = client
        .call_tool("get_forecast", serde_json::json!({"city": "Lima"}))
        .await
        .unwrap();
    assert!(!output.is_error);
    assert_eq!(
        output.first_text(),
        Some("The weather in Lima will be warm and sunny")
    );

    let captured = handle.await.unwrap();
    assert_eq!(captured.body["method"], "tools/call");
    assert_eq!(captured.body["params"]["name"], "get_forecast");
    assert_eq!(captured.body["params"]["arguments"]["city"], "Lima");
}

#[tokio::test]
async fn mixed_content_blocks_keep_text() {
    let (url, _handle) = stub_once(|req| {
        sse_response(&format!(
            r#"{{"jsonrpc":"2.0","id":{},"result":{{"content":[{{"type":"text","text":"Rain later"}},{{"type":"image","data":"aGk=","mimeType":"image/png"}}],"isError":false}}}}"#,
            req["id"]
        ))
    })
    .await;
    let client = McpHttpClient::new(url).unwrap();
    let output = client
        .call_tool("get_forecast", serde_json::json!({"city": "Lima"}))
        .await
        .unwrap();
    assert_eq!(output.content.len(), 2);
    assert_eq!(output.texts(), vec!["Rain later"]);
}

#[tokio::test]
async fn consecutive_requests_carry_increasing_ids() {
    let (url, handle) = stub(2, echo_id_response).await;
    let client = McpHttpClient::new(url).unwrap();
    let first = client.send("ping", None).await.unwrap();
    let second = client.send("ping", None).await.unwrap();
    assert_eq!(first["id"], 1);
    assert_eq!(second["id"], 2);

    let captured = handle.await.unwrap();
    let ids: Vec<&Value> = captured.iter().map(|c| &c.body["id"]).collect();
    assert_eq!(ids, vec![&serde_json::json!(1), &serde_json::json!(2)]);
}

#[tokio::test]
async fn silent_host_times_out() {
    let url = stub_silent().await;
    let client = McpHttpClient::with_timeout(url, Some(Duration::from_millis(50))).unwrap();
    let err = client.send("tools/list", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout), "got {err:?}");
    assert_eq!(
        err.to_value(),
        serde_json::json!({"error": "Request timed out"})
    );
}
