//! HTTP surface of the host: one `POST` endpoint answering with an event stream.

use crate::dispatch::Dispatcher;
use crate::error::HostError;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, Sse},
    },
    routing::post,
};
use bytes::Bytes;
use serde_json::Value;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use sundial_config::ServerConfig;
use sundial_types::{
    INTERNAL_ERROR, INVALID_REQUEST, IncomingMessage, JsonRpcResponse, PARSE_ERROR,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Build the router. `path` and its trailing-slash twin both accept requests.
pub fn router(dispatcher: Arc<Dispatcher>, path: &str) -> Router {
    let mut app = Router::new().route(path, post(handle_post));
    let trimmed = path.trim_end_matches('/');
    let twin = if path.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    if !twin.is_empty() && twin != path {
        app = app.route(&twin, post(handle_post));
    }
    app.layer(TraceLayer::new_for_http()).with_state(dispatcher)
}

/// Bind the configured address and serve until ctrl-c.
pub async fn serve(dispatcher: Dispatcher, config: &ServerConfig) -> Result<(), HostError> {
    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|e| HostError::Bind {
            addr: config.bind.to_string(),
            source: e,
        })?;
    serve_with_listener(listener, dispatcher, &config.path, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown signal received");
    })
    .await
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve_with_listener<F>(
    listener: TcpListener,
    dispatcher: Dispatcher,
    path: &str,
    shutdown: F,
) -> Result<(), HostError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(
        "Serving {} tool(s) on http://{addr}{path}",
        dispatcher.registry().len()
    );
    axum::serve(listener, router(Arc::new(dispatcher), path))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn handle_post(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !header_contains(&headers, header::CONTENT_TYPE, &["application/json"]) {
        return rejection(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Value::Null,
            INVALID_REQUEST,
            "Content-Type must be application/json",
        );
    }
    if !header_contains(
        &headers,
        header::ACCEPT,
        &["application/json", "text/event-stream"],
    ) {
        return rejection(
            StatusCode::NOT_ACCEPTABLE,
            Value::Null,
            INVALID_REQUEST,
            "Client must accept both application/json and text/event-stream",
        );
    }

    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return rejection(
                StatusCode::BAD_REQUEST,
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {e}"),
            );
        }
    };
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let msg: IncomingMessage = match serde_json::from_value(value) {
        Ok(m) => m,
        Err(e) => {
            return rejection(
                StatusCode::BAD_REQUEST,
                id,
                INVALID_REQUEST,
                format!("Invalid request: {e}"),
            );
        }
    };

    match dispatcher.handle(msg).await {
        None => StatusCode::ACCEPTED.into_response(),
        Some(resp) => single_frame(&resp),
    }
}

/// Wrap one response envelope as a single `message` event.
fn single_frame(resp: &JsonRpcResponse) -> Response {
    match Event::default().event("message").json_data(resp) {
        Ok(event) => {
            let stream = futures_util::stream::once(async move { Ok::<_, Infallible>(event) });
            Sse::new(stream).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to encode response frame: {e}");
            rejection(
                StatusCode::INTERNAL_SERVER_ERROR,
                resp.id.clone(),
                INTERNAL_ERROR,
                "Internal error",
            )
        }
    }
}

fn rejection(status: StatusCode, id: Value, code: i64, message: impl Into<String>) -> Response {
    let message = message.into();
    tracing::debug!("Rejecting request ({status}): {message}");
    (status, Json(JsonRpcResponse::failure(id, code, message))).into_response()
}

/// Whether the header value mentions every one of `needles`.
fn header_contains(headers: &HeaderMap, name: header::HeaderName, needles: &[&str]) -> bool {
    let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let value = value.to_ascii_lowercase();
    needles.iter().all(|n| value.contains(n))
}
