//! Development server with full reload via Server-Sent Events.
//!
//! Serves the project root from disk, maps alias prefixes such as
//! `/_framework` onto the .NET output and injects the reload client into
//! HTML pages.

use crate::dev::{DevConfig, DevEvent, Lookup, SharedState};
use crate::error::{CliError, Result};
use axum::{
    Router,
    body::Body,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response, Sse, sse::Event, sse::KeepAlive},
    routing::get,
};
use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

const RELOAD_SCRIPT: &str = include_str!("../../assets/dev/reload-client.js");
const RELOAD_SCRIPT_TAG: &str = r#"<script src="/__fob_reload__.js"></script>"#;

/// Development server.
pub struct DevServer {
    config: DevConfig,
    state: SharedState,
}

impl DevServer {
    pub fn new(config: DevConfig, state: SharedState) -> Self {
        Self { config, state }
    }

    /// Run until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns error if server cannot bind to configured address
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        serve(listener, self.state, shutdown).await
    }
}

/// Serve `state` on an already bound listener.
pub async fn serve<F>(listener: TcpListener, state: SharedState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CliError::Server(format!("Server error: {}", e)))
}

/// Build the axum router with all routes.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/__fob_sse__", get(handle_sse))
        .route("/__fob_reload__.js", get(handle_reload_script))
        .fallback(handle_request)
        .layer(
            // CORS: Allow all origins for dev
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Handle SSE connections for reload events.
async fn handle_sse(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (id, rx) = state.register_client();
    debug!("SSE client {} connected", id);

    state.broadcast(&DevEvent::ClientConnected { id });

    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// Serve the reload client script.
async fn handle_reload_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        RELOAD_SCRIPT,
    )
}

/// Serve files from the root, alias targets, or report 403/404.
async fn handle_request(State(state): State<SharedState>, uri: Uri) -> Response {
    let path = uri.path();

    let file_path = match state.lookup(path) {
        Lookup::File(file_path) => file_path,
        Lookup::Forbidden => {
            return plain(StatusCode::FORBIDDEN, format!("Access denied: {}", path));
        }
        Lookup::NotFound => {
            return plain(StatusCode::NOT_FOUND, format!("File not found: {}", path));
        }
    };

    let content = match tokio::fs::read(&file_path).await {
        Ok(content) => content,
        Err(e) => {
            crate::ui::warning(&format!(
                "Failed to read file {}: {}",
                file_path.display(),
                e
            ));
            return plain(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read {}", path),
            );
        }
    };

    let content_type = determine_content_type(&file_path.to_string_lossy());
    let body = inject_reload_script(&content, content_type);

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from(body),
    )
        .into_response()
}

fn plain(status: StatusCode, message: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}

/// Inject reload script into HTML content.
///
/// Adds the reload client script before the closing </body> tag.
fn inject_reload_script(content: &[u8], content_type: &str) -> Vec<u8> {
    if !content_type.starts_with("text/html") {
        return content.to_vec();
    }

    let html = String::from_utf8_lossy(content);

    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + RELOAD_SCRIPT_TAG.len() + 10);
        result.push_str(&html[..pos]);
        result.push_str("\n  ");
        result.push_str(RELOAD_SCRIPT_TAG);
        result.push('\n');
        result.push_str(&html[pos..]);
        return result.into_bytes();
    }

    let mut result = html.into_owned();
    result.push('\n');
    result.push_str(RELOAD_SCRIPT_TAG);
    result.into_bytes()
}

/// Determine content type from file extension.
fn determine_content_type(path: &str) -> &'static str {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match extension {
        "wasm" => "application/wasm",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "txt" => "text/plain; charset=utf-8",
        // .dll, .pdb, .dat and .blat runtime payloads
        _ => "application/octet-stream",
    }
}
