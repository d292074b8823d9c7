//! HTTP and server-sent events transport.

use crate::catalog::ToolCatalog;
use crate::credentials::CredentialStore;
use crate::error::GatewayError;
use crate::router::MessageRouter;
use crate::rpc::{JsonRpcNotification, JsonRpcRequest, CATALOG_NOTIFICATION};
use crate::session::{Frame, SessionHandle, SessionRegistry};
use crate::Result;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{
        header::{AUTHORIZATION, CONNECTION},
        HeaderMap, Method, StatusCode,
    },
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use mapgate_core::config::Config;
use mapgate_core::id::{is_valid_session_id, session_id as new_session_id};
use mapgate_core::SecretString;
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Path clients post their messages to.
const MESSAGES_PATH: &str = "/messages";

/// Shared state behind every handler.
pub struct GatewayState {
    /// Effective configuration.
    pub config: Config,

    /// Open streams.
    pub sessions: Arc<SessionRegistry>,

    /// Credentials bound to open streams.
    pub credentials: Arc<CredentialStore>,

    /// Callable tools.
    pub catalog: Arc<ToolCatalog>,

    /// Inbound message router.
    pub router: MessageRouter,
}

impl GatewayState {
    /// Tear down a session: its stream first, then its credential.
    ///
    /// Closing the stream first means any request that still finds the
    /// credential also finds the session gone on its second look.
    pub fn teardown(&self, session_id: &str) {
        self.sessions.close(session_id);
        self.credentials.remove(session_id);
    }

    /// Bind a credential to a live session. Returns false if the session is
    /// not open.
    pub fn bind_credential(&self, session_id: &str, credential: SecretString) -> bool {
        if !self.sessions.contains(session_id) {
            return false;
        }
        self.credentials.set(session_id, credential);

        // A teardown may have run between the check and the write.
        if !self.sessions.contains(session_id) {
            self.credentials.remove(session_id);
            return false;
        }
        info!(session_id, "Credential bound to session");
        true
    }

    /// Close every open session. Returns how many were closed.
    pub fn close_all(&self) -> usize {
        let ids = self.sessions.ids();
        for id in &ids {
            self.teardown(id);
        }
        ids.len()
    }

    fn discovery(&self) -> Value {
        json!({
            "name": self.config.server.name,
            "version": self.config.server.version,
            "status": "running",
            "endpoints": {
                "/": "Server information (this response)",
                "/sse": "Server-Sent Events endpoint for MCP connection",
                "/messages": "POST endpoint for MCP messages",
            },
            "tools": self.catalog.definitions(),
        })
    }
}

/// The MCP gateway server.
pub struct Gateway {
    state: Arc<GatewayState>,
}

impl Gateway {
    /// Create a gateway whose default credential comes from `NS_API_KEY`.
    pub fn new(config: Config, catalog: ToolCatalog) -> Self {
        Self::with_default_credential(config, catalog, mapgate_core::env::default_api_key())
    }

    /// Create a gateway with an explicit default credential.
    pub fn with_default_credential(
        config: Config,
        catalog: ToolCatalog,
        default_credential: Option<SecretString>,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new(config.gateway.max_sessions));
        let credentials = Arc::new(CredentialStore::new());
        let catalog = Arc::new(catalog);
        let router = MessageRouter::new(
            sessions.clone(),
            credentials.clone(),
            catalog.clone(),
            config.server.clone(),
        )
        .with_default_credential(default_credential)
        .with_tool_timeout(Duration::from_secs(config.gateway.tool_timeout_secs));

        let state = Arc::new(GatewayState {
            config,
            sessions,
            credentials,
            catalog,
            router,
        });

        Self { state }
    }

    /// Shared state, for embedding and tests.
    pub fn state(&self) -> &Arc<GatewayState> {
        &self.state
    }

    /// Address derived from the bind mode and port.
    pub fn bind_address(&self) -> SocketAddr {
        let gateway = &self.state.config.gateway;
        SocketAddr::new(gateway.bind.ip(), gateway.port)
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn run(&self) -> Result<()> {
        let addr = self.bind_address();
        let listener = TcpListener::bind(addr).await?;
        info!(
            "{} {} running on {}",
            self.state.config.server.name, self.state.config.server.version, addr
        );

        self.serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve on an existing listener until `shutdown` resolves.
    ///
    /// On shutdown every open session is closed so their streams end and the
    /// server can drain.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let state = self.state.clone();
        let signal = async move {
            shutdown.await;
            let closed = state.close_all();
            info!(closed, "Shutting down gateway");
        };

        axum::serve(listener, self.create_router())
            .with_graceful_shutdown(signal)
            .await?;
        Ok(())
    }

    /// Create the Axum router.
    pub fn create_router(&self) -> Router {
        let mut router = Router::new()
            .route("/", get(discovery_handler))
            .route("/health", get(health_handler))
            .route("/sse", get(sse_handler))
            .route(MESSAGES_PATH, post(messages_handler))
            .with_state(self.state.clone());

        if self.state.config.gateway.cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers(Any),
            );
        }

        router.layer(TraceLayer::new_for_http())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Tears the session down when its stream is dropped.
struct TeardownGuard {
    state: Arc<GatewayState>,
    session_id: String,
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        debug!(session_id = %self.session_id, "Stream closed");
        self.state.teardown(&self.session_id);
    }
}

/// Event stream of one session, owning its teardown guard.
struct SessionStream {
    events: BoxStream<'static, std::result::Result<Event, Infallible>>,
    _guard: TeardownGuard,
}

impl Stream for SessionStream {
    type Item = std::result::Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_next_unpin(cx)
    }
}

fn frame_event(frame: Frame) -> Event {
    match frame {
        Frame::Endpoint(path) => Event::default().event("endpoint").data(path),
        Frame::Message(json) => Event::default().event("message").data(json),
    }
}

/// Discovery: server identity and the tool catalog.
async fn discovery_handler(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    Json(state.discovery())
}

/// Health check handler.
async fn health_handler(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "sessions": state.sessions.count(),
    }))
}

/// Open a session stream.
///
/// The first frame names the message endpoint (and with it the session id),
/// the second announces the tool catalog.
async fn sse_handler(State(state): State<Arc<GatewayState>>) -> Response {
    let session_id = new_session_id();
    let (handle, receiver) = SessionHandle::channel(state.config.gateway.channel_capacity);
    let closed = handle.closed_token();

    if let Err(e) = state.sessions.open(&session_id, handle) {
        warn!("Rejected stream: {}", e);
        return e.into_response();
    }

    let endpoint = format!("{}?sessionId={}", MESSAGES_PATH, session_id);
    let catalog = JsonRpcNotification::new(CATALOG_NOTIFICATION, state.router.list_tools());
    let initial = stream::iter(vec![
        Frame::Endpoint(endpoint),
        Frame::Message(catalog.to_json()),
    ]);

    let events = initial
        .chain(ReceiverStream::new(receiver))
        .take_until(async move { closed.cancelled().await })
        .map(|frame| Ok(frame_event(frame)))
        .boxed();

    let stream = SessionStream {
        events,
        _guard: TeardownGuard {
            state: state.clone(),
            session_id,
        },
    };

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new().interval(Duration::from_secs(state.config.gateway.keep_alive_secs)),
    );
    ([(CONNECTION, "keep-alive")], sse).into_response()
}

#[derive(Debug, Deserialize)]
struct MessagesQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Accept one JSON-RPC message for a session. The reply travels on the
/// session's stream.
async fn messages_handler(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<MessagesQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(session_id) = query.session_id.filter(|id| is_valid_session_id(id)) else {
        return GatewayError::SessionNotFound(String::new()).into_response();
    };
    if !state.sessions.contains(&session_id) {
        debug!(%session_id, "Message for unknown session");
        return GatewayError::SessionNotFound(session_id).into_response();
    }

    if let Some(credential) = bearer_credential(&headers) {
        state.bind_credential(&session_id, credential);
    }

    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return GatewayError::from(e).into_response(),
    };

    match state.router.route(&session_id, request).await {
        Ok(_) => (StatusCode::ACCEPTED, "Accepted").into_response(),
        Err(e) => e.into_response(),
    }
}

fn bearer_credential(headers: &HeaderMap) -> Option<SecretString> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        None
    } else {
        Some(SecretString::new(token))
    }
}
