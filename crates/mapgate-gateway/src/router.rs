//! Routing of inbound JSON-RPC messages to sessions and tools.
//!
//! Each message passes through `received -> validated -> dispatched ->
//! completed`. Validation resolves the live session first and the tool
//! second, so the two lookup failures stay distinguishable. Tool calls run
//! on their own task; their results go back onto the originating stream in
//! completion order, or are dropped when the stream is gone by then.

use crate::catalog::ToolCatalog;
use crate::credentials::CredentialStore;
use crate::error::GatewayError;
use crate::rpc::{
    InitializeParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams,
    DEFAULT_PROTOCOL_VERSION,
};
use crate::session::{Frame, SessionRegistry};
use crate::Result;
use mapgate_core::config::ServerInfoConfig;
use mapgate_core::error::ToolError;
use mapgate_core::types::ToolResponse;
use mapgate_core::SecretString;
use mapgate_tools::{Tool, ToolContext};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Default upper bound on one tool invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// What happened to a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Written onto the session's stream.
    Delivered,

    /// The session closed first; the reply was discarded.
    Dropped,
}

/// Result of routing one inbound message.
#[derive(Debug)]
pub enum RouteOutcome {
    /// Answered inline.
    Replied(Delivery),

    /// A tool call is running. The handle resolves once its result has been
    /// delivered or dropped.
    Dispatched(JoinHandle<Delivery>),

    /// Notification, nothing to answer.
    Accepted,
}

/// A validated tool call, bound to its session and resolved credential.
pub struct Dispatch {
    session_id: String,
    tool: Arc<dyn Tool>,
    context: ToolContext,
}

impl Dispatch {
    /// Name of the resolved tool.
    pub fn tool_name(&self) -> &str {
        self.tool.name()
    }

    /// The execution context the tool will see.
    pub fn context(&self) -> &ToolContext {
        &self.context
    }

    /// Run the tool, folding panics and timeouts into failure envelopes.
    pub async fn run(self, arguments: Value, limit: Duration) -> ToolResponse {
        let Dispatch {
            session_id,
            tool,
            context,
        } = self;
        let name = tool.name().to_string();

        let mut task = tokio::spawn(async move { tool.invoke(arguments, &context).await });
        match tokio::time::timeout(limit, &mut task).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(%session_id, tool = %name, "Tool task failed: {}", e);
                ToolResponse::error(format!("Tool {} failed unexpectedly", name))
            }
            Err(_) => {
                task.abort();
                warn!(%session_id, tool = %name, "Tool call timed out");
                ToolError::Timeout { limit }.into()
            }
        }
    }
}

/// Resolves inbound messages against the session registry, the credential
/// store and the tool catalog.
pub struct MessageRouter {
    sessions: Arc<SessionRegistry>,
    credentials: Arc<CredentialStore>,
    catalog: Arc<ToolCatalog>,
    server: ServerInfoConfig,
    default_credential: Option<SecretString>,
    tool_timeout: Duration,
}

impl MessageRouter {
    pub fn new(
        sessions: Arc<SessionRegistry>,
        credentials: Arc<CredentialStore>,
        catalog: Arc<ToolCatalog>,
        server: ServerInfoConfig,
    ) -> Self {
        Self {
            sessions,
            credentials,
            catalog,
            server,
            default_credential: None,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Credential used when a session has none bound.
    pub fn with_default_credential(mut self, credential: Option<SecretString>) -> Self {
        self.default_credential = credential.filter(|c| !c.is_blank());
        self
    }

    /// Upper bound on a single tool invocation.
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Validate a tool call and resolve its credential.
    ///
    /// The session is checked again after the credential is read, so a call
    /// racing a teardown fails with `SessionNotFound` instead of running with
    /// a credential that is being removed.
    pub fn prepare(&self, session_id: &str, tool_name: &str) -> Result<Dispatch> {
        let handle = self
            .sessions
            .get(session_id)
            .ok_or_else(|| GatewayError::SessionNotFound(session_id.to_string()))?;
        let tool = self
            .catalog
            .resolve(tool_name)
            .ok_or_else(|| GatewayError::ToolNotFound(tool_name.to_string()))?;

        let credential = self
            .credentials
            .get(session_id)
            .or_else(|| self.default_credential.clone());

        if handle.is_closed() {
            return Err(GatewayError::SessionNotFound(session_id.to_string()));
        }

        Ok(Dispatch {
            session_id: session_id.to_string(),
            tool,
            context: ToolContext::new(Some(session_id.to_string()), credential),
        })
    }

    /// Route one inbound message for a session.
    ///
    /// Only `SessionNotFound` is returned as an error; everything else is
    /// answered on the session's stream.
    pub async fn route(&self, session_id: &str, request: JsonRpcRequest) -> Result<RouteOutcome> {
        if !self.sessions.contains(session_id) {
            return Err(GatewayError::SessionNotFound(session_id.to_string()));
        }

        if request.is_notification() {
            debug!(session_id, method = %request.method, "Notification received");
            return Ok(RouteOutcome::Accepted);
        }

        let id = request.id;
        debug!(session_id, method = %request.method, "Request received");
        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.initialize(request.params)),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, self.list_tools()),
            "tools/call" => return self.call_tool(session_id, id, request.params).await,
            other => {
                let err = GatewayError::MethodNotFound(other.to_string());
                JsonRpcResponse::error(id, JsonRpcError::from(&err))
            }
        };

        Ok(RouteOutcome::Replied(
            deliver(&self.sessions, session_id, &response).await,
        ))
    }

    /// `{ tools: [...] }` as listed on discovery.
    pub fn list_tools(&self) -> Value {
        json!({ "tools": self.catalog.definitions() })
    }

    fn initialize(&self, params: Option<Value>) -> Value {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();
        let protocol_version = params
            .protocol_version
            .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string());

        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.server.name,
                "version": self.server.version,
            }
        })
    }

    async fn call_tool(
        &self,
        session_id: &str,
        id: Option<Value>,
        params: Option<Value>,
    ) -> Result<RouteOutcome> {
        let params = match ToolCallParams::from_request(params) {
            Ok(params) => params,
            Err(e) => {
                let response = JsonRpcResponse::error(id, JsonRpcError::from(&e));
                return Ok(RouteOutcome::Replied(
                    deliver(&self.sessions, session_id, &response).await,
                ));
            }
        };

        let dispatch = match self.prepare(session_id, &params.name) {
            Ok(dispatch) => dispatch,
            Err(e @ GatewayError::ToolNotFound(_)) => {
                warn!(session_id, tool = %params.name, "Unknown tool requested");
                let envelope = envelope_value(&ToolResponse::error(e.to_string()));
                let response = JsonRpcResponse::success(id, envelope);
                return Ok(RouteOutcome::Replied(
                    deliver(&self.sessions, session_id, &response).await,
                ));
            }
            Err(e) => return Err(e),
        };

        let sessions = self.sessions.clone();
        let limit = self.tool_timeout;
        let session_id = session_id.to_string();
        let handle = tokio::spawn(async move {
            let tool = dispatch.tool_name().to_string();
            let started = Instant::now();
            let response = dispatch.run(params.arguments, limit).await;
            info!(
                %session_id,
                %tool,
                is_error = response.is_error,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Tool call finished"
            );

            let reply = JsonRpcResponse::success(id, envelope_value(&response));
            deliver(&sessions, &session_id, &reply).await
        });

        Ok(RouteOutcome::Dispatched(handle))
    }
}

fn envelope_value(response: &ToolResponse) -> Value {
    serde_json::to_value(response).unwrap_or_else(|e| {
        json!({
            "isError": true,
            "content": [{ "type": "text", "text": format!("Failed to encode result: {}", e) }]
        })
    })
}

async fn deliver(
    sessions: &SessionRegistry,
    session_id: &str,
    response: &JsonRpcResponse,
) -> Delivery {
    match sessions
        .send(session_id, Frame::Message(response.to_json()))
        .await
    {
        Ok(()) => Delivery::Delivered,
        Err(_) => {
            debug!(session_id, "Session gone, reply dropped");
            Delivery::Dropped
        }
    }
}
