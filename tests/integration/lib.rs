//! Shared harness for the gateway integration tests: a gateway bound to an
//! ephemeral port, a minimal SSE client and a tool that records what it saw.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use mapgate_core::config::Config;
use mapgate_core::types::ToolDefinition;
use mapgate_core::SecretString;
use mapgate_gateway::{Gateway, GatewayState, ToolCatalog};
use mapgate_tools::{Tool, ToolContext};
use serde_json::{json, Value};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A gateway serving on `127.0.0.1:<ephemeral>`.
pub struct TestGateway {
    pub base: String,
    pub state: Arc<GatewayState>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TestGateway {
    /// Start a gateway with the given tools and a short keep-alive.
    pub async fn start(
        tools: Vec<Arc<RecordingTool>>,
        default_credential: Option<SecretString>,
    ) -> Self {
        let mut config = Config::default();
        config.gateway.keep_alive_secs = 1;
        config.gateway.tool_timeout_secs = 5;

        let tools = tools
            .into_iter()
            .map(|tool| tool as Arc<dyn Tool>)
            .collect();
        let catalog = ToolCatalog::new(tools).unwrap();
        let gateway = Gateway::with_default_credential(config, catalog, default_credential);
        let state = gateway.state().clone();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            gateway
                .serve(listener, async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            base,
            state,
            shutdown: Some(tx),
            task,
        }
    }

    /// Trigger graceful shutdown and wait for the server to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("server did not shut down")
            .unwrap();
    }

    /// POST one JSON-RPC message, optionally with a bearer credential.
    pub async fn post(
        &self,
        session_id: &str,
        bearer: Option<&str>,
        message: Value,
    ) -> reqwest::Response {
        let mut request = reqwest::Client::new()
            .post(format!("{}/messages?sessionId={}", self.base, session_id))
            .json(&message);
        if let Some(key) = bearer {
            request = request.bearer_auth(key);
        }
        request.send().await.unwrap()
    }

    /// Poll until `check` holds or five seconds pass. A dropped stream is
    /// noticed on the next keep-alive write.
    pub async fn eventually(&self, check: impl Fn(&GatewayState) -> bool) -> bool {
        for _ in 0..250 {
            if check(&self.state) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        check(&self.state)
    }
}

/// One server-sent event.
#[derive(Debug, Clone)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

impl SseEvent {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.data).unwrap()
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Vec<u8>>> + Send>>;

/// Reads events off a `/sse` response.
pub struct SseClient {
    pub session_id: String,
    stream: ByteStream,
    buffer: String,
}

impl SseClient {
    /// Open a stream and consume the endpoint frame.
    pub async fn connect(base: &str) -> Self {
        let response = reqwest::get(format!("{}/sse", base)).await.unwrap();
        assert_eq!(response.status(), 200);
        let stream: ByteStream = Box::pin(response.bytes_stream().map(|r| r.map(|b| b.to_vec())));

        let mut client = Self {
            session_id: String::new(),
            stream,
            buffer: String::new(),
        };
        let endpoint = client.next_event().await.expect("endpoint event");
        assert_eq!(endpoint.event, "endpoint");
        client.session_id = endpoint
            .data
            .split("sessionId=")
            .nth(1)
            .expect("session id in endpoint")
            .to_string();
        client
    }

    /// Next event carrying data, skipping keep-alive comments. `None` once
    /// the stream has ended.
    pub async fn next_event(&mut self) -> Option<SseEvent> {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let block: String = self.buffer.drain(..end + 2).collect();
                if let Some(event) = parse_block(&block) {
                    return Some(event);
                }
                continue;
            }
            match tokio::time::timeout(Duration::from_secs(10), self.stream.next()).await {
                Ok(Some(Ok(chunk))) => self.buffer.push_str(&String::from_utf8_lossy(&chunk)),
                Ok(Some(Err(_))) | Ok(None) => return None,
                Err(_) => panic!("timed out waiting for an event"),
            }
        }
    }

    /// Next `message` event, decoded.
    pub async fn next_message(&mut self) -> Value {
        loop {
            let event = self.next_event().await.expect("stream ended");
            if event.event == "message" {
                return event.json();
            }
        }
    }
}

fn parse_block(block: &str) -> Option<SseEvent> {
    let mut event = String::from("message");
    let mut data = Vec::new();
    for line in block.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            event = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("data:") {
            data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
        }
    }
    if data.is_empty() {
        None
    } else {
        Some(SseEvent {
            event,
            data: data.join("\n"),
        })
    }
}

/// A tool that records the session and credential of every call.
pub struct RecordingTool {
    name: &'static str,
    calls: Mutex<Vec<(Option<String>, String)>>,
}

impl RecordingTool {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// `(session_id, credential)` per call, in call order.
    pub fn calls(&self) -> Vec<(Option<String>, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Credentials seen, in call order.
    pub fn credentials(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, c)| c).collect()
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        self.name
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: "Records every invocation".to_string(),
            input_schema: json!({"type": "object"}),
        }
    }

    async fn execute(&self, args: Value, context: &ToolContext) -> mapgate_tools::Result<Value> {
        let credential = context.api_key()?.expose_secret().to_string();
        self.calls
            .lock()
            .unwrap()
            .push((context.session_id.clone(), credential));
        Ok(json!({ "arguments": args }))
    }
}

/// A `tools/call` request.
pub fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
}
