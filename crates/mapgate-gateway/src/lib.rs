//! Session-scoped MCP gateway for mapgate.
//!
//! This crate provides:
//! - The HTTP+SSE transport: a `/sse` stream per session and a `/messages`
//!   endpoint for inbound JSON-RPC messages
//! - [`SessionRegistry`] and [`CredentialStore`], torn down together when a
//!   stream closes
//! - [`ToolCatalog`], the immutable table of callable tools
//! - [`MessageRouter`], which resolves sessions and tools and writes results
//!   back onto the originating stream

pub mod catalog;
pub mod credentials;
pub mod error;
pub mod router;
pub mod rpc;
pub mod server;
pub mod session;

pub use catalog::ToolCatalog;
pub use credentials::CredentialStore;
pub use error::GatewayError;
pub use router::{Delivery, MessageRouter, RouteOutcome};
pub use rpc::{JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
pub use server::{Gateway, GatewayState};
pub use session::{Frame, SessionHandle, SessionRegistry};

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
