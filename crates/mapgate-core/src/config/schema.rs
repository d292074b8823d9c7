//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Main mapgate configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server identity reported on discovery.
    #[serde(default)]
    pub server: ServerInfoConfig,

    /// Gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Maps web service settings.
    #[serde(default)]
    pub maps: MapsConfig,
}

/// Server identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfoConfig {
    /// Display name.
    #[serde(default = "default_server_name")]
    pub name: String,

    /// Reported version.
    #[serde(default = "default_server_version")]
    pub version: String,
}

impl Default for ServerInfoConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            version: default_server_version(),
        }
    }
}

fn default_server_name() -> String {
    "Google Maps MCP Service".to_string()
}

fn default_server_version() -> String {
    "0.1.0".to_string()
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bind mode.
    #[serde(default)]
    pub bind: BindMode,

    /// Port number.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS for any origin.
    #[serde(default = "default_true")]
    pub cors: bool,

    /// Maximum concurrently open sessions.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Upper bound on a single tool invocation, in seconds.
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Buffered frames per session stream.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Interval between SSE keep-alive comments, in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: BindMode::default(),
            port: default_port(),
            cors: true,
            max_sessions: default_max_sessions(),
            tool_timeout_secs: default_tool_timeout_secs(),
            channel_capacity: default_channel_capacity(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

fn default_port() -> u16 {
    3004
}

fn default_true() -> bool {
    true
}

fn default_max_sessions() -> usize {
    1024
}

fn default_tool_timeout_secs() -> u64 {
    30
}

fn default_channel_capacity() -> usize {
    64
}

fn default_keep_alive_secs() -> u64 {
    15
}

/// Bind mode for the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Bind to loopback only (127.0.0.1).
    #[default]
    Loopback,

    /// Bind to all interfaces.
    Lan,
}

impl BindMode {
    /// Interface address for this mode.
    pub fn ip(&self) -> IpAddr {
        match self {
            Self::Loopback => IpAddr::V4(Ipv4Addr::LOCALHOST),
            Self::Lan => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }
}

impl std::str::FromStr for BindMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "loopback" => Ok(Self::Loopback),
            "lan" => Ok(Self::Lan),
            other => Err(format!("Invalid bind mode: {} (expected loopback or lan)", other)),
        }
    }
}

/// Maps web service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    /// Base URL of the Maps web services.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Timeout for a single outbound request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Default Maps web service base URL.
pub const DEFAULT_MAPS_API_BASE: &str = "https://maps.googleapis.com/maps/api";

fn default_api_base() -> String {
    DEFAULT_MAPS_API_BASE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    20
}
