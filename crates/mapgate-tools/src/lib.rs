//! Maps tool adapters.
//!
//! This crate provides:
//! - [`Tool`] trait, the single capability the gateway dispatches to
//! - [`ToolContext`] carrying the session id and resolved credential
//! - [`MapsClient`] wrapping the outbound Maps web service calls
//! - The seven `maps_*` adapters, assembled in catalog order by [`maps_tools`]

mod client;
mod directions;
mod distance_matrix;
mod elevation;
mod geo;
mod geocode;
mod place_details;
mod reverse_geocode;
mod search_places;

pub use client::MapsClient;
pub use directions::DirectionsTool;
pub use distance_matrix::DistanceMatrixTool;
pub use elevation::ElevationTool;
pub use geo::{haversine_km, LatLng};
pub use geocode::GeocodeTool;
pub use place_details::PlaceDetailsTool;
pub use reverse_geocode::ReverseGeocodeTool;
pub use search_places::SearchPlacesTool;

use async_trait::async_trait;
use mapgate_core::error::ToolError;
use mapgate_core::types::{ToolDefinition, ToolResponse};
use mapgate_core::SecretString;
use serde::Deserialize;
use std::sync::Arc;

/// Result type for tool execution.
pub type Result<T> = std::result::Result<T, ToolError>;

/// A named capability the gateway can dispatch a request to.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name.
    fn name(&self) -> &str;

    /// Get the tool definition for discovery.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool, returning the JSON payload on success.
    async fn execute(
        &self,
        args: serde_json::Value,
        context: &ToolContext,
    ) -> Result<serde_json::Value>;

    /// Execute the tool and fold every failure into a failure envelope.
    async fn invoke(&self, args: serde_json::Value, context: &ToolContext) -> ToolResponse {
        self.execute(args, context).await.into()
    }
}

/// Context for a single tool invocation.
///
/// Tools see only the session id and the credential the gateway resolved for
/// them, never the registries behind those values.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Session ID, absent for non-session callers.
    pub session_id: Option<String>,

    /// Resolved credential.
    pub credential: Option<SecretString>,
}

impl ToolContext {
    /// Create a context for a session.
    pub fn new(session_id: Option<String>, credential: Option<SecretString>) -> Self {
        Self {
            session_id,
            credential,
        }
    }

    /// The credential to authorize outbound calls with.
    pub fn api_key(&self) -> Result<&SecretString> {
        self.credential
            .as_ref()
            .filter(|key| !key.is_blank())
            .ok_or(ToolError::MissingCredential)
    }
}

/// Assemble every Maps tool in discovery order.
pub fn maps_tools(client: Arc<MapsClient>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GeocodeTool::new(client.clone())),
        Arc::new(ReverseGeocodeTool::new(client.clone())),
        Arc::new(SearchPlacesTool::new(client.clone())),
        Arc::new(PlaceDetailsTool::new(client.clone())),
        Arc::new(DistanceMatrixTool::new(client.clone())),
        Arc::new(ElevationTool::new(client.clone())),
        Arc::new(DirectionsTool::new(client)),
    ]
}

/// Deserialize tool arguments, treating `null` as an empty object.
pub(crate) fn parse_args<T>(args: serde_json::Value) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if args.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(args)
        .map_err(|e| ToolError::invalid_input(format!("Invalid arguments: {}", e)))
}

/// Travel modes accepted by directions and distance matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    /// Query parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "driving" => Some(Self::Driving),
            "walking" => Some(Self::Walking),
            "bicycling" => Some(Self::Bicycling),
            "transit" => Some(Self::Transit),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn context(key: &str) -> ToolContext {
        ToolContext::new(Some("test-session".to_string()), Some(SecretString::new(key)))
    }

    pub fn client(base: &str) -> Arc<MapsClient> {
        Arc::new(MapsClient::new(base, std::time::Duration::from_secs(5)).unwrap())
    }

    pub fn error_text(response: &ToolResponse) -> String {
        assert!(response.is_error, "expected failure envelope: {:?}", response);
        response.first_text().unwrap_or_default().to_string()
    }

    pub fn payload(response: &ToolResponse) -> serde_json::Value {
        assert!(!response.is_error, "expected success envelope: {:?}", response);
        serde_json::from_str(response.first_text().unwrap()).unwrap()
    }
}
