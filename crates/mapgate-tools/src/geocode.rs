//! Address to coordinates.

use crate::{parse_args, MapsClient, Result, Tool, ToolContext};
use async_trait::async_trait;
use mapgate_core::error::ToolError;
use mapgate_core::types::ToolDefinition;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Tool converting an address into coordinates.
pub struct GeocodeTool {
    client: Arc<MapsClient>,
}

impl GeocodeTool {
    pub fn new(client: Arc<MapsClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GeocodeArgs {
    #[serde(default)]
    address: Option<String>,
}

/// Geocoding API response, shared with reverse geocoding.
#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResult {
    pub formatted_address: String,
    pub place_id: String,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    pub location: Location,
}

/// Location as the Maps services encode it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct Location {
    pub lat: f64,
    pub lng: f64,
}

#[async_trait]
impl Tool for GeocodeTool {
    fn name(&self) -> &str {
        "maps_geocode"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "maps_geocode".to_string(),
            description: "Convert an address into geographic coordinates.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "address": {
                        "type": "string",
                        "description": "The address to geocode"
                    }
                },
                "required": ["address"]
            }),
        }
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        context: &ToolContext,
    ) -> Result<serde_json::Value> {
        let key = context.api_key()?;
        let args: GeocodeArgs = parse_args(args)?;
        let address = args.address.filter(|a| !a.is_empty()).ok_or_else(|| {
            ToolError::invalid_input("The address parameter should be provided to get the location.")
        })?;

        let data: GeocodeResponse = self
            .client
            .get("geocode", &[("address", address)], key, "Geocoding")
            .await?;
        let first = data
            .results
            .first()
            .ok_or_else(|| ToolError::upstream("Geocoding", "ZERO_RESULTS", None))?;

        Ok(json!({
            "location": {
                "latitude": first.geometry.location.lat,
                "longitude": first.geometry.location.lng
            },
            "formatted_address": first.formatted_address,
            "place_id": first.place_id
        }))
    }
}
