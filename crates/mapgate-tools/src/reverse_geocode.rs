//! Coordinates to address.

use crate::geocode::GeocodeResponse;
use crate::{parse_args, LatLng, MapsClient, Result, Tool, ToolContext};
use async_trait::async_trait;
use mapgate_core::error::ToolError;
use mapgate_core::types::ToolDefinition;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Tool converting coordinates into an address.
pub struct ReverseGeocodeTool {
    client: Arc<MapsClient>,
}

impl ReverseGeocodeTool {
    pub fn new(client: Arc<MapsClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ReverseGeocodeArgs {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

#[async_trait]
impl Tool for ReverseGeocodeTool {
    fn name(&self) -> &str {
        "maps_reverse_geocode"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "maps_reverse_geocode".to_string(),
            description: "Convert coordinates into an address.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "latitude": {
                        "type": "number",
                        "description": "Latitude coordinate"
                    },
                    "longitude": {
                        "type": "number",
                        "description": "Longitude coordinate"
                    }
                },
                "required": ["latitude", "longitude"]
            }),
        }
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        context: &ToolContext,
    ) -> Result<serde_json::Value> {
        let key = context.api_key()?;
        let args: ReverseGeocodeArgs = parse_args(args)?;
        let point = match (args.latitude, args.longitude) {
            (Some(latitude), Some(longitude)) => LatLng { latitude, longitude },
            _ => {
                return Err(ToolError::invalid_input(
                    "The latitude and longitude parameter should be provided to get the address.",
                ))
            }
        };

        let data: GeocodeResponse = self
            .client
            .get("geocode", &[("latlng", point.to_query())], key, "Reverse geocoding")
            .await?;
        let first = data
            .results
            .first()
            .ok_or_else(|| ToolError::upstream("Reverse geocoding", "ZERO_RESULTS", None))?;

        Ok(json!({
            "formatted_address": first.formatted_address,
            "place_id": first.place_id
        }))
    }
}
