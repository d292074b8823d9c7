//! Details for a single place.

use crate::geocode::Location;
use crate::{parse_args, MapsClient, Result, Tool, ToolContext};
use async_trait::async_trait;
use mapgate_core::error::ToolError;
use mapgate_core::types::ToolDefinition;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Tool returning details about a place id.
pub struct PlaceDetailsTool {
    client: Arc<MapsClient>,
}

impl PlaceDetailsTool {
    pub fn new(client: Arc<MapsClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PlaceDetailsArgs {
    #[serde(default)]
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetailsResponse {
    result: PlaceDetails,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    name: String,
    #[serde(default)]
    formatted_address: Option<String>,
    geometry: DetailsGeometry,
    #[serde(default)]
    formatted_phone_number: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    reviews: Option<Value>,
    #[serde(default)]
    opening_hours: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct DetailsGeometry {
    location: Location,
}

#[async_trait]
impl Tool for PlaceDetailsTool {
    fn name(&self) -> &str {
        "maps_place_details"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "maps_place_details".to_string(),
            description: "Get detailed information about a specific place.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "place_id": {
                        "type": "string",
                        "description": "The place ID to get details for"
                    }
                },
                "required": ["place_id"]
            }),
        }
    }

    async fn execute(&self, args: Value, context: &ToolContext) -> Result<Value> {
        let key = context.api_key()?;
        let args: PlaceDetailsArgs = parse_args(args)?;
        let place_id = args.place_id.filter(|p| !p.is_empty()).ok_or_else(|| {
            ToolError::invalid_input(
                "The place_id parameter should be provided to get detailed information about the place.",
            )
        })?;

        let data: PlaceDetailsResponse = self
            .client
            .get("place/details", &[("place_id", place_id)], key, "Place details request")
            .await?;
        let place = data.result;

        Ok(json!({
            "name": place.name,
            "formatted_address": place.formatted_address,
            "location": {
                "latitude": place.geometry.location.lat,
                "longitude": place.geometry.location.lng
            },
            "formatted_phone_number": place.formatted_phone_number,
            "website": place.website,
            "rating": place.rating,
            "reviews": place.reviews,
            "opening_hours": place.opening_hours
        }))
    }
}
