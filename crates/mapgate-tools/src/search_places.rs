//! Text search for places, optionally around a point.

use crate::geocode::Location;
use crate::{haversine_km, parse_args, LatLng, MapsClient, Result, Tool, ToolContext};
use async_trait::async_trait;
use mapgate_core::error::ToolError;
use mapgate_core::types::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Largest search radius the Places service accepts, in metres.
const MAX_RADIUS_METERS: f64 = 50_000.0;

/// Tool searching places by free-text query.
pub struct SearchPlacesTool {
    client: Arc<MapsClient>,
}

impl SearchPlacesTool {
    pub fn new(client: Arc<MapsClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchPlacesArgs {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    location: Option<PartialLatLng>,
    #[serde(default)]
    radius: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PartialLatLng {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PlacesSearchResponse {
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    name: String,
    #[serde(default)]
    formatted_address: Option<String>,
    geometry: PlaceGeometry,
    place_id: String,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceGeometry {
    location: Location,
}

#[derive(Debug, Serialize)]
struct Place {
    name: String,
    formatted_address: Option<String>,
    location: LatLng,
    place_id: String,
    rating: Option<f64>,
    types: Vec<String>,
    /// Kilometres from the search center, 0 without one.
    distance: f64,
}

#[async_trait]
impl Tool for SearchPlacesTool {
    fn name(&self) -> &str {
        "maps_search_places"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "maps_search_places".to_string(),
            description: "Search for places of a certain type, optional within a radius from a \
                          given location."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    },
                    "location": {
                        "type": "object",
                        "properties": {
                            "latitude": { "type": "number" },
                            "longitude": { "type": "number" }
                        },
                        "description": "Optional center point for the search"
                    },
                    "radius": {
                        "type": "number",
                        "description": "Search radius in meters (max 50000)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        context: &ToolContext,
    ) -> Result<serde_json::Value> {
        let key = context.api_key()?;
        let args: SearchPlacesArgs = parse_args(args)?;
        let query = args.query.filter(|q| !q.is_empty()).ok_or_else(|| {
            ToolError::invalid_input("The query parameter should be provided to get places.")
        })?;
        let center = match args.location {
            None => None,
            Some(PartialLatLng {
                latitude: Some(latitude),
                longitude: Some(longitude),
            }) => Some(LatLng { latitude, longitude }),
            Some(_) => {
                return Err(ToolError::invalid_input(
                    "The location parameter should have a latitude and a longitude property.",
                ))
            }
        };
        // Zero or negative means no radius.
        let radius = args.radius.filter(|r| *r > 0.0);
        if let Some(radius) = radius {
            if radius > MAX_RADIUS_METERS {
                return Err(ToolError::invalid_input(
                    "The radius parameter should be smaller than 50.000 meter.",
                ));
            }
        }

        let mut params = vec![("query", query)];
        if let Some(center) = center {
            params.push(("location", center.to_query()));
        }
        if let Some(radius) = radius {
            params.push(("radius", radius.to_string()));
        }

        let data: PlacesSearchResponse = self
            .client
            .get("place/textsearch", &params, key, "Search places")
            .await?;

        let places = rank_places(data.results, center, radius);
        Ok(json!({ "places": places }))
    }
}

/// Attach distances, drop places outside the radius, and sort nearest first.
fn rank_places(
    results: Vec<PlaceResult>,
    center: Option<LatLng>,
    radius: Option<f64>,
) -> Vec<Place> {
    let mut places: Vec<Place> = results
        .into_iter()
        .map(|result| {
            let location = LatLng {
                latitude: result.geometry.location.lat,
                longitude: result.geometry.location.lng,
            };
            let distance = center.map(|c| haversine_km(c, location)).unwrap_or(0.0);
            Place {
                name: result.name,
                formatted_address: result.formatted_address,
                location,
                place_id: result.place_id,
                rating: result.rating,
                types: result.types,
                distance,
            }
        })
        .filter(|place| match (center, radius) {
            (Some(_), Some(radius)) => place.distance <= radius / 1000.0,
            _ => true,
        })
        .collect();

    places.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    places
}
