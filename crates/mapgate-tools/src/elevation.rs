//! Elevation lookup.

use crate::{parse_args, LatLng, MapsClient, Result, Tool, ToolContext};
use async_trait::async_trait;
use mapgate_core::error::ToolError;
use mapgate_core::types::ToolDefinition;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Tool returning elevation for a set of points.
pub struct ElevationTool {
    client: Arc<MapsClient>,
}

impl ElevationTool {
    pub fn new(client: Arc<MapsClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ElevationArgs {
    #[serde(default)]
    locations: Vec<LatLng>,
}

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    #[serde(default)]
    results: Vec<ElevationResult>,
}

#[derive(Debug, Deserialize)]
struct ElevationResult {
    elevation: f64,
    location: Value,
    #[serde(default)]
    resolution: Option<f64>,
}

#[async_trait]
impl Tool for ElevationTool {
    fn name(&self) -> &str {
        "maps_elevation"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "maps_elevation".to_string(),
            description: "Get elevation data for locations on the earth.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "locations": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "latitude": { "type": "number" },
                                "longitude": { "type": "number" }
                            },
                            "required": ["latitude", "longitude"]
                        },
                        "description": "Array of locations to get elevation for"
                    }
                },
                "required": ["locations"]
            }),
        }
    }

    async fn execute(&self, args: Value, context: &ToolContext) -> Result<Value> {
        let key = context.api_key()?;
        let args: ElevationArgs = parse_args(args)?;
        if args.locations.is_empty() {
            return Err(ToolError::invalid_input(
                "The locations parameter should be provided with at least one lat/long to get the elevation of the locations.",
            ));
        }

        let locations = args
            .locations
            .iter()
            .map(LatLng::to_query)
            .collect::<Vec<_>>()
            .join("|");
        let data: ElevationResponse = self
            .client
            .get("elevation", &[("locations", locations)], key, "Elevation request")
            .await?;

        let results: Vec<Value> = data
            .results
            .into_iter()
            .map(|r| {
                json!({
                    "elevation": r.elevation,
                    "location": r.location,
                    "resolution": r.resolution
                })
            })
            .collect();
        Ok(json!({ "results": results }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client, context, error_text, payload};
    use wiremock::matchers::{path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_elevation_pipes_locations() {
        let server = MockServer::start().await;
        Mock::given(path("/elevation/json"))
            .and(query_param("locations", "39.7391536,-104.9847034|36.455556,-116.866667"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "results": [
                    { "elevation": 1608.6, "location": { "lat": 39.74, "lng": -104.98 }, "resolution": 4.77 },
                    { "elevation": -50.8, "location": { "lat": 36.46, "lng": -116.87 }, "resolution": 19.08 }
                ]
            })))
            .mount(&server)
            .await;

        let tool = ElevationTool::new(client(&server.uri()));
        let value = payload(
            &tool
                .invoke(
                    json!({"locations": [
                        {"latitude": 39.7391536, "longitude": -104.9847034},
                        {"latitude": 36.455556, "longitude": -116.866667}
                    ]}),
                    &context("K1"),
                )
                .await,
        );
        assert_eq!(value["results"][0]["elevation"], 1608.6);
        assert_eq!(value["results"][1]["location"]["lng"], -116.87);
    }

    #[tokio::test]
    async fn test_elevation_requires_locations() {
        let tool = ElevationTool::new(client("http://127.0.0.1:9"));
        let response = tool.invoke(json!({"locations": []}), &context("K1")).await;
        assert!(error_text(&response).starts_with("The locations parameter"));
    }
}
