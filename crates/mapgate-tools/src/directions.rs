//! Directions between two points.

use crate::{parse_args, MapsClient, Result, Tool, ToolContext, TravelMode};
use async_trait::async_trait;
use mapgate_core::error::ToolError;
use mapgate_core::types::ToolDefinition;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Tool returning routes between an origin and a destination.
pub struct DirectionsTool {
    client: Arc<MapsClient>,
}

impl DirectionsTool {
    pub fn new(client: Arc<MapsClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DirectionsArgs {
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: Value,
    duration: Value,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    #[serde(default)]
    html_instructions: String,
    distance: Value,
    duration: Value,
    #[serde(default)]
    travel_mode: String,
}

#[async_trait]
impl Tool for DirectionsTool {
    fn name(&self) -> &str {
        "maps_directions"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "maps_directions".to_string(),
            description: "Get directions between two points.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "origin": {
                        "type": "string",
                        "description": "Origin address or coordinates"
                    },
                    "destination": {
                        "type": "string",
                        "description": "Destination address or coordinates"
                    },
                    "mode": {
                        "type": "string",
                        "description": "Travel mode (driving, walking, bicycling, transit)",
                        "enum": ["driving", "walking", "bicycling", "transit"]
                    }
                },
                "required": ["origin", "destination"]
            }),
        }
    }

    async fn execute(&self, args: Value, context: &ToolContext) -> Result<Value> {
        let key = context.api_key()?;
        let args: DirectionsArgs = parse_args(args)?;
        let origin = args.origin.filter(|o| !o.is_empty()).ok_or_else(|| {
            ToolError::invalid_input("The origin parameter should be provided to get directions.")
        })?;
        let destination = args.destination.filter(|d| !d.is_empty()).ok_or_else(|| {
            ToolError::invalid_input("The destination parameter should be provided to get directions.")
        })?;
        let mode = match args.mode.as_deref() {
            None | Some("") => None,
            Some(mode) => Some(TravelMode::parse(mode).ok_or_else(|| {
                ToolError::invalid_input(
                    "The mode parameter should be one of 'driving', 'walking', 'bicycling' or 'transit'.",
                )
            })?),
        };

        let mut params = vec![("origin", origin), ("destination", destination)];
        if let Some(mode) = mode {
            params.push(("mode", mode.as_str().to_string()));
        }
        let data: DirectionsResponse = self
            .client
            .get("directions", &params, key, "Directions request")
            .await?;

        let routes: Vec<Value> = data
            .routes
            .into_iter()
            .filter_map(|route| {
                let leg = route.legs.into_iter().next()?;
                let steps: Vec<Value> = leg
                    .steps
                    .into_iter()
                    .map(|step| {
                        json!({
                            "instructions": step.html_instructions,
                            "distance": step.distance,
                            "duration": step.duration,
                            "travel_mode": step.travel_mode
                        })
                    })
                    .collect();
                Some(json!({
                    "summary": route.summary,
                    "distance": leg.distance,
                    "duration": leg.duration,
                    "steps": steps
                }))
            })
            .collect();

        Ok(json!({ "routes": routes }))
    }
}
