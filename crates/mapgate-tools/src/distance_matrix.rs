//! Travel distance and time between many origins and destinations.

use crate::{parse_args, MapsClient, Result, Tool, ToolContext, TravelMode};
use async_trait::async_trait;
use mapgate_core::error::ToolError;
use mapgate_core::types::ToolDefinition;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Tool computing a distance matrix.
pub struct DistanceMatrixTool {
    client: Arc<MapsClient>,
}

impl DistanceMatrixTool {
    pub fn new(client: Arc<MapsClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DistanceMatrixArgs {
    #[serde(default)]
    origins: Vec<String>,
    #[serde(default)]
    destinations: Vec<String>,
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    #[serde(default)]
    origin_addresses: Vec<String>,
    #[serde(default)]
    destination_addresses: Vec<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    #[serde(default)]
    duration: Option<Value>,
    #[serde(default)]
    distance: Option<Value>,
}

#[async_trait]
impl Tool for DistanceMatrixTool {
    fn name(&self) -> &str {
        "maps_distance_matrix"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "maps_distance_matrix".to_string(),
            description: "Calculate travel distance and time for multiple origins and destinations."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "origins": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Array of origin addresses or coordinates"
                    },
                    "destinations": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Array of destination addresses or coordinates"
                    },
                    "mode": {
                        "type": "string",
                        "description": "Travel mode (driving, walking, bicycling, transit)",
                        "enum": ["driving", "walking", "bicycling", "transit"]
                    }
                },
                "required": ["origins", "destinations", "mode"]
            }),
        }
    }

    async fn execute(&self, args: Value, context: &ToolContext) -> Result<Value> {
        let key = context.api_key()?;
        let args: DistanceMatrixArgs = parse_args(args)?;
        if args.origins.is_empty() {
            return Err(ToolError::invalid_input(
                "The origins parameter should be provided with at least one value to get the distance to the destinations.",
            ));
        }
        if args.destinations.is_empty() {
            return Err(ToolError::invalid_input(
                "The destinations parameter should be provided with at least one value to get the distance to the origins.",
            ));
        }
        let mode = args.mode.as_deref().and_then(TravelMode::parse).ok_or_else(|| {
            ToolError::invalid_input(
                "The mode parameter should be provided with a value of 'driving', 'walking', 'bicycling' or 'transit'.",
            )
        })?;

        let params = [
            ("origins", args.origins.join("|")),
            ("destinations", args.destinations.join("|")),
            ("mode", mode.as_str().to_string()),
        ];
        let data: DistanceMatrixResponse = self
            .client
            .get("distancematrix", &params, key, "Distance matrix request")
            .await?;

        let results: Vec<Value> = data
            .rows
            .into_iter()
            .map(|row| {
                let elements: Vec<Value> = row
                    .elements
                    .into_iter()
                    .map(|e| {
                        json!({
                            "status": e.status,
                            "duration": e.duration,
                            "distance": e.distance
                        })
                    })
                    .collect();
                json!({ "elements": elements })
            })
            .collect();

        Ok(json!({
            "origin_addresses": data.origin_addresses,
            "destination_addresses": data.destination_addresses,
            "results": results
        }))
    }
}
