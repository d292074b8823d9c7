//! HTTP client for the Maps web services.

use crate::Result;
use mapgate_core::error::ToolError;
use mapgate_core::SecretString;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Outbound client shared by every Maps tool.
pub struct MapsClient {
    /// HTTP client.
    client: Client,

    /// API base URL, without trailing slash.
    api_base: String,
}

/// Fields every Maps web service response carries.
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
}

impl MapsClient {
    /// Create a new client for the given base URL.
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Call `<api_base>/<service>/json` and decode the body.
    ///
    /// `context` names the operation in upstream failure messages, e.g.
    /// "Geocoding" yields "Geocoding failed: ZERO_RESULTS".
    pub async fn get<T: DeserializeOwned>(
        &self,
        service: &str,
        params: &[(&str, String)],
        key: &SecretString,
        context: &str,
    ) -> Result<T> {
        let url = format!("{}/{}/json", self.api_base, service);
        let start = Instant::now();

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", key.expose_secret())])
            .send()
            .await
            .map_err(|e| {
                warn!("Maps request to {} failed: {}", service, e);
                ToolError::transport(strip_key(&e.to_string(), key))
            })?;

        let http_status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ToolError::transport(strip_key(&e.to_string(), key)))?;

        debug!(
            "Maps {} responded {} in {}ms",
            service,
            http_status,
            start.elapsed().as_millis()
        );

        let value: serde_json::Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) if !http_status.is_success() => {
                return Err(ToolError::upstream(
                    context,
                    http_status.as_u16().to_string(),
                    http_status.canonical_reason().map(str::to_string),
                ));
            }
            Err(e) => {
                return Err(ToolError::transport(format!("Invalid response body: {}", e)));
            }
        };

        let envelope: StatusEnvelope = serde_json::from_value(value.clone())
            .map_err(|e| ToolError::transport(format!("Malformed response: {}", e)))?;
        if envelope.status != "OK" {
            return Err(ToolError::upstream(
                context,
                envelope.status,
                envelope.error_message,
            ));
        }

        serde_json::from_value(value)
            .map_err(|e| ToolError::transport(format!("Unexpected response shape: {}", e)))
    }
}

/// Remove the credential from error text, since reqwest errors embed the URL.
fn strip_key(message: &str, key: &SecretString) -> String {
    if key.is_blank() {
        return message.to_string();
    }
    message.replace(key.expose_secret(), "[REDACTED]")
}
