//! Environment variable handling.

use crate::secret::SecretString;
use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Process-wide default Maps credential, used when a session has none bound.
pub fn default_api_key() -> Option<SecretString> {
    get_var(vars::NS_API_KEY).map(SecretString::new)
}

/// Load environment variables from a .env file in the working directory.
///
/// Variables that are already set are left untouched.
pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = std::path::Path::new(".env");
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        for (key, value) in parse_dotenv(&content) {
            if env::var(&key).is_err() {
                env::set_var(key, value);
            }
        }
    }
    Ok(())
}

/// Parse `KEY=value` lines, skipping comments and blank lines.
fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Common environment variable names.
pub mod vars {
    /// Default Maps API key for callers that bind no credential.
    pub const NS_API_KEY: &str = "NS_API_KEY";

    /// Listening port override.
    pub const PORT: &str = "PORT";

    /// Bind mode override.
    pub const MAPGATE_BIND: &str = "MAPGATE_BIND";

    /// Config file override.
    pub const MAPGATE_CONFIG: &str = "MAPGATE_CONFIG";

    /// Maps web service base URL override.
    pub const MAPS_API_BASE: &str = "MAPS_API_BASE";
}
