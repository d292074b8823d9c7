//! Config write/load roundtrip tests.
//!
//! The rendered configuration must load back with identical field values.

use mapgate_core::config::{BindMode, Config};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_render_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapgate.json5");

    let config = Config::default();
    std::fs::write(&path, config.to_json5().unwrap()).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.gateway.port, config.gateway.port);
    assert_eq!(loaded.gateway.bind, config.gateway.bind);
    assert_eq!(loaded.gateway.tool_timeout_secs, config.gateway.tool_timeout_secs);
    assert_eq!(loaded.server.name, config.server.name);
    assert_eq!(loaded.maps.api_base, config.maps.api_base);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapgate.json5");

    let mut config = Config::default();
    config.gateway.port = 9090;
    config.gateway.bind = BindMode::Lan;
    config.gateway.max_sessions = 8;
    std::fs::write(&path, config.to_json5().unwrap()).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.gateway.port, 9090);
    assert_eq!(loaded.gateway.bind, BindMode::Lan);
    assert_eq!(loaded.gateway.max_sessions, 8);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapgate.json5");
    std::fs::write(&path, "{ // comments are fine\n gateway: { port: 4100 } }").unwrap();

    let loaded = Config::load(&path).unwrap();
    let defaults = Config::default();
    assert_eq!(loaded.gateway.port, 4100);
    assert_eq!(loaded.gateway.keep_alive_secs, defaults.gateway.keep_alive_secs);
    assert_eq!(loaded.maps.request_timeout_secs, defaults.maps.request_timeout_secs);
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/mapgate.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}
