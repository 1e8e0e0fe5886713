//! Configuration file loading tests.

use rov_common::config::{ConfigError, ConfigLoader, LogLevel, SurfaceConfig};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[test]
fn test_config_loader_file_not_found() {
    let result = SurfaceConfig::load(Path::new("/nonexistent/path/surface.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound)));
}

#[test]
fn test_config_loader_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "invalid toml {{{{").unwrap();

    let result = SurfaceConfig::load(file.path());
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_config_loader_wrong_type_is_a_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[connection]
port = "fifty thousand"
"#
    )
    .unwrap();
    file.flush().unwrap();

    let result = SurfaceConfig::load(file.path());
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_config_loader_success() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[shared]
log_level = "debug"
service_name = "surface-test"

[connection]
host = "10.0.0.2"
port = 6000
buffer_size = 1024
peer = "surface-pi"
poll_interval_ms = 250

[control]
tick_ms = 20

[input]
device = "/dev/input/event7"
dead_zone = 2000
"#
    )
    .unwrap();
    file.flush().unwrap();

    let config = SurfaceConfig::load(file.path()).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert_eq!(config.shared.service_name, "surface-test");
    assert_eq!(config.connection.address(), "10.0.0.2:6000");
    assert_eq!(config.connection.buffer_size, 1024);
    assert_eq!(config.connection.poll_interval_ms, 250);
    assert_eq!(config.control.tick_ms, 20);
    assert_eq!(
        config.input.device.as_deref(),
        Some(Path::new("/dev/input/event7"))
    );
    assert_eq!(config.input.dead_zone, 2000);
}

#[test]
fn test_loaded_config_is_validated_separately() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[connection]
peer = ""
"#
    )
    .unwrap();
    file.flush().unwrap();

    let config = SurfaceConfig::load(file.path()).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError(_))
    ));
}
