//! Config loading, TOML parsing, and default tests.

use anyhow::Result;
use latlog::{EngineConfig, QueueStrategy};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> Result<String> {
    let path = dir.path().join("latlog.toml");
    fs::write(&path, contents)?;
    Ok(path.to_string_lossy().into_owned())
}

// Default Configuration Tests
#[test]
fn test_config_default_gas() {
    let config = EngineConfig::default();
    assert_eq!(config.engine.default_gas, 10_000);
}

#[test]
fn test_config_default_queue_strategy() {
    let config = EngineConfig::default();
    assert_eq!(config.engine.queue_strategy, QueueStrategy::ConclusionsFirst);
}

#[test]
fn test_config_default_logging() {
    let config = EngineConfig::default();
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "text");
}

// File Loading Tests
#[test]
fn test_config_from_file_full() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[engine]
default_gas = 500
queue_strategy = "fifo"

[logging]
level = "trace"
format = "json"
"#,
    )?;

    let config = EngineConfig::from_file(&path)?;
    assert_eq!(config.engine.default_gas, 500);
    assert_eq!(config.engine.queue_strategy, QueueStrategy::Fifo);
    assert_eq!(config.logging.level, "trace");
    assert_eq!(config.logging.format, "json");
    Ok(())
}

#[test]
fn test_config_from_file_partial_falls_back_to_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[engine]
default_gas = 42
"#,
    )?;

    let config = EngineConfig::from_file(&path)?;
    assert_eq!(config.engine.default_gas, 42);
    assert_eq!(config.engine.queue_strategy, QueueStrategy::ConclusionsFirst);
    assert_eq!(config.logging.level, "info");
    Ok(())
}

#[test]
fn test_config_from_missing_file_uses_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("nonexistent.toml");

    // figment treats a missing TOML file as an empty provider.
    let config = EngineConfig::from_file(&path.to_string_lossy())?;
    assert_eq!(config.engine.default_gas, 10_000);
    Ok(())
}

#[test]
fn test_config_rejects_malformed_values() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[engine]
queue_strategy = "definitely_not_a_strategy"
"#,
    )?;

    assert!(EngineConfig::from_file(&path).is_err());
    Ok(())
}

// Serialization Tests
#[test]
fn test_config_toml_roundtrip() -> Result<()> {
    let mut config = EngineConfig::default();
    config.engine.default_gas = 777;
    config.logging.level = "debug".to_string();

    let serialized = toml::to_string(&config)?;
    let dir = TempDir::new()?;
    let path = write_config(&dir, &serialized)?;

    let reloaded = EngineConfig::from_file(&path)?;
    assert_eq!(reloaded.engine.default_gas, 777);
    assert_eq!(reloaded.logging.level, "debug");
    Ok(())
}

#[test]
fn test_queue_strategy_selects_an_order() {
    // Both strategies resolve to callable patch orders.
    let _ = QueueStrategy::ConclusionsFirst.order();
    let _ = QueueStrategy::Fifo.order();
}
