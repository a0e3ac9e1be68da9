//! Unit tests for configuration loading and root folder resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate SCHEMATIC_ROOT_FOLDER, S3_* or AI_SERVICE_URL are marked
//! with #[serial] so they run sequentially.

use schematic_common::config::{
    default_root_folder, AiServiceConfig, RootFolderInitializer, RootFolderResolver, StorageConfig,
    TomlConfig, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolver = RootFolderResolver::new("test-module");
    assert_eq!(resolver.resolve(), default_root_folder());
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/schematic-env-root");

    let resolver = RootFolderResolver::new("test-module")
        .with_toml_root(Some(PathBuf::from("/tmp/schematic-toml-root")));
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/schematic-env-root"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_uses_toml_without_env() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolver = RootFolderResolver::new("test-module")
        .with_toml_root(Some(PathBuf::from("/tmp/schematic-toml-root")));
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/schematic-toml-root"));
}

#[test]
fn test_initializer_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("root");
    let initializer = RootFolderInitializer::new(root.clone());

    assert!(!initializer.database_path().exists());
    initializer.ensure_directory_exists().unwrap();
    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("schematic.db"));
}

#[test]
fn test_missing_config_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = TomlConfig::load(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.storage.bucket, "smart-schematic");
    assert_eq!(config.storage.region, "auto");
    assert!(config.storage.force_path_style);
    assert_eq!(config.storage.presign_expiry_secs, 3600);
    assert_eq!(config.ai_service.port, 8000);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_partial_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
root_folder = "/srv/schematic"

[server]
port = 4100

[storage]
endpoint = "https://account.r2.cloudflarestorage.com"
bucket = "plans"

[ai_service]
url = "http://gpu-box:8000"
"#
    )
    .unwrap();

    let config = TomlConfig::load(file.path()).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/schematic")));
    assert_eq!(config.server.port, 4100);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(
        config.storage.endpoint.as_deref(),
        Some("https://account.r2.cloudflarestorage.com")
    );
    assert_eq!(config.storage.bucket, "plans");
    assert_eq!(config.storage.region, "auto");
    assert!(!config.ai_service.use_mock());
    assert_eq!(config.ai_service.base_url(), "http://gpu-box:8000");
}

#[test]
fn test_malformed_config_is_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server\nport = ").unwrap();

    assert!(TomlConfig::load(file.path()).is_err());
}

#[test]
fn test_mock_mode_selection() {
    let unset = AiServiceConfig::default();
    assert!(unset.use_mock());
    assert_eq!(unset.base_url(), "http://localhost:8000");

    let local = AiServiceConfig {
        url: Some("http://localhost:8000".to_string()),
        ..AiServiceConfig::default()
    };
    assert!(local.use_mock());

    let remote = AiServiceConfig {
        url: Some("http://ai.internal:8000".to_string()),
        ..AiServiceConfig::default()
    };
    assert!(!remote.use_mock());
}

#[test]
#[serial]
fn test_storage_env_overrides() {
    env::set_var("S3_BUCKET_NAME", "env-bucket");
    env::set_var("S3_REGION", "eu-west-1");
    env::set_var("S3_ENDPOINT", "");

    let storage = StorageConfig::default().apply_env();
    assert_eq!(storage.bucket, "env-bucket");
    assert_eq!(storage.region, "eu-west-1");
    // Empty values are ignored
    assert_eq!(storage.endpoint, None);

    env::remove_var("S3_BUCKET_NAME");
    env::remove_var("S3_REGION");
    env::remove_var("S3_ENDPOINT");
}

#[test]
#[serial]
fn test_ai_service_env_override() {
    env::set_var("AI_SERVICE_URL", "http://remote:9000");
    let config = TomlConfig::default().apply_env();
    assert_eq!(config.ai_service.url.as_deref(), Some("http://remote:9000"));
    env::remove_var("AI_SERVICE_URL");
}
