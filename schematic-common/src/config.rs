//! Configuration loading and root folder resolution
//!
//! Bootstrap settings are resolved in priority order:
//! 1. Command-line argument (handled by each binary via clap)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the data root folder
pub const ROOT_FOLDER_ENV: &str = "SCHEMATIC_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "schematic.db";

/// AI service URL that selects mock processing
pub const MOCK_AI_SERVICE_URL: &str = "http://localhost:8000";

/// Bootstrap configuration loaded from TOML
///
/// Every section is optional. A missing file produces the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Data root folder (database lives here)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub ai_service: AiServiceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener for the web API
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

/// S3-compatible object storage (AWS S3, Cloudflare R2, MinIO)
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Custom endpoint; AWS regional endpoint when absent
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    /// Required for R2 and MinIO
    #[serde(default = "default_true")]
    pub force_path_style: bool,
    #[serde(default = "default_presign_expiry")]
    pub presign_expiry_secs: u64,
}

/// AI processing microservice
#[derive(Debug, Clone, Deserialize)]
pub struct AiServiceConfig {
    /// Base URL the web API calls
    #[serde(default)]
    pub url: Option<String>,
    /// Port the AI service listens on
    #[serde(default = "default_ai_port")]
    pub port: u16,
    /// Pause between pipeline stages
    #[serde(default = "default_stage_delay")]
    pub stage_delay_ms: u64,
    /// Front-end origin allowed by CORS
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
    /// How long finished jobs stay pollable
    #[serde(default = "default_job_retention")]
    pub job_retention_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    3000
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_bucket() -> String {
    "smart-schematic".to_string()
}

fn default_true() -> bool {
    true
}

fn default_presign_expiry() -> u64 {
    3600
}

fn default_ai_port() -> u16 {
    8000
}

fn default_stage_delay() -> u64 {
    250
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_job_retention() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_api_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: default_region(),
            bucket: default_bucket(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            force_path_style: true,
            presign_expiry_secs: default_presign_expiry(),
        }
    }
}

impl Default for AiServiceConfig {
    fn default() -> Self {
        Self {
            url: None,
            port: default_ai_port(),
            stage_delay_ms: default_stage_delay(),
            allowed_origin: default_allowed_origin(),
            job_retention_secs: default_job_retention(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TomlConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing file is not an error: defaults are returned and a warning logged.
    /// A file that exists but fails to parse is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Platform config file location: `<config_dir>/smart-schematic/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("smart-schematic").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Apply environment overrides to every section that supports them
    pub fn apply_env(mut self) -> Self {
        self.storage = self.storage.apply_env();
        self.ai_service = self.ai_service.apply_env();
        self
    }
}

impl StorageConfig {
    /// Overlay `S3_*` environment variables
    pub fn apply_env(mut self) -> Self {
        if let Some(endpoint) = non_empty_env("S3_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(region) = non_empty_env("S3_REGION") {
            self.region = region;
        }
        if let Some(bucket) = non_empty_env("S3_BUCKET_NAME") {
            self.bucket = bucket;
        }
        if let Some(key) = non_empty_env("S3_ACCESS_KEY_ID") {
            self.access_key_id = key;
        }
        if let Some(secret) = non_empty_env("S3_SECRET_ACCESS_KEY") {
            self.secret_access_key = secret;
        }
        self
    }
}

impl AiServiceConfig {
    /// Overlay `AI_SERVICE_URL`
    pub fn apply_env(mut self) -> Self {
        if let Some(url) = non_empty_env("AI_SERVICE_URL") {
            self.url = Some(url);
        }
        self
    }

    /// Effective base URL of the AI service
    pub fn base_url(&self) -> &str {
        self.url.as_deref().unwrap_or(MOCK_AI_SERVICE_URL)
    }

    /// Processing fabricates analysis data when the service is the local default or unset
    pub fn use_mock(&self) -> bool {
        match self.url.as_deref() {
            None => true,
            Some(url) => url == MOCK_AI_SERVICE_URL,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolves the data root folder for a service
pub struct RootFolderResolver {
    module_name: String,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            toml_root: None,
        }
    }

    /// Supply the `root_folder` value from a loaded TOML config
    pub fn with_toml_root(mut self, root: Option<PathBuf>) -> Self {
        self.toml_root = root;
        self
    }

    /// Resolve: environment, then TOML, then OS default
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = non_empty_env(ROOT_FOLDER_ENV) {
            info!(module = %self.module_name, "Root folder from {}", ROOT_FOLDER_ENV);
            return PathBuf::from(path);
        }

        if let Some(path) = &self.toml_root {
            info!(module = %self.module_name, "Root folder from TOML config");
            return path.clone();
        }

        default_root_folder()
    }
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("smart-schematic"))
        .unwrap_or_else(|| PathBuf::from("./smart-schematic-data"))
}

/// Creates the root folder and locates files inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder if it does not exist
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }
}
