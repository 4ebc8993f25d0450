//! Configuration management for the indexing service.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.
//! A `Config` is built once at startup and handed to component
//! constructors.

use crate::core::error::{IndexError, Result};
use crate::core::types::EntityKind;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Content roots holding file bytes. The first entry is primary.
    #[serde(default = "default_mcdir")]
    pub mcdir: Vec<PathBuf>,

    /// Directory for the search index
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,
}

/// Content extraction configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// Files larger than this are never read for content
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: u64,

    /// External text-extraction program
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Arguments passed before the file path
    #[serde(default = "default_tool_args")]
    pub tool_args: Vec<String>,

    /// Media types served through a generated JPEG preview
    #[serde(default = "default_convertible_media_types")]
    pub convertible_media_types: Vec<String>,
}

/// Indexing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexingConfig {
    /// Logical index every document is written to
    #[serde(default = "default_index_name")]
    pub index_name: String,

    #[serde(default = "default_file_batch_size")]
    pub file_batch_size: usize,

    #[serde(default = "default_batch_size")]
    pub sample_batch_size: usize,

    #[serde(default = "default_batch_size")]
    pub process_batch_size: usize,

    #[serde(default = "default_batch_size")]
    pub project_batch_size: usize,

    #[serde(default = "default_batch_size")]
    pub user_batch_size: usize,

    /// Tantivy writer heap in bytes
    #[serde(default = "default_writer_heap_bytes")]
    pub writer_heap_bytes: usize,
}

/// Directory scanner configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScannerConfig {
    /// Number of worker threads processing discovered files
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Glob patterns for paths to skip (directories are pruned)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_mcdir() -> Vec<PathBuf> {
    vec![PathBuf::from("/mcfs/data/materialscommons")]
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("./data/index")
}

fn default_max_content_bytes() -> u64 {
    2 * 1024 * 1024
}

fn default_tool() -> String {
    "tika.sh".to_string()
}

fn default_tool_args() -> Vec<String> {
    vec!["--text".to_string()]
}

fn default_convertible_media_types() -> Vec<String> {
    vec![
        "image/tiff".to_string(),
        "image/bmp".to_string(),
        "image/x-ms-bmp".to_string(),
    ]
}

fn default_index_name() -> String {
    "mc".to_string()
}

fn default_file_batch_size() -> usize {
    10
}

fn default_batch_size() -> usize {
    1000
}

fn default_writer_heap_bytes() -> usize {
    50_000_000
}

fn default_workers() -> usize {
    3
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5013
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mcdir: default_mcdir(),
            index_dir: default_index_dir(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: default_max_content_bytes(),
            tool: default_tool(),
            tool_args: default_tool_args(),
            convertible_media_types: default_convertible_media_types(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            index_name: default_index_name(),
            file_batch_size: default_file_batch_size(),
            sample_batch_size: default_batch_size(),
            process_batch_size: default_batch_size(),
            project_batch_size: default_batch_size(),
            user_batch_size: default_batch_size(),
            writer_heap_bytes: default_writer_heap_bytes(),
        }
    }
}

impl IndexingConfig {
    /// Batch threshold for an entity kind
    pub fn batch_size(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::File => self.file_batch_size,
            EntityKind::Sample => self.sample_batch_size,
            EntityKind::Process => self.process_batch_size,
            EntityKind::Project => self.project_batch_size,
            EntityKind::User => self.user_batch_size,
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| IndexError::Config(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    ///
    /// File lookup order:
    /// 1. MCINDEX_CONFIG env var
    /// 2. XDG config file (~/.config/mcindex/config.toml)
    /// 3. ./mcindex.toml
    /// 4. Defaults
    pub fn load() -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("MCINDEX_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mcindex")
                .join("config.toml");
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("mcindex.toml").exists() {
                Self::from_file("mcindex.toml")?
            } else {
                Self::default()
            }
        };

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // MCDIR may list several roots separated by ':'
        if let Ok(mcdir) = env::var("MCDIR") {
            let roots: Vec<PathBuf> = mcdir
                .split(':')
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
            if !roots.is_empty() {
                self.storage.mcdir = roots;
            }
        }
        if let Ok(index_dir) = env::var("MC_INDEX_DIR") {
            self.storage.index_dir = PathBuf::from(index_dir);
        }

        if let Ok(tool) = env::var("MC_TIKA") {
            self.extraction.tool = tool;
        }
        if let Ok(max_bytes) = env::var("MC_MAX_CONTENT_BYTES") {
            if let Ok(n) = max_bytes.parse() {
                self.extraction.max_content_bytes = n;
            }
        }

        if let Ok(index_name) = env::var("MC_INDEX_NAME") {
            self.indexing.index_name = index_name;
        }

        if let Ok(workers) = env::var("MC_SCAN_WORKERS") {
            if let Ok(n) = workers.parse() {
                self.scanner.workers = n;
            }
        }

        if let Ok(host) = env::var("MC_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("MC_SERVER_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.storage.mcdir.is_empty() {
            return Err(IndexError::Config(
                "At least one content root (mcdir) is required".to_string(),
            ));
        }

        if self.extraction.max_content_bytes == 0 {
            return Err(IndexError::Config(
                "Max content bytes must be non-zero".to_string(),
            ));
        }

        if self.indexing.index_name.trim().is_empty() {
            return Err(IndexError::Config(
                "Index name cannot be empty".to_string(),
            ));
        }

        for kind in EntityKind::ALL {
            if self.indexing.batch_size(kind) == 0 {
                return Err(IndexError::Config(format!(
                    "Batch size for {kind} must be non-zero"
                )));
            }
        }

        if self.scanner.workers == 0 {
            return Err(IndexError::Config(
                "Scanner workers must be non-zero".to_string(),
            ));
        }

        for pattern in &self.scanner.exclude_patterns {
            glob::Pattern::new(pattern).map_err(|e| {
                IndexError::Config(format!("Invalid exclude pattern '{pattern}': {e}"))
            })?;
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Content roots: {:?}", self.storage.mcdir);
        tracing::info!("  Index dir: {:?}", self.storage.index_dir);
        tracing::info!("  Index name: {}", self.indexing.index_name);
        tracing::info!(
            "  Max content size: {} bytes",
            self.extraction.max_content_bytes
        );
        tracing::info!("  Extraction tool: {}", self.extraction.tool);
        tracing::info!(
            "  Batch sizes: file={} sample={} process={} project={} user={}",
            self.indexing.file_batch_size,
            self.indexing.sample_batch_size,
            self.indexing.process_batch_size,
            self.indexing.project_batch_size,
            self.indexing.user_batch_size
        );
        tracing::info!("  Scanner workers: {}", self.scanner.workers);
        tracing::info!("  Server: {}:{}", self.server.host, self.server.port);
    }
}
