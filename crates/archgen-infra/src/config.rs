//! Pipeline configuration loader.
//!
//! Reads `config.toml` from the data directory (`~/.archgen/` in
//! production) and deserializes it into
//! [`PipelineConfig`](archgen_types::config::PipelineConfig). Falls back
//! to defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use archgen_types::config::PipelineConfig;

/// Resolve the data directory from `ARCHGEN_DATA_DIR`, falling back to
/// `~/.archgen`.
pub fn default_data_dir() -> PathBuf {
    std::env::var("ARCHGEN_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".archgen")
        })
}

/// Load pipeline configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`PipelineConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns
///   the default.
/// - If the file exists and parses successfully, returns the parsed
///   config (missing fields take their serde defaults).
pub async fn load_pipeline_config(data_dir: &Path) -> PipelineConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return PipelineConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return PipelineConfig::default();
        }
    };

    match toml::from_str::<PipelineConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            PipelineConfig::default()
        }
    }
}
