use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bugzap_engine::{FileConfig, ProbeConfig};
use bugzap_logging::{engine_info, engine_warn};

const CONFIG_FILENAME: &str = "bugzap.ron";

/// Builds the probe configuration once at startup.
///
/// An explicit `--config` must load; the implicit `./bugzap.ron` is optional
/// and falls back to defaults when unreadable.
pub(crate) fn load_probe_config(
    explicit: Option<&Path>,
    api_url: Option<&str>,
) -> anyhow::Result<ProbeConfig> {
    let file = match explicit {
        Some(path) => read_file_config(path)?,
        None => read_default_file_config(),
    };

    let mut config = ProbeConfig::from_sources(file, |key| std::env::var(key).ok());
    if let Some(url) = api_url.map(str::trim).filter(|url| !url.is_empty()) {
        config.base_url = Some(url.to_string());
    }
    Ok(config)
}

fn read_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = parse_file_config(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    engine_info!("Loaded config from {:?}", path);
    Ok(config)
}

fn read_default_file_config() -> FileConfig {
    let path = PathBuf::from(CONFIG_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return FileConfig::default();
        }
        Err(err) => {
            engine_warn!("Failed to read config from {:?}: {}", path, err);
            return FileConfig::default();
        }
    };

    match parse_file_config(&content) {
        Ok(config) => {
            engine_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            engine_warn!("Failed to parse config from {:?}: {}", path, err);
            FileConfig::default()
        }
    }
}

fn parse_file_config(content: &str) -> Result<FileConfig, ron::error::SpannedError> {
    ron::from_str(content)
}
