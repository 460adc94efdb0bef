use anyhow::Context;
use docweave_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "docweave.config.json";

/// Docweave configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory containing templates
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Directory rendered templates are written to
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// File extension of templates inside `srcDir`
    #[serde(default = "default_extension")]
    pub template_extension: String,

    /// JSON data file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<String>,

    /// Base directory for `Image` and `Import` resources (defaults to `srcDir`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_dir: Option<String>,

    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_src_dir() -> String {
    "templates".to_string()
}

fn default_out_dir() -> String {
    "out".to_string()
}

fn default_extension() -> String {
    "txt".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid config file {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn get_src_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.src_dir)
    }

    pub fn get_out_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.out_dir)
    }

    pub fn get_data_file(&self, cwd: &Path) -> Option<PathBuf> {
        self.data_file.as_ref().map(|file| cwd.join(file))
    }

    pub fn get_resource_dir(&self, cwd: &Path) -> PathBuf {
        match &self.resource_dir {
            Some(dir) => cwd.join(dir),
            None => self.get_src_dir(cwd),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            out_dir: default_out_dir(),
            template_extension: default_extension(),
            data_file: None,
            resource_dir: None,
            engine: EngineConfig::default(),
        }
    }
}
