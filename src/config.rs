use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub polling: Polling,
    #[serde(default)]
    pub export: Export,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Default::default(),
            identity: Default::default(),
            polling: Default::default(),
            export: Default::default(),
            logging: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Backend {
    pub base_url: String,
    pub connect_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
}
impl Default for Backend {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api/v1".into(),
            connect_timeout_seconds: 30,
            request_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    /// Recorded as `created_by` on reports this client creates.
    pub display_name: String,
}
impl Default for Identity {
    fn default() -> Self {
        Self {
            display_name: "gapsheet".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Polling {
    pub max_attempts: u32,
    pub delay_seconds: u64,
}
impl Default for Polling {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Export {
    pub out_dir: String,
    pub narrow_column_width: f64,
    pub wide_column_width: f64,
}
impl Default for Export {
    fn default() -> Self {
        Self {
            out_dir: "exports".into(),
            narrow_column_width: 20.0,
            wide_column_width: 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
