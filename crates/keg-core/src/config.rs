use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides `go_bin`.
pub const GO_BIN_ENV: &str = "KEG_GO";

/// Archive fetch parameters (optional `[fetch]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Seconds to wait for the TCP/TLS connection.
    pub connect_timeout_secs: u64,
    /// Upper bound in seconds for the whole transfer.
    pub timeout_secs: u64,
    /// Maximum number of HTTP redirects to follow.
    pub max_redirections: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 600,
            max_redirections: 10,
        }
    }
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/keg/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KegConfig {
    /// Install prefix; binaries land at `<prefix>/<build.output>`.
    /// None = `$XDG_DATA_HOME/keg`.
    #[serde(default)]
    pub prefix: Option<PathBuf>,
    /// Go toolchain executable (name on PATH or absolute path).
    #[serde(default = "default_go_bin")]
    pub go_bin: String,
    #[serde(default)]
    pub fetch: FetchConfig,
}

fn default_go_bin() -> String {
    "go".to_string()
}

impl Default for KegConfig {
    fn default() -> Self {
        Self {
            prefix: None,
            go_bin: default_go_bin(),
            fetch: FetchConfig::default(),
        }
    }
}

impl KegConfig {
    /// Resolved install prefix: explicit setting, else `$XDG_DATA_HOME/keg`.
    pub fn resolve_prefix(&self) -> Result<PathBuf> {
        if let Some(p) = &self.prefix {
            return Ok(p.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("keg")?;
        Ok(xdg_dirs.get_data_home())
    }

    /// Go executable, honoring `KEG_GO` over the config file.
    pub fn resolve_go_bin(&self) -> String {
        match std::env::var(GO_BIN_ENV) {
            Ok(v) if !v.trim().is_empty() => v,
            _ => self.go_bin.clone(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("keg")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<KegConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = KegConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: KegConfig = toml::from_str(&data)?;
    Ok(cfg)
}
