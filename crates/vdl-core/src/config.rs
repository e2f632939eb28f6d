use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Backoff between retry passes (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Base delay in seconds before the first retry pass.
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_secs: 2.0,
            max_delay_secs: 30,
        }
    }
}

/// External downloader invocation (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Program to execute, looked up on PATH when not absolute.
    pub program: String,
    /// Arguments placed before the generated ones, e.g. `["-m", "yt_dlp"]` with `python3`.
    #[serde(default)]
    pub prefix_args: Vec<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            prefix_args: Vec::new(),
        }
    }
}

/// Height limit passed to the downloader; `Best` means no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quality {
    #[default]
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "360p")]
    P360,
}

impl Quality {
    /// Vertical resolution for the sort constraint, `None` for `Best`.
    pub fn height(self) -> Option<u32> {
        match self {
            Quality::Best => None,
            Quality::P720 => Some(720),
            Quality::P480 => Some(480),
            Quality::P360 => Some(360),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quality::Best => "best",
            Quality::P720 => "720p",
            Quality::P480 => "480p",
            Quality::P360 => "360p",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "best" => Ok(Quality::Best),
            "720p" => Ok(Quality::P720),
            "480p" => Ok(Quality::P480),
            "360p" => Ok(Quality::P360),
            other => Err(format!("unknown quality '{other}' (expected best|720p|480p|360p)")),
        }
    }
}

/// Global configuration loaded from `~/.config/vdl/config.toml`.
/// Command-line flags override every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VdlConfig {
    /// Simultaneous downloads.
    pub threads: usize,
    /// Extra attempts for tasks whose downloader exited with an error.
    pub retries: u32,
    pub quality: Quality,
    pub output_dir: PathBuf,
    /// Dashboard redraw cadence in milliseconds.
    pub refresh_interval_ms: u64,
    #[serde(default)]
    pub tool: Option<ToolConfig>,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for VdlConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            retries: 2,
            quality: Quality::Best,
            output_dir: PathBuf::from("./downloads"),
            refresh_interval_ms: 1000,
            tool: None,
            retry: None,
        }
    }
}

impl VdlConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(50))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: VdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
