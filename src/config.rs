use crate::df::FilesystemConfig;
use crate::temperature::TemperatureConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub filesystems: FilesystemConfig,

    #[serde(default)]
    pub temperature: TemperatureConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Mountpoint glob patterns skipped when reading the local machine
    pub exclude: Vec<String>,
    /// Report all sensors as one summarised check instead of one per sensor
    pub summarize_sensors: bool,
    /// Value store location; unset = the platform data directory
    pub state_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            exclude:           vec!["/proc*".into(), "/sys*".into(), "/dev*".into(), "/run/user*".into(), "/snap*".into()],
            summarize_sensors: false,
            state_file:        None,
        }
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    /// Load `path`, or the default location when `path` is `None`.
    ///
    /// A missing default file is created with the defaults (best effort);
    /// an explicit path must exist. Malformed files are always an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match Self::config_path() {
                Some(p) if p.exists() => Self::from_file(&p),
                Some(p) => {
                    if let Err(e) = try_write_defaults(&p) {
                        tracing::debug!(path = %p.display(), error = %e, "could not write default config");
                    }
                    Ok(Config::default())
                }
                None => Ok(Config::default()),
            },
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("levelwatch").join("levelwatch.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let cfg: Config = toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        cfg.filesystems.validate().with_context(|| format!("checking {}", path.display()))?;
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn try_write_defaults(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = Config::default().to_toml()?;
    fs::write(path, format!("# levelwatch configuration\n# Generated on first run, edit freely\n\n{}", text))?;
    Ok(())
}
