use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::LinkError;

pub const DEFAULT_CONFIG_FILE: &str = "enzlink.json";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CHUNK_SIZE: usize = 50;
pub const DEFAULT_SLEEP_SECS: f64 = 0.5;

/// On-disk `enzlink.json`. Every field is optional; CLI flags override these
/// values and these values override the built-in defaults.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default)]
    pub sleep_secs: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub data_dir: Utf8PathBuf,
    pub chunk_size: usize,
    pub sleep: Duration,
}

impl ResolvedConfig {
    pub fn enzyme_dat(&self) -> Utf8PathBuf {
        self.data_dir.join("raw").join("enzyme.dat")
    }

    pub fn enzyme_raw(&self) -> Utf8PathBuf {
        self.processed("enzyme_raw.tsv")
    }

    pub fn pairs(&self) -> Utf8PathBuf {
        self.processed("enzyme_uniprot_pairs.tsv")
    }

    pub fn sequences(&self) -> Utf8PathBuf {
        self.processed("uniprot_sequences.tsv")
    }

    pub fn missing(&self) -> Utf8PathBuf {
        self.processed("uniprot_missing_ids.tsv")
    }

    pub fn master(&self) -> Utf8PathBuf {
        self.processed("enzyme_master.tsv")
    }

    fn processed(&self, name: &str) -> Utf8PathBuf {
        self.data_dir.join("processed").join(name)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve configuration from an explicit path, the default
    /// `enzlink.json` when present, or built-in defaults otherwise. An
    /// explicitly named file that cannot be read is an error; a missing
    /// default file is not.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, LinkError> {
        let config_path = Utf8PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));

        if path.is_none() && !config_path.as_std_path().exists() {
            return Ok(Self::resolve_config(Config::default()));
        }

        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| LinkError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| LinkError::ConfigParse(err.to_string()))?;
        Ok(Self::resolve_config(config))
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        ResolvedConfig {
            data_dir: Utf8PathBuf::from(
                config.data_dir.unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            ),
            chunk_size: config.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            sleep: Duration::from_secs_f64(config.sleep_secs.unwrap_or(DEFAULT_SLEEP_SECS)),
        }
    }
}
