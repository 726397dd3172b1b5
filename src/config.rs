//! Run configuration loaded once at startup.
//!
//! Every field has a default, so a missing config file is fine: the job then
//! runs with the stock pacing (a post every 20 minutes, 30 minutes after a
//! failure) and a sample of 60 papers split evenly between the USA and the
//! rest of the world.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use itertools::Itertools;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration, deserialized from YAML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds to wait after a successful post.
    pub pause_duration: u64,
    /// Seconds to wait after a failed item.
    pub pause_error: u64,
    /// Number of papers to sample.
    pub n: usize,
    /// Share of the sample drawn from US papers, in `[0, 1]`.
    pub usa_proportion: f64,
    /// Folder for the dated log files.
    pub log_folder: PathBuf,
    /// Folder for downloaded front page images.
    pub img_folder: PathBuf,
    /// Save images under a `YYYYMMDD` subfolder of `img_folder`.
    pub img_folder_date: bool,
    pub sources: SourcesConfig,
    pub geocoder: GeocoderConfig,
    pub twitter: TwitterConfig,
}

/// Where the directory and detail pages live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub listing_url: String,
    /// Detail page URL with an `{id}` placeholder for the paper id.
    pub detail_url_template: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub api_base: String,
    pub upload_base: String,
    /// Credentials; usually supplied through the environment instead.
    pub keys: Option<TwitterKeys>,
}

/// OAuth 1.0a user credentials.
#[derive(Clone, Deserialize)]
pub struct TwitterKeys {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token_key: String,
    pub access_token_secret: String,
}

impl std::fmt::Debug for TwitterKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterKeys")
            .field("consumer_key", &self.consumer_key)
            .finish_non_exhaustive()
    }
}

/// How long to wait between items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PausePolicy {
    pub after_success: Duration,
    pub after_error: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pause_duration: 60 * 20,
            pause_error: 60 * 30,
            n: 60,
            usa_proportion: 0.5,
            log_folder: PathBuf::from("logs"),
            img_folder: PathBuf::from("images"),
            img_folder_date: false,
            sources: SourcesConfig::default(),
            geocoder: GeocoderConfig::default(),
            twitter: TwitterConfig::default(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            listing_url: "http://www.newseum.org/todaysfrontpages/?tfp_display=list".to_string(),
            detail_url_template: "http://www.newseum.org/todaysfrontpages/?tfp_id={id}".to_string(),
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.twitter.com/1.1".to_string(),
            upload_base: "https://upload.twitter.com/1.1".to_string(),
            keys: None,
        }
    }
}

impl Config {
    /// Load and validate the config at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.usa_proportion) {
            return Err(Error::Config(format!(
                "usa_proportion must be between 0 and 1, got {}",
                self.usa_proportion
            )));
        }
        if !self.sources.detail_url_template.contains("{id}") {
            return Err(Error::Config(
                "sources.detail_url_template must contain an {id} placeholder".to_string(),
            ));
        }
        Ok(())
    }

    /// Folder the images for a run on `date` are saved to.
    pub fn save_folder(&self, date: NaiveDate) -> PathBuf {
        if self.img_folder_date {
            self.img_folder.join(date.format("%Y%m%d").to_string())
        } else {
            self.img_folder.clone()
        }
    }

    pub fn pause_policy(&self) -> PausePolicy {
        PausePolicy {
            after_success: Duration::from_secs(self.pause_duration),
            after_error: Duration::from_secs(self.pause_error),
        }
    }

    /// One-line `key=value` rendering of the run settings, for the startup log.
    pub fn summary(&self) -> String {
        [
            ("img_folder", self.img_folder.display().to_string()),
            ("img_folder_date", self.img_folder_date.to_string()),
            ("log_folder", self.log_folder.display().to_string()),
            ("n", self.n.to_string()),
            ("pause_duration", self.pause_duration.to_string()),
            ("pause_error", self.pause_error.to_string()),
            ("usa_proportion", self.usa_proportion.to_string()),
        ]
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .join(", ")
    }
}
