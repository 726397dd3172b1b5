//! Command-line interface definitions for frontpages.
//!
//! Every option is optional: the job normally runs with no arguments, reading
//! its credentials from the environment.

use crate::config::TwitterKeys;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the frontpages batch job.
///
/// # Examples
///
/// ```sh
/// # Stock settings, credentials from TWITTER_* variables
/// frontpages
///
/// # Custom pacing and sample size
/// frontpages --config ./config.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, env = "FRONTPAGES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Twitter app consumer key
    #[arg(long, env = "TWITTER_CONSUMER_KEY", hide_env_values = true)]
    pub consumer_key: Option<String>,

    /// Twitter app consumer secret
    #[arg(long, env = "TWITTER_CONSUMER_SECRET", hide_env_values = true)]
    pub consumer_secret: Option<String>,

    /// Twitter account access token
    #[arg(long, env = "TWITTER_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Twitter account access token secret
    #[arg(long, env = "TWITTER_ACCESS_TOKEN_SECRET", hide_env_values = true)]
    pub access_token_secret: Option<String>,
}

impl Cli {
    /// Credentials given on the command line or environment, if all four are set.
    pub fn twitter_keys(&self) -> Option<TwitterKeys> {
        Some(TwitterKeys {
            consumer_key: self.consumer_key.clone()?,
            consumer_secret: self.consumer_secret.clone()?,
            access_token_key: self.access_token.clone()?,
            access_token_secret: self.access_token_secret.clone()?,
        })
    }
}
