use crate::error::{ReleaseError, Result};
use crate::release::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// File name looked up in the repository directory
pub const CONFIG_FILE_NAME: &str = "autorelease.toml";

/// Represents the complete configuration for auto-release.
///
/// Contains git remote settings, release naming and reconciliation options,
/// and the release API connection.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub github: GitHubConfig,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_tag_message() -> String {
    "Release {version}".to_string()
}

fn default_prerelease_suffix() -> String {
    "beta".to_string()
}

fn default_prerelease_number() -> u64 {
    1
}

fn default_title() -> String {
    "Release {version}".to_string()
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

/// Git remote and tagging settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Push the current branch before tagging
    #[serde(default)]
    pub push_commits: bool,

    /// Annotated tag message; `{version}` is replaced
    #[serde(default = "default_tag_message")]
    pub tag_message: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
            push_commits: false,
            tag_message: default_tag_message(),
        }
    }
}

/// Release naming, prerelease and major-tag reconciliation settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    #[serde(default = "default_prerelease_suffix")]
    pub prerelease_suffix: String,

    #[serde(default = "default_prerelease_number")]
    pub prerelease_number: u64,

    /// Release title; `{version}`, `{previous_version}` and `{major}` are replaced
    #[serde(default = "default_title")]
    pub title: String,

    /// Keep a `vX` tag and release pointing at the latest stable release
    #[serde(default = "default_true")]
    pub major_tag: bool,

    /// Copy assets of the full release onto the major release
    #[serde(default = "default_true")]
    pub copy_assets: bool,

    /// Bump the number of an existing prerelease instead of the triple
    #[serde(default = "default_true")]
    pub continue_prerelease: bool,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            prerelease_suffix: default_prerelease_suffix(),
            prerelease_number: default_prerelease_number(),
            title: default_title(),
            major_tag: true,
            copy_assets: true,
            continue_prerelease: true,
        }
    }
}

/// Release API connection settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitHubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// `owner/name`; falls back to `GITHUB_REPOSITORY`
    #[serde(default)]
    pub repository: Option<String>,

    /// Environment variable holding the access token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            api_url: default_api_url(),
            repository: None,
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl GitHubConfig {
    /// Configured repository, else `GITHUB_REPOSITORY`
    pub fn resolve_repository(&self) -> Result<String> {
        let repository = match &self.repository {
            Some(repository) => repository.clone(),
            None => env::var("GITHUB_REPOSITORY").map_err(|_| {
                ReleaseError::config(
                    "no repository configured: set [github].repository or GITHUB_REPOSITORY",
                )
            })?,
        };

        match repository.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(repository)
            }
            _ => Err(ReleaseError::config(format!(
                "repository '{}' is not in owner/name form",
                repository
            ))),
        }
    }

    /// Access token read from the configured environment variable
    pub fn resolve_token(&self) -> Result<String> {
        match env::var(&self.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ReleaseError::config(format!(
                "no access token found in ${}",
                self.token_env
            ))),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `autorelease.toml` in the repository directory
/// 3. `.autorelease.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `repo_dir` - Repository directory searched for `autorelease.toml`
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, repo_dir: &Path) -> Result<Config> {
    let repo_config = repo_dir.join(CONFIG_FILE_NAME);

    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if repo_config.exists() {
        fs::read_to_string(&repo_config)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if user_config.exists() {
            fs::read_to_string(user_config)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parse configuration from TOML text
pub fn parse_config(text: &str) -> Result<Config> {
    toml::from_str(text).map_err(|e| ReleaseError::config(e.to_string()))
}
