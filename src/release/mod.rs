//! Release repository abstraction
//!
//! Releases are keyed by tag name and carry a title, notes, a prerelease
//! flag and binary assets.
//!
//! - [github::GitHubReleaseRepository]: GitHub REST API via `ureq`
//! - [mock::MockReleaseRepository]: in-memory store keyed by tag name
//!
//! Network-backed implementations wrap each call in [retry::with_retry].

pub mod github;
pub mod mock;
pub mod retry;

pub use github::GitHubReleaseRepository;
pub use mock::MockReleaseRepository;
pub use retry::RetryPolicy;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A published release
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub upload_url: Option<String>,
}

/// A binary attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

/// Fields sent when creating or updating a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    pub tag_name: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

impl NewRelease {
    /// A published (non-draft) release for `tag_name`
    pub fn new(
        tag_name: impl Into<String>,
        name: impl Into<String>,
        body: impl Into<String>,
        prerelease: bool,
    ) -> Self {
        NewRelease {
            tag_name: tag_name.into(),
            name: name.into(),
            body: body.into(),
            draft: false,
            prerelease,
        }
    }
}

/// Release operations consumed by the release orchestrator
pub trait ReleaseRepository {
    /// Find the release bound to `tag`, `None` if there is none
    fn get_by_tag(&self, tag: &str) -> Result<Option<Release>>;

    /// Create a release
    fn create(&self, release: &NewRelease) -> Result<Release>;

    /// Replace title, notes and prerelease flag of an existing release
    fn update(&self, id: u64, release: &NewRelease) -> Result<Release>;

    /// Delete a release; a missing release counts as deleted
    fn delete(&self, id: u64) -> Result<()>;

    /// Assets attached to `release`
    fn list_assets(&self, release: &Release) -> Result<Vec<Asset>>;

    /// Copy one asset from `source` to `target`.
    ///
    /// Failure only concerns this asset; callers keep going with the rest.
    fn copy_asset(&self, source: &Release, target: &Release, asset: &Asset) -> Result<()>;
}
