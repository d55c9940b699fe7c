use crate::error::{ReleaseError, Result};
use crate::release::retry::{with_retry, RetryPolicy};
use crate::release::{Asset, NewRelease, Release, ReleaseRepository};
use std::time::Duration;
use tracing::{debug, info};
use ureq::{Agent, RequestBuilder};

const USER_AGENT: &str = concat!("auto-release/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const JSON: &str = "application/vnd.github+json";
const UPLOADS_URL: &str = "https://uploads.github.com";
const MAX_ASSET_BYTES: u64 = 2 * 1024 * 1024 * 1024;
const PER_PAGE: usize = 100;

/// Release repository backed by the GitHub REST API
pub struct GitHubReleaseRepository {
    agent: Agent,
    api_url: String,
    repository: String,
    token: String,
    retry: RetryPolicy,
}

impl GitHubReleaseRepository {
    /// Client for `owner/name` on `api_url`; every call times out after `timeout`
    pub fn new(
        api_url: impl Into<String>,
        repository: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();

        GitHubReleaseRepository {
            agent: Agent::new_with_config(config),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            repository: repository.into(),
            token: token.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}", self.api_url, self.repository, path)
    }

    fn authorize<B>(&self, request: RequestBuilder<B>, accept: &str) -> RequestBuilder<B> {
        request
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", accept)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
    }

    fn call<T>(
        &self,
        operation: &str,
        request: impl FnMut() -> std::result::Result<T, ureq::Error>,
    ) -> std::result::Result<T, ureq::Error> {
        with_retry(&self.retry, operation, is_transient, request)
    }

    fn upload_url(&self, target: &Release) -> String {
        match target.upload_url.as_deref() {
            Some(template) => template
                .split_once('{')
                .map(|(base, _)| base)
                .unwrap_or(template)
                .to_string(),
            None => format!(
                "{}/repos/{}/releases/{}/assets",
                UPLOADS_URL, self.repository, target.id
            ),
        }
    }

    fn download_asset(&self, asset: &Asset) -> std::result::Result<Vec<u8>, ureq::Error> {
        let url = self.url(&format!("releases/assets/{}", asset.id));
        self.call("download asset", || {
            let mut response = self
                .authorize(self.agent.get(&url), "application/octet-stream")
                .call()?;
            response
                .body_mut()
                .with_config()
                .limit(MAX_ASSET_BYTES)
                .read_to_vec()
        })
    }
}

/// HTTP 5xx, rate limiting, timeouts and I/O errors are worth retrying
fn is_transient(err: &ureq::Error) -> bool {
    match err {
        ureq::Error::StatusCode(status) => *status == 429 || *status >= 500,
        ureq::Error::Timeout(_) | ureq::Error::Io(_) => true,
        _ => false,
    }
}

fn is_not_found(err: &ureq::Error) -> bool {
    matches!(err, ureq::Error::StatusCode(404))
}

/// Fetch numbered pages starting at 1 until one comes back short
fn collect_pages<T, E>(
    per_page: usize,
    mut fetch_page: impl FnMut(u32) -> std::result::Result<Vec<T>, E>,
) -> std::result::Result<Vec<T>, E> {
    let mut items = Vec::new();
    for page in 1.. {
        let batch = fetch_page(page)?;
        let done = batch.len() < per_page;
        items.extend(batch);
        if done {
            break;
        }
    }
    Ok(items)
}

fn api_error(context: impl AsRef<str>, err: ureq::Error) -> ReleaseError {
    ReleaseError::api(format!("{}: {}", context.as_ref(), err))
}

impl ReleaseRepository for GitHubReleaseRepository {
    fn get_by_tag(&self, tag: &str) -> Result<Option<Release>> {
        let url = self.url(&format!("releases/tags/{}", tag));
        let result = self.call("get release", || {
            self.authorize(self.agent.get(&url), JSON)
                .call()?
                .body_mut()
                .read_json::<Release>()
        });

        match result {
            Ok(release) => Ok(Some(release)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(api_error(format!("Cannot get release for tag '{}'", tag), e)),
        }
    }

    fn create(&self, release: &NewRelease) -> Result<Release> {
        let url = self.url("releases");
        let created = self
            .call("create release", || {
                self.authorize(self.agent.post(&url), JSON)
                    .send_json(release)?
                    .body_mut()
                    .read_json::<Release>()
            })
            .map_err(|e| {
                api_error(format!("Cannot create release for tag '{}'", release.tag_name), e)
            })?;

        info!(release_id = created.id, tag = %created.tag_name, "created release");
        Ok(created)
    }

    fn update(&self, id: u64, release: &NewRelease) -> Result<Release> {
        let url = self.url(&format!("releases/{}", id));
        let updated = self
            .call("update release", || {
                self.authorize(self.agent.patch(&url), JSON)
                    .send_json(release)?
                    .body_mut()
                    .read_json::<Release>()
            })
            .map_err(|e| api_error(format!("Cannot update release {}", id), e))?;

        info!(release_id = updated.id, tag = %updated.tag_name, "updated release");
        Ok(updated)
    }

    fn delete(&self, id: u64) -> Result<()> {
        let url = self.url(&format!("releases/{}", id));
        match self.call("delete release", || {
            self.authorize(self.agent.delete(&url), JSON).call().map(|_| ())
        }) {
            Ok(()) => {
                info!(release_id = id, "deleted release");
                Ok(())
            }
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(api_error(format!("Cannot delete release {}", id), e)),
        }
    }

    fn list_assets(&self, release: &Release) -> Result<Vec<Asset>> {
        let url = self.url(&format!("releases/{}/assets", release.id));
        let per_page = PER_PAGE.to_string();
        let assets = collect_pages(PER_PAGE, |page| {
            let page = page.to_string();
            self.call("list assets", || {
                self.authorize(self.agent.get(&url), JSON)
                    .query("per_page", &per_page)
                    .query("page", &page)
                    .call()?
                    .body_mut()
                    .read_json::<Vec<Asset>>()
            })
        })
        .map_err(|e| api_error(format!("Cannot list assets of release {}", release.id), e))?;

        debug!(release = release.id, count = assets.len(), "listed assets");
        Ok(assets)
    }

    fn copy_asset(&self, source: &Release, target: &Release, asset: &Asset) -> Result<()> {
        let bytes = self.download_asset(asset).map_err(|e| {
            ReleaseError::asset_copy(format!(
                "download of '{}' from release {} failed: {}",
                asset.name, source.id, e
            ))
        })?;
        debug!(asset = %asset.name, bytes = bytes.len(), "downloaded asset");

        let url = self.upload_url(target);
        self.call("upload asset", || {
            self.authorize(self.agent.post(&url), JSON)
                .query("name", &asset.name)
                .header("Content-Type", &asset.content_type)
                .send(&bytes[..])
                .map(|_| ())
        })
        .map_err(|e| {
            ReleaseError::asset_copy(format!(
                "upload of '{}' to release {} failed: {}",
                asset.name, target.id, e
            ))
        })
    }
}
