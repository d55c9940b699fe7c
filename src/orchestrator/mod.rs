//! Release orchestration
//!
//! A run moves through five steps: resolve the latest version, compute the
//! next one, ensure its tag, publish its release and, for stable releases,
//! repoint the major-tracking tag and release. Tag and release failures stop
//! the run; anything that goes wrong while reconciling the major version is
//! reported as a warning.

pub mod notes;
pub mod outputs;
pub mod state;

pub use outputs::ReleaseOutputs;
pub use state::{ReleaseFailure, ReleaseOutcome, ReleaseStage};

use crate::config::Config;
use crate::domain::{
    calculate_next, increment_existing_prerelease, prerelease_covers, PreRelease, ReleaseIntent,
    Version,
};
use crate::error::{ReleaseError, Result};
use crate::git::TagRepository;
use crate::release::{NewRelease, Release, ReleaseRepository};
use crate::warning::ReleaseWarning;
use state::RunState;
use tracing::{debug, info, warn};

/// Knobs of a release run
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOptions {
    pub remote: String,
    pub prerelease_suffix: String,
    pub prerelease_number: u64,
    pub continue_prerelease: bool,
    pub title_template: String,
    pub tag_message_template: String,
    /// Release body; generated when absent
    pub notes: Option<String>,
    pub major_tag: bool,
    pub copy_assets: bool,
    pub push_commits: bool,
    /// Stop after the version is resolved
    pub dry_run: bool,
    /// Version the caller agreed to; the run aborts before tagging if it differs
    pub expected_version: Option<Version>,
}

impl ReleaseOptions {
    pub fn from_config(config: &Config) -> Self {
        ReleaseOptions {
            remote: config.git.remote.clone(),
            prerelease_suffix: config.release.prerelease_suffix.clone(),
            prerelease_number: config.release.prerelease_number,
            continue_prerelease: config.release.continue_prerelease,
            title_template: config.release.title.clone(),
            tag_message_template: config.git.tag_message.clone(),
            notes: None,
            major_tag: config.release.major_tag,
            copy_assets: config.release.copy_assets,
            push_commits: config.git.push_commits,
            dry_run: false,
            expected_version: None,
        }
    }
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Drives a release against a tag repository and a release repository
pub struct ReleaseOrchestrator<'a, T: TagRepository, R: ReleaseRepository> {
    tags: &'a T,
    releases: &'a R,
    options: ReleaseOptions,
}

impl<'a, T: TagRepository, R: ReleaseRepository> ReleaseOrchestrator<'a, T, R> {
    pub fn new(tags: &'a T, releases: &'a R, options: ReleaseOptions) -> Self {
        ReleaseOrchestrator {
            tags,
            releases,
            options,
        }
    }

    pub fn options(&self) -> &ReleaseOptions {
        &self.options
    }

    /// Run the whole release for `intent`
    ///
    /// On failure the returned [ReleaseFailure] names the last stage that
    /// completed. A tag created before a release failure is left in place so
    /// the run can be retried.
    pub fn run(&self, intent: &ReleaseIntent) -> std::result::Result<ReleaseOutcome, ReleaseFailure> {
        let mut run = RunState::default();
        match self.execute(intent, &mut run) {
            Ok(()) => Ok(run.into_outcome(self.options.dry_run)),
            Err(source) => {
                warn!(error = %source, "release run failed");
                Err(run.into_failure(source))
            }
        }
    }

    fn execute(&self, intent: &ReleaseIntent, run: &mut RunState) -> Result<()> {
        run.outputs.release_type = Some(intent.release_type.to_string());
        run.outputs.is_prerelease = Some(intent.prerelease);

        if !intent.is_release() {
            info!("release type is none, nothing to release");
            run.reached(ReleaseStage::Done);
            return Ok(());
        }

        self.refresh_tags(run);
        let latest = self.resolve_latest_version()?;
        let version = self.compute_next_version(&latest, intent)?;
        let tag_name = version.to_string();
        Version::validate(&tag_name)?;

        if let Some(expected) = &self.options.expected_version {
            if *expected != version {
                return Err(ReleaseError::invalid_intent(format!(
                    "resolved version {} differs from the confirmed {}",
                    version, expected
                )));
            }
        }

        info!(previous = %latest, version = %version, "resolved release version");
        run.outputs.previous_version = Some(latest.to_string());
        run.outputs.version = Some(tag_name.clone());
        run.outputs.tag_name = Some(tag_name.clone());
        run.reached(ReleaseStage::VersionResolved);

        if self.options.dry_run {
            info!(version = %version, "dry run, leaving tags and releases untouched");
            return Ok(());
        }

        if self.options.push_commits {
            self.tags
                .push_all_pending_commits()
                .map_err(as_tag_failure)?;
        }
        let message = notes::render_template(&self.options.tag_message_template, &version, &latest);
        self.ensure_tag(&tag_name, &message)?;
        run.reached(ReleaseStage::Tagged);

        let release = self.publish_release(&version, &latest, intent)?;
        info!(tag = %tag_name, url = %release.html_url, "published release");
        run.outputs.released = true;
        run.outputs.release_id = Some(release.id);
        run.outputs.release_url = Some(release.html_url.clone());
        run.reached(ReleaseStage::Released);

        if self.options.major_tag && !intent.prerelease && !version.is_prerelease() {
            let major_tag = version.major_tag_name();
            match self.reconcile_major(&version, &release, run) {
                Ok(()) => {
                    info!(tag = %major_tag, version = %version, "major version tag updated");
                    run.reached(ReleaseStage::MajorReconciled);
                }
                Err(e) => {
                    warn!(tag = %major_tag, error = %e, "major version reconciliation failed");
                    run.warnings.push(ReleaseWarning::MajorReconciliationFailed {
                        major_tag,
                        reason: e.to_string(),
                    });
                }
            }
        }

        run.reached(ReleaseStage::Done);
        Ok(())
    }

    fn refresh_tags(&self, run: &mut RunState) {
        if let Err(e) = self.tags.fetch_remote_tags() {
            warn!(remote = %self.options.remote, error = %e, "could not fetch remote tags");
            run.warnings.push(ReleaseWarning::FetchFailed {
                remote: self.options.remote.clone(),
                reason: e.to_string(),
            });
        }
    }

    /// Highest full-version tag, or `v0.0.0` when there is none
    pub fn resolve_latest_version(&self) -> Result<Version> {
        let tags = self.tags.list_full_version_tags()?;
        let latest = tags
            .iter()
            .map(|name| Version::parse(name))
            .max()
            .unwrap_or_else(Version::zero);

        debug!(count = tags.len(), latest = %latest, "resolved latest version");
        Ok(latest)
    }

    /// Fetch remote tags, then return the latest and the next version
    ///
    /// This is what a run started right now would release. A failed fetch
    /// is logged and the local tags are used.
    pub fn preview(&self, intent: &ReleaseIntent) -> Result<(Version, Version)> {
        if let Err(e) = self.tags.fetch_remote_tags() {
            warn!(remote = %self.options.remote, error = %e, "could not fetch remote tags");
        }
        let latest = self.resolve_latest_version()?;
        let next = self.compute_next_version(&latest, intent)?;
        Ok((latest, next))
    }

    /// Version the release of `intent` will carry when `latest` is current
    ///
    /// A prerelease on top of a prerelease with the same suffix continues its
    /// stream (`v1.3.0-beta.1` → `v1.3.0-beta.2`) when continuation is enabled
    /// and the pending triple already includes the requested bump. Anything
    /// else bumps from `latest`.
    pub fn compute_next_version(&self, latest: &Version, intent: &ReleaseIntent) -> Result<Version> {
        if !intent.is_release() {
            return Err(ReleaseError::invalid_intent(
                "cannot compute a version for release type 'none'",
            ));
        }

        if intent.prerelease && self.continues_stream(latest, intent) {
            let continued = increment_existing_prerelease(
                &latest.to_string(),
                &self.options.prerelease_suffix,
                self.options.prerelease_number,
            )?;
            if continued > *latest {
                return Ok(continued);
            }
            debug!(latest = %latest, continued = %continued, "continued version does not advance");
        }

        calculate_next(
            latest,
            intent.release_type,
            intent.prerelease,
            &self.options.prerelease_suffix,
            self.options.prerelease_number,
        )
    }

    fn continues_stream(&self, latest: &Version, intent: &ReleaseIntent) -> bool {
        let same_suffix = latest
            .prerelease
            .as_deref()
            .and_then(PreRelease::parse)
            .is_some_and(|pre| pre.identifier == self.options.prerelease_suffix);

        self.options.continue_prerelease
            && same_suffix
            && prerelease_covers(latest, intent.release_type)
    }

    /// Point tag `name` at HEAD, locally and on the remote
    ///
    /// Any existing tag of that name is removed first, so repeating the call
    /// converges on the same state.
    pub fn ensure_tag(&self, name: &str, message: &str) -> Result<()> {
        self.tags.delete_tag(name).map_err(as_tag_failure)?;
        self.tags.create_tag(name, message).map_err(as_tag_failure)?;
        self.tags.push_tag(name).map_err(as_tag_failure)?;

        debug!(tag = name, "tag created and pushed");
        Ok(())
    }

    /// Create the release for `version`, or update the one already there
    pub fn publish_release(
        &self,
        version: &Version,
        previous: &Version,
        intent: &ReleaseIntent,
    ) -> Result<Release> {
        let tag_name = version.to_string();
        let title = notes::render_template(&self.options.title_template, version, previous);
        let body = match &self.options.notes {
            Some(text) => text.clone(),
            None => notes::default_body(version, previous, intent.release_type),
        };
        let request = NewRelease::new(&tag_name, title, body, intent.prerelease);

        let published = match self.releases.get_by_tag(&tag_name) {
            Ok(Some(existing)) => {
                debug!(tag = %tag_name, id = existing.id, "updating existing release");
                self.releases.update(existing.id, &request)
            }
            Ok(None) => self.releases.create(&request),
            Err(e) => Err(e),
        };

        published.map_err(|e| match e {
            ReleaseError::ReleaseCreationFailed(_) => e,
            other => ReleaseError::release_creation(other.to_string()),
        })
    }

    /// Repoint `vX` and its release at the freshly published `full_release`
    ///
    /// The major outputs are recorded as soon as the major release exists.
    /// Asset copy failures are collected into the run warnings one by one;
    /// every other failure aborts the reconciliation.
    fn reconcile_major(
        &self,
        version: &Version,
        full_release: &Release,
        run: &mut RunState,
    ) -> Result<()> {
        let major_tag = version.major_tag_name();

        let reconciled = self.replace_major_release(&major_tag, version, full_release);
        let major_release = reconciled.map_err(|e| match e {
            ReleaseError::MajorReconciliationFailed(_) => e,
            other => ReleaseError::major_reconciliation(other.to_string()),
        })?;
        run.outputs.major_version = Some(major_tag);
        run.outputs.major_release_url = Some(major_release.html_url.clone());

        if self.options.copy_assets {
            self.copy_assets(full_release, &major_release, &mut run.warnings)
                .map_err(|e| ReleaseError::major_reconciliation(e.to_string()))?;
        }

        Ok(())
    }

    fn replace_major_release(
        &self,
        major_tag: &str,
        version: &Version,
        full_release: &Release,
    ) -> Result<Release> {
        self.ensure_tag(major_tag, &notes::major_tag_message(major_tag, version))?;

        if let Some(stale) = self.releases.get_by_tag(major_tag)? {
            debug!(tag = major_tag, id = stale.id, "deleting previous major release");
            self.releases.delete(stale.id)?;
        }

        let body = notes::major_body(
            major_tag,
            version,
            full_release.body.as_deref().unwrap_or_default(),
            &full_release.html_url,
        );
        let request = NewRelease::new(major_tag, notes::major_title(major_tag, version), body, false);
        self.releases.create(&request)
    }

    fn copy_assets(
        &self,
        source: &Release,
        target: &Release,
        warnings: &mut Vec<ReleaseWarning>,
    ) -> Result<()> {
        let assets = self.releases.list_assets(source)?;

        for asset in &assets {
            match self.releases.copy_asset(source, target, asset) {
                Ok(()) => debug!(asset = %asset.name, tag = %target.tag_name, "copied asset"),
                Err(e) => {
                    warn!(asset = %asset.name, error = %e, "asset copy failed");
                    warnings.push(ReleaseWarning::AssetCopyFailed {
                        asset: asset.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn as_tag_failure(e: ReleaseError) -> ReleaseError {
    match e {
        ReleaseError::TagOperationFailed(_) => e,
        other => ReleaseError::tag_operation(other.to_string()),
    }
}
