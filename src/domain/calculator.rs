//! Next-version computation from the current version and a release intent

use crate::domain::prerelease::PreRelease;
use crate::domain::{ReleaseType, Version};
use crate::error::{ReleaseError, Result};

/// Compute the next version.
///
/// - **Major**: major += 1, minor = 0, patch = 0
/// - **Minor**: minor += 1, patch = 0
/// - **Patch**: patch += 1
///
/// Any prerelease on `current` is dropped. With `wants_prerelease` the
/// result carries `<suffix>.<number>`; the number is taken as given.
///
/// # Errors
/// `InvalidIntent` for [`ReleaseType::None`], `InvalidVersionFormat` when the
/// bumped component would overflow.
///
/// # Example
/// ```
/// # use auto_release::domain::{calculate_next, ReleaseType, Version};
/// let next = calculate_next(&Version::parse("v1.2.3"), ReleaseType::Minor, true, "beta", 1)?;
/// assert_eq!(next.to_string(), "v1.3.0-beta.1");
/// # Ok::<(), auto_release::ReleaseError>(())
/// ```
pub fn calculate_next(
    current: &Version,
    release_type: ReleaseType,
    wants_prerelease: bool,
    prerelease_suffix: &str,
    prerelease_number: u64,
) -> Result<Version> {
    let next = match release_type {
        ReleaseType::Major => Version::new(bump(current, current.major)?, 0, 0),
        ReleaseType::Minor => Version::new(current.major, bump(current, current.minor)?, 0),
        ReleaseType::Patch => {
            Version::new(current.major, current.minor, bump(current, current.patch)?)
        }
        ReleaseType::None => {
            return Err(ReleaseError::invalid_intent(
                "cannot compute a version for release type 'none'",
            ))
        }
    };

    if wants_prerelease {
        Ok(next.with_prerelease(PreRelease::new(prerelease_suffix, prerelease_number).to_string()))
    } else {
        Ok(next)
    }
}

fn bump(current: &Version, component: u64) -> Result<u64> {
    component
        .checked_add(1)
        .ok_or_else(|| ReleaseError::invalid_version(format!("{} cannot be bumped", current)))
}

/// Continue a prerelease stream without bumping the triple.
///
/// If `current` already carries `<suffix>.<n>` with the same suffix, the
/// result is `<suffix>.<n+1>` and `number` is ignored. Otherwise a fresh
/// `<suffix>.<number>` is put on the current triple.
///
/// # Errors
/// `InvalidVersionFormat` when `<n>` is already `u64::MAX`.
///
/// ```
/// # use auto_release::domain::increment_existing_prerelease;
/// assert_eq!(increment_existing_prerelease("v1.3.0-beta.1", "beta", 1)?.to_string(), "v1.3.0-beta.2");
/// assert_eq!(increment_existing_prerelease("v1.3.0", "rc", 1)?.to_string(), "v1.3.0-rc.1");
/// # Ok::<(), auto_release::ReleaseError>(())
/// ```
pub fn increment_existing_prerelease(current: &str, suffix: &str, number: u64) -> Result<Version> {
    let current = Version::parse(current);

    let prerelease = match current
        .prerelease
        .as_deref()
        .and_then(PreRelease::parse)
        .filter(|pre| pre.identifier == suffix)
    {
        Some(pre) => pre.increment().ok_or_else(|| {
            ReleaseError::invalid_version(format!("prerelease of {} cannot be bumped", current))
        })?,
        None => PreRelease::new(suffix, number),
    };

    Ok(current.triple().with_prerelease(prerelease.to_string()))
}

/// Whether the pending prerelease `current` already includes a `release_type` bump.
///
/// `v2.0.0-beta.1` covers any bump, `v1.3.0-beta.1` covers minor and patch,
/// `v1.2.4-beta.1` only covers patch. A stable `current` covers nothing.
pub fn prerelease_covers(current: &Version, release_type: ReleaseType) -> bool {
    if !current.is_prerelease() {
        return false;
    }

    match release_type {
        ReleaseType::Major => current.minor == 0 && current.patch == 0,
        ReleaseType::Minor => current.patch == 0,
        ReleaseType::Patch => true,
        ReleaseType::None => false,
    }
}
