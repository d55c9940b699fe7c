//! Titles, tag messages and release bodies

use crate::domain::{ReleaseType, Version};

/// Replace `{version}`, `{previous_version}` and `{major}` in a template
pub fn render_template(template: &str, version: &Version, previous: &Version) -> String {
    template
        .replace("{version}", &version.to_string())
        .replace("{previous_version}", &previous.to_string())
        .replace("{major}", &version.major_tag_name())
}

/// Body used when no release notes were supplied
pub fn default_body(version: &Version, previous: &Version, release_type: ReleaseType) -> String {
    let kind = if version.is_prerelease() {
        format!("{} prerelease", release_type)
    } else {
        format!("{} release", release_type)
    };

    if *previous == Version::zero() {
        format!("Automated {} {}.\n\nFirst release.", kind, version)
    } else {
        format!(
            "Automated {} {}.\n\n**Full changelog**: {}...{}",
            kind, version, previous, version
        )
    }
}

/// Title of the major-tracking release
pub fn major_title(major_tag: &str, version: &Version) -> String {
    format!("{} (latest: {})", major_tag, version)
}

/// Tag message of the major-tracking tag
pub fn major_tag_message(major_tag: &str, version: &Version) -> String {
    format!("{} now points at {}", major_tag, version)
}

/// Body of the major-tracking release: a banner, then the full release body
pub fn major_body(major_tag: &str, version: &Version, full_body: &str, full_url: &str) -> String {
    let target = if full_url.is_empty() {
        version.to_string()
    } else {
        format!("[{}]({})", version, full_url)
    };

    let banner = format!(
        "> `{}` tracks the latest stable {}.x.x release, currently {}.",
        major_tag, major_tag, target
    );

    if full_body.trim().is_empty() {
        banner
    } else {
        format!("{}\n\n{}", banner, full_body)
    }
}
