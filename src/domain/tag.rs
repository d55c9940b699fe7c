use crate::domain::Version;
use regex::Regex;
use std::sync::LazyLock;

static FULL_VERSION_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+\.\d+\.\d+").expect("valid full-version tag regex"));

static MAJOR_TRACKING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+$").expect("valid major tag regex"));

/// Classes of tags the release flow cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `vX.Y.Z[-pre]`, one per release
    FullVersion,
    /// `vX`, repointed to the latest stable release of that major line
    MajorTracking,
    /// Anything else; ignored by version resolution
    Other,
}

/// A repository tag and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub target: String,
}

impl Tag {
    /// Create a new tag
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Tag {
            name: name.into(),
            target: target.into(),
        }
    }

    pub fn kind(&self) -> TagKind {
        classify(&self.name)
    }

    /// Version encoded in the tag name (lenient)
    pub fn version(&self) -> Version {
        Version::parse(&self.name)
    }
}

/// Classify a tag name
pub fn classify(name: &str) -> TagKind {
    if FULL_VERSION_TAG.is_match(name) {
        TagKind::FullVersion
    } else if MAJOR_TRACKING_TAG.is_match(name) {
        TagKind::MajorTracking
    } else {
        TagKind::Other
    }
}

pub fn is_full_version_tag(name: &str) -> bool {
    classify(name) == TagKind::FullVersion
}

/// Keep only full-version tags, highest version first.
pub fn sort_full_version_tags<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tags: Vec<String> = names
        .into_iter()
        .map(Into::into)
        .filter(|name| is_full_version_tag(name))
        .collect();
    tags.sort_by(|a, b| Version::parse(b).compare(&Version::parse(a)));
    tags
}
