use crate::domain::prerelease::compare_prerelease;
use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

/// Canonical grammar accepted by [`Version::validate`]
static VERSION_GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?\d+\.\d+\.\d+(-\w+\.\d+)?$").expect("valid version regex"));

/// Version carried by a full-version tag (`v1.2.3`, `v1.3.0-beta.1`)
///
/// Ordering follows [`Version::compare`]: the numeric triple first, then a
/// prerelease sorts before the same triple without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
}

impl Version {
    /// Create a release version without prerelease
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Attach a prerelease identifier (`beta.1`); an empty string clears it
    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        let prerelease = prerelease.into();
        self.prerelease = if prerelease.is_empty() {
            None
        } else {
            Some(prerelease)
        };
        self
    }

    /// `v0.0.0`, the version assumed before the first release
    pub fn zero() -> Self {
        Version::default()
    }

    /// Parse version text leniently.
    ///
    /// Strips an optional leading `v`, splits off the prerelease at the first
    /// `-`, and reads the triple from the `.`-separated remainder. Missing or
    /// non-numeric components become 0. Never fails, so legacy or malformed
    /// tags still resolve to something comparable.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('v').unwrap_or(text);
        let (core, prerelease) = match text.split_once('-') {
            Some((core, prerelease)) => (core, Some(prerelease)),
            None => (text, None),
        };

        let mut parts = core.split('.');
        let mut component = || {
            parts
                .next()
                .and_then(|part| part.parse::<u64>().ok())
                .unwrap_or(0)
        };
        let major = component();
        let minor = component();
        let patch = component();

        Version {
            major,
            minor,
            patch,
            prerelease: prerelease
                .filter(|pre| !pre.is_empty())
                .map(|pre| pre.to_string()),
        }
    }

    /// Render `v<major>.<minor>.<patch>[-<prerelease>]`
    pub fn format(major: u64, minor: u64, patch: u64, prerelease: Option<&str>) -> String {
        match prerelease {
            Some(pre) if !pre.is_empty() => format!("v{}.{}.{}-{}", major, minor, patch, pre),
            _ => format!("v{}.{}.{}", major, minor, patch),
        }
    }

    /// Strict check against `v?\d+\.\d+\.\d+(-\w+\.\d+)?`.
    ///
    /// Only for trust boundaries; [`Version::parse`] stays lenient.
    pub fn validate(text: &str) -> Result<()> {
        if VERSION_GRAMMAR.is_match(text) {
            Ok(())
        } else {
            Err(ReleaseError::invalid_version(format!(
                "'{}' does not match v<major>.<minor>.<patch>[-<word>.<number>]",
                text
            )))
        }
    }

    /// Compare two versions.
    ///
    /// The triple is compared numerically. On equal triples a version with a
    /// prerelease sorts first; two prereleases are compared with
    /// [`compare_prerelease`], which is numeric-aware for a shared identifier.
    pub fn compare(&self, other: &Version) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => compare_prerelease(a, b),
            })
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// The version without its prerelease part
    pub fn triple(&self) -> Version {
        Version::new(self.major, self.minor, self.patch)
    }

    /// Name of the major-tracking tag for this version (`v2`)
    pub fn major_tag_name(&self) -> String {
        format!("v{}", self.major)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Version::format(
            self.major,
            self.minor,
            self.patch,
            self.prerelease.as_deref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("v1.2.3");
        assert_eq!(v, Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_parse_without_v() {
        assert_eq!(Version::parse("1.2.3"), Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_parse_prerelease() {
        let v = Version::parse("v1.3.0-beta.1");
        assert_eq!(v, Version::new(1, 3, 0).with_prerelease("beta.1"));
    }

    #[test]
    fn test_version_parse_splits_on_first_hyphen() {
        let v = Version::parse("v1.3.0-beta.1-rc.1");
        assert_eq!(v.prerelease.as_deref(), Some("beta.1-rc.1"));
    }

    #[test]
    fn test_version_parse_is_lenient() {
        assert_eq!(Version::parse("v1.2"), Version::new(1, 2, 0));
        assert_eq!(Version::parse("vx.y.z"), Version::zero());
        assert_eq!(Version::parse(""), Version::zero());
        assert_eq!(Version::parse("v2.x.7"), Version::new(2, 0, 7));
        assert_eq!(Version::parse("v1.2.3-"), Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_format() {
        assert_eq!(Version::format(1, 2, 3, None), "v1.2.3");
        assert_eq!(Version::format(1, 2, 3, Some("")), "v1.2.3");
        assert_eq!(Version::format(1, 3, 0, Some("rc.2")), "v1.3.0-rc.2");
    }

    #[test]
    fn test_version_round_trip() {
        for (major, minor, patch, pre) in [
            (0, 0, 0, None),
            (1, 2, 3, None),
            (10, 0, 42, Some("beta.7")),
            (3, 14, 159, Some("rc_candidate.0")),
        ] {
            let text = Version::format(major, minor, patch, pre);
            let parsed = Version::parse(&text);
            assert_eq!(parsed.major, major);
            assert_eq!(parsed.minor, minor);
            assert_eq!(parsed.patch, patch);
            assert_eq!(parsed.prerelease.as_deref(), pre);
        }
    }

    #[test]
    fn test_version_validate() {
        assert!(Version::validate("v1.2.3").is_ok());
        assert!(Version::validate("1.2.3").is_ok());
        assert!(Version::validate("v1.3.0-beta.1").is_ok());
        assert!(Version::validate("v1.2").is_err());
        assert!(Version::validate("v1.2.3-beta").is_err());
        assert!(Version::validate("v1.2.3-my-beta.1").is_err());
        assert!(Version::validate("v1.2.3.4").is_err());
    }

    #[test]
    fn test_version_validate_error_kind() {
        let err = Version::validate("release-1").unwrap_err();
        assert!(matches!(err, ReleaseError::InvalidVersionFormat(_)));
    }

    #[test]
    fn test_compare_reflexive() {
        for text in ["v0.0.0", "v1.2.3", "v1.3.0-beta.1"] {
            let v = Version::parse(text);
            assert_eq!(v.compare(&v), Ordering::Equal);
        }
    }

    #[test]
    fn test_compare_triple_order() {
        assert_eq!(
            Version::parse("v1.2.3").compare(&Version::parse("v1.10.0")),
            Ordering::Less
        );
        assert_eq!(
            Version::parse("v2.0.0").compare(&Version::parse("v1.99.99")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_compare_prerelease_before_release() {
        let pre = Version::parse("v1.0.0-beta.1");
        let release = Version::parse("v1.0.0");
        assert_eq!(pre.compare(&release), Ordering::Less);
        assert!(pre < release);
    }

    #[test]
    fn test_compare_prerelease_numeric_aware() {
        assert!(Version::parse("v1.0.0-beta.2") < Version::parse("v1.0.0-beta.10"));
    }

    #[test]
    fn test_major_tag_name() {
        assert_eq!(Version::parse("v2.1.0").major_tag_name(), "v2");
    }

    #[test]
    fn test_display() {
        assert_eq!(Version::zero().to_string(), "v0.0.0");
        assert_eq!(
            Version::new(1, 3, 0).with_prerelease("beta.2").to_string(),
            "v1.3.0-beta.2"
        );
    }
}
