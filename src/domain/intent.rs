use crate::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// Kind of release requested by the upstream trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseType {
    Major,
    Minor,
    Patch,
    /// No release should happen; a valid outcome, not an error
    None,
}

impl ReleaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Major => "major",
            ReleaseType::Minor => "minor",
            ReleaseType::Patch => "patch",
            ReleaseType::None => "none",
        }
    }
}

impl FromStr for ReleaseType {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(ReleaseType::Major),
            "minor" => Ok(ReleaseType::Minor),
            "patch" => Ok(ReleaseType::Patch),
            "none" => Ok(ReleaseType::None),
            _ => Err(ReleaseError::invalid_intent(format!(
                "'{}' is not one of major, minor, patch, none",
                s
            ))),
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release intent: what to bump and whether the result is a prerelease
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseIntent {
    pub release_type: ReleaseType,
    pub prerelease: bool,
}

impl ReleaseIntent {
    pub fn new(release_type: ReleaseType, prerelease: bool) -> Self {
        ReleaseIntent {
            release_type,
            prerelease,
        }
    }

    /// Intent that releases nothing
    pub fn none() -> Self {
        ReleaseIntent::new(ReleaseType::None, false)
    }

    /// Parse the release type token and pair it with the prerelease flag
    pub fn parse(release_type: &str, prerelease: bool) -> Result<Self> {
        Ok(ReleaseIntent::new(release_type.parse()?, prerelease))
    }

    pub fn is_release(&self) -> bool {
        self.release_type != ReleaseType::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_type_parse() {
        assert_eq!("major".parse::<ReleaseType>().unwrap(), ReleaseType::Major);
        assert_eq!("Minor".parse::<ReleaseType>().unwrap(), ReleaseType::Minor);
        assert_eq!(" patch ".parse::<ReleaseType>().unwrap(), ReleaseType::Patch);
        assert_eq!("none".parse::<ReleaseType>().unwrap(), ReleaseType::None);
    }

    #[test]
    fn test_release_type_parse_invalid() {
        let err = "hotfix".parse::<ReleaseType>().unwrap_err();
        assert!(matches!(err, ReleaseError::InvalidIntent(_)));
        assert!(err.to_string().contains("hotfix"));
    }

    #[test]
    fn test_release_type_display() {
        assert_eq!(ReleaseType::Minor.to_string(), "minor");
    }

    #[test]
    fn test_intent_parse() {
        let intent = ReleaseIntent::parse("minor", true).unwrap();
        assert_eq!(intent.release_type, ReleaseType::Minor);
        assert!(intent.prerelease);
        assert!(intent.is_release());
        assert!(!ReleaseIntent::none().is_release());
    }
}
