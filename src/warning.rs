use serde::Serialize;
use std::fmt;

/// Non-fatal problems met during a release run.
/// The primary release still counts as successful; these are reported to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReleaseWarning {
    /// Remote tags could not be fetched; local tags were used
    FetchFailed { remote: String, reason: String },
    /// The major-tracking tag or release could not be reconciled
    MajorReconciliationFailed { major_tag: String, reason: String },
    /// One asset could not be copied to the major release
    AssetCopyFailed { asset: String, reason: String },
}

impl fmt::Display for ReleaseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseWarning::FetchFailed { remote, reason } => {
                write!(
                    f,
                    "Could not fetch tags from '{}', using local tags: {}",
                    remote, reason
                )
            }
            ReleaseWarning::MajorReconciliationFailed { major_tag, reason } => {
                write!(
                    f,
                    "Major version tag '{}' was not updated: {}",
                    major_tag, reason
                )
            }
            ReleaseWarning::AssetCopyFailed { asset, reason } => {
                write!(f, "Asset '{}' was not copied: {}", asset, reason)
            }
        }
    }
}
