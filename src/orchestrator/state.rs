//! Release run state tracking.

use crate::error::ReleaseError;
use crate::orchestrator::outputs::ReleaseOutputs;
use crate::warning::ReleaseWarning;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Last completed stage of a release run
///
/// `Idle → VersionResolved → Tagged → Released → (MajorReconciled) → Done`.
/// A failure is reported together with the stage reached before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseStage {
    Idle,
    VersionResolved,
    Tagged,
    Released,
    MajorReconciled,
    Done,
}

impl fmt::Display for ReleaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseStage::Idle => "idle",
            ReleaseStage::VersionResolved => "version-resolved",
            ReleaseStage::Tagged => "tagged",
            ReleaseStage::Released => "released",
            ReleaseStage::MajorReconciled => "major-reconciled",
            ReleaseStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// A completed run
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    pub stage: ReleaseStage,
    pub outputs: ReleaseOutputs,
    pub warnings: Vec<ReleaseWarning>,
    pub dry_run: bool,
}

/// A run aborted by a fatal error
///
/// Keeps the outputs established before the failure so callers can still
/// report them.
#[derive(Debug, Error)]
#[error("release failed after stage '{stage}': {source}")]
pub struct ReleaseFailure {
    pub stage: ReleaseStage,
    pub outputs: ReleaseOutputs,
    pub warnings: Vec<ReleaseWarning>,
    pub source: ReleaseError,
}

/// Mutable bookkeeping for a run in progress
#[derive(Debug, Default)]
pub(super) struct RunState {
    pub(super) stage: Option<ReleaseStage>,
    pub(super) outputs: ReleaseOutputs,
    pub(super) warnings: Vec<ReleaseWarning>,
}

impl RunState {
    pub(super) fn reached(&mut self, stage: ReleaseStage) {
        self.stage = Some(stage);
    }

    fn current(&self) -> ReleaseStage {
        self.stage.unwrap_or(ReleaseStage::Idle)
    }

    pub(super) fn into_outcome(self, dry_run: bool) -> ReleaseOutcome {
        ReleaseOutcome {
            stage: self.current(),
            outputs: self.outputs,
            warnings: self.warnings,
            dry_run,
        }
    }

    pub(super) fn into_failure(self, source: ReleaseError) -> ReleaseFailure {
        ReleaseFailure {
            stage: self.current(),
            outputs: self.outputs,
            warnings: self.warnings,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert!(ReleaseStage::Idle < ReleaseStage::VersionResolved);
        assert!(ReleaseStage::Tagged < ReleaseStage::Released);
        assert!(ReleaseStage::MajorReconciled < ReleaseStage::Done);
    }

    #[test]
    fn test_failure_message_names_stage() {
        let mut run = RunState::default();
        run.reached(ReleaseStage::Tagged);
        let failure = run.into_failure(ReleaseError::release_creation("422"));
        assert_eq!(failure.stage, ReleaseStage::Tagged);
        assert_eq!(
            failure.to_string(),
            "release failed after stage 'tagged': Release creation failed: 422"
        );
    }

    #[test]
    fn test_fresh_run_is_idle() {
        let outcome = RunState::default().into_outcome(false);
        assert_eq!(outcome.stage, ReleaseStage::Idle);
        assert!(!outcome.outputs.released);
    }
}
