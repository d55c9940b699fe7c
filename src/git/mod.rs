//! Tag repository abstraction
//!
//! This module provides a trait-based abstraction over the tag operations
//! the release flow needs, with a real implementation and an in-memory one
//! for testing.
//!
//! # Overview
//!
//! - [repository::Git2TagRepository]: libgit2-backed implementation using the `git2` crate
//! - [mock::MockTagRepository]: in-memory local/remote tag store for tests
//!
//! The orchestrator only ever talks to [TagRepository]; it never runs git
//! itself.
//!
//! ```rust
//! # use auto_release::git::TagRepository;
//! # fn example<R: TagRepository>(repo: &R) -> auto_release::Result<()> {
//! let tags = repo.list_full_version_tags()?;
//! if let Some(latest) = tags.first() {
//!     println!("latest release tag: {}", latest);
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockTagRepository;
pub use repository::Git2TagRepository;

use crate::error::Result;

/// Tag operations consumed by the release orchestrator
///
/// ## Error Handling
///
/// Implementations map backend failures to
/// [crate::error::ReleaseError::TagOperationFailed] (or `Git` for raw libgit2
/// errors). Deleting a tag that does not exist is never an error.
pub trait TagRepository {
    /// List full-version tags (`vX.Y.Z[-pre]`), highest version first.
    ///
    /// Major-tracking tags (`vX`) and unrelated tags are excluded.
    fn list_full_version_tags(&self) -> Result<Vec<String>>;

    /// Whether a local tag with this exact name exists
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Commit a local tag points at, `None` if the tag does not exist
    fn tag_target(&self, name: &str) -> Result<Option<String>>;

    /// Create an annotated tag at HEAD.
    ///
    /// Fails if a tag with that name already exists; callers delete first.
    fn create_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Delete a tag locally and on the remote.
    ///
    /// A tag missing in either place is treated as already deleted.
    fn delete_tag(&self, name: &str) -> Result<()>;

    /// Push a single tag to the remote
    fn push_tag(&self, name: &str) -> Result<()>;

    /// Push the current branch so commits made before tagging reach the remote
    fn push_all_pending_commits(&self) -> Result<()>;

    /// Fetch all tags from the remote, overwriting stale local copies
    fn fetch_remote_tags(&self) -> Result<()>;
}
