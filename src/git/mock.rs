use crate::domain::tag::sort_full_version_tags;
use crate::error::{ReleaseError, Result};
use crate::git::TagRepository;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Operations of [MockTagRepository] that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagOp {
    List,
    Create,
    Delete,
    Push,
    PushCommits,
    Fetch,
}

#[derive(Debug, Default)]
struct MockState {
    head: String,
    local: BTreeMap<String, String>,
    remote: BTreeMap<String, String>,
    failing: HashSet<TagOp>,
    failing_tags: HashSet<String>,
    pushed_commits: usize,
    log: Vec<String>,
}

/// In-memory tag repository with a local and a remote side
///
/// Mirrors git semantics the release flow relies on: creating an existing
/// tag fails, deleting a missing tag succeeds, pushing copies the local tag
/// to the remote.
pub struct MockTagRepository {
    state: Mutex<MockState>,
}

impl MockTagRepository {
    /// Create an empty repository whose HEAD is `head`
    pub fn new(head: impl Into<String>) -> Self {
        MockTagRepository {
            state: Mutex::new(MockState {
                head: head.into(),
                ..MockState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a tag present both locally and on the remote
    pub fn with_tag(self, name: impl Into<String>, commit: impl Into<String>) -> Self {
        {
            let mut state = self.state();
            let (name, commit) = (name.into(), commit.into());
            state.local.insert(name.clone(), commit.clone());
            state.remote.insert(name, commit);
        }
        self
    }

    /// Add a tag that only exists on the remote (not fetched yet)
    pub fn with_remote_tag(self, name: impl Into<String>, commit: impl Into<String>) -> Self {
        self.state().remote.insert(name.into(), commit.into());
        self
    }

    /// Move HEAD to another commit
    pub fn set_head(&self, commit: impl Into<String>) {
        self.state().head = commit.into();
    }

    /// Make every call of `op` fail
    pub fn fail_on(&self, op: TagOp) {
        self.state().failing.insert(op);
    }

    /// Make create/delete/push fail for one tag name only
    pub fn fail_for_tag(&self, name: impl Into<String>) {
        self.state().failing_tags.insert(name.into());
    }

    /// Remove every injected failure
    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.failing.clear();
        state.failing_tags.clear();
    }

    /// Commit a remote tag points at
    pub fn remote_target(&self, name: &str) -> Option<String> {
        self.state().remote.get(name).cloned()
    }

    /// All local tag names, sorted by name
    pub fn local_tags(&self) -> Vec<String> {
        self.state().local.keys().cloned().collect()
    }

    /// How many times pending commits were pushed
    pub fn pushed_commits(&self) -> usize {
        self.state().pushed_commits
    }

    /// Mutating calls in order, e.g. `create v1.2.4`
    pub fn log(&self) -> Vec<String> {
        self.state().log.clone()
    }

    fn check(state: &MockState, op: TagOp, name: Option<&str>) -> Result<()> {
        let tag_failure = name.is_some_and(|name| state.failing_tags.contains(name));
        if state.failing.contains(&op) || tag_failure {
            return Err(ReleaseError::tag_operation(format!(
                "injected {:?} failure{}",
                op,
                name.map(|n| format!(" for '{}'", n)).unwrap_or_default()
            )));
        }
        Ok(())
    }
}

impl TagRepository for MockTagRepository {
    fn list_full_version_tags(&self) -> Result<Vec<String>> {
        let state = self.state();
        Self::check(&state, TagOp::List, None)?;
        Ok(sort_full_version_tags(state.local.keys().cloned()))
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state().local.contains_key(name))
    }

    fn tag_target(&self, name: &str) -> Result<Option<String>> {
        Ok(self.state().local.get(name).cloned())
    }

    fn create_tag(&self, name: &str, _message: &str) -> Result<()> {
        let mut state = self.state();
        Self::check(&state, TagOp::Create, Some(name))?;

        if state.local.contains_key(name) {
            return Err(ReleaseError::tag_operation(format!(
                "tag '{}' already exists",
                name
            )));
        }

        let head = state.head.clone();
        state.local.insert(name.to_string(), head);
        state.log.push(format!("create {}", name));
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        Self::check(&state, TagOp::Delete, Some(name))?;

        state.local.remove(name);
        state.remote.remove(name);
        state.log.push(format!("delete {}", name));
        Ok(())
    }

    fn push_tag(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        Self::check(&state, TagOp::Push, Some(name))?;

        let commit = state
            .local
            .get(name)
            .cloned()
            .ok_or_else(|| ReleaseError::tag_operation(format!("no local tag '{}'", name)))?;

        if state.remote.get(name).is_some_and(|existing| *existing != commit) {
            return Err(ReleaseError::tag_operation(format!(
                "remote rejected '{}': already exists",
                name
            )));
        }

        state.remote.insert(name.to_string(), commit);
        state.log.push(format!("push {}", name));
        Ok(())
    }

    fn push_all_pending_commits(&self) -> Result<()> {
        let mut state = self.state();
        Self::check(&state, TagOp::PushCommits, None)?;

        state.pushed_commits += 1;
        state.log.push("push commits".to_string());
        Ok(())
    }

    fn fetch_remote_tags(&self) -> Result<()> {
        let mut state = self.state();
        Self::check(&state, TagOp::Fetch, None)?;

        let remote = state.remote.clone();
        state.local.extend(remote);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_create_and_target() {
        let repo = MockTagRepository::new("abc123");
        repo.create_tag("v1.0.0", "Release v1.0.0").unwrap();

        assert!(repo.tag_exists("v1.0.0").unwrap());
        assert_eq!(repo.tag_target("v1.0.0").unwrap(), Some("abc123".to_string()));
        assert_eq!(repo.remote_target("v1.0.0"), None);
    }

    #[test]
    fn test_mock_create_existing_fails() {
        let repo = MockTagRepository::new("abc123").with_tag("v1.0.0", "old");
        assert!(repo.create_tag("v1.0.0", "again").is_err());
    }

    #[test]
    fn test_mock_delete_missing_is_ok() {
        let repo = MockTagRepository::new("abc123");
        assert!(repo.delete_tag("v9.9.9").is_ok());
    }

    #[test]
    fn test_mock_push_copies_to_remote() {
        let repo = MockTagRepository::new("abc123");
        repo.create_tag("v1.0.0", "Release").unwrap();
        repo.push_tag("v1.0.0").unwrap();
        assert_eq!(repo.remote_target("v1.0.0"), Some("abc123".to_string()));
    }

    #[test]
    fn test_mock_list_sorted_and_filtered() {
        let repo = MockTagRepository::new("h")
            .with_tag("v1.2.0", "a")
            .with_tag("v1.10.0", "b")
            .with_tag("v1", "b");

        assert_eq!(repo.list_full_version_tags().unwrap(), vec!["v1.10.0", "v1.2.0"]);
    }

    #[test]
    fn test_mock_fetch_brings_remote_tags() {
        let repo = MockTagRepository::new("h").with_remote_tag("v3.0.0", "c");
        assert!(repo.list_full_version_tags().unwrap().is_empty());

        repo.fetch_remote_tags().unwrap();
        assert_eq!(repo.list_full_version_tags().unwrap(), vec!["v3.0.0"]);
    }

    #[test]
    fn test_mock_failure_injection() {
        let repo = MockTagRepository::new("h");
        repo.fail_on(TagOp::Create);
        assert!(repo.create_tag("v1.0.0", "m").is_err());

        repo.clear_failures();
        repo.fail_for_tag("v2");
        assert!(repo.create_tag("v1.0.0", "m").is_ok());
        assert!(repo.create_tag("v2", "m").is_err());
    }
}
