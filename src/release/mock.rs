use crate::error::{ReleaseError, Result};
use crate::release::{Asset, NewRelease, Release, ReleaseRepository};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockState {
    releases: BTreeMap<u64, Release>,
    assets: BTreeMap<u64, Vec<Asset>>,
    next_id: u64,
    failing_creates: HashSet<String>,
    failing_assets: HashSet<String>,
    fail_list_assets: bool,
    log: Vec<String>,
}

impl MockState {
    fn find_by_tag(&self, tag: &str) -> Option<&Release> {
        self.releases.values().find(|r| r.tag_name == tag)
    }

    fn store(&mut self, id: u64, release: &NewRelease) -> Release {
        let stored = Release {
            id,
            tag_name: release.tag_name.clone(),
            name: Some(release.name.clone()),
            body: Some(release.body.clone()),
            draft: release.draft,
            prerelease: release.prerelease,
            html_url: format!("https://example.test/releases/tag/{}", release.tag_name),
            upload_url: None,
        };
        self.releases.insert(id, stored.clone());
        stored
    }
}

/// In-memory release repository keyed by tag name
///
/// Enforces at most one release per tag, like the real API.
pub struct MockReleaseRepository {
    state: Mutex<MockState>,
}

impl MockReleaseRepository {
    /// Create an empty release store
    pub fn new() -> Self {
        MockReleaseRepository {
            state: Mutex::new(MockState {
                next_id: 1,
                ..MockState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed an existing release, returning it
    pub fn seed(&self, release: NewRelease) -> Release {
        let mut state = self.state();
        let id = state.next_id;
        state.next_id += 1;
        state.store(id, &release)
    }

    /// Attach an asset to a stored release
    pub fn add_asset(&self, release_id: u64, name: impl Into<String>) {
        let mut state = self.state();
        let id = state.assets.values().map(Vec::len).sum::<usize>() as u64 + 1000;
        state.assets.entry(release_id).or_default().push(Asset {
            id,
            name: name.into(),
            content_type: "application/octet-stream".to_string(),
            size: 0,
        });
    }

    /// Make release creation fail for one tag
    pub fn fail_create_for(&self, tag: impl Into<String>) {
        self.state().failing_creates.insert(tag.into());
    }

    /// Make copying one asset (by name) fail
    pub fn fail_asset(&self, name: impl Into<String>) {
        self.state().failing_assets.insert(name.into());
    }

    /// Make listing assets fail
    pub fn fail_list_assets(&self) {
        self.state().fail_list_assets = true;
    }

    /// Release bound to `tag`, if any
    pub fn release_for(&self, tag: &str) -> Option<Release> {
        self.state().find_by_tag(tag).cloned()
    }

    /// Asset names attached to the release for `tag`
    pub fn asset_names(&self, tag: &str) -> Vec<String> {
        let state = self.state();
        state
            .find_by_tag(tag)
            .and_then(|r| state.assets.get(&r.id))
            .map(|assets| assets.iter().map(|a| a.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of releases stored
    pub fn count(&self) -> usize {
        self.state().releases.len()
    }

    /// Mutating calls in order, e.g. `create v1.2.4`
    pub fn log(&self) -> Vec<String> {
        self.state().log.clone()
    }
}

impl Default for MockReleaseRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseRepository for MockReleaseRepository {
    fn get_by_tag(&self, tag: &str) -> Result<Option<Release>> {
        Ok(self.state().find_by_tag(tag).cloned())
    }

    fn create(&self, release: &NewRelease) -> Result<Release> {
        let mut state = self.state();

        if state.failing_creates.contains(&release.tag_name) {
            return Err(ReleaseError::api(format!(
                "injected create failure for '{}'",
                release.tag_name
            )));
        }
        if state.find_by_tag(&release.tag_name).is_some() {
            return Err(ReleaseError::api(format!(
                "422 Validation Failed: release for '{}' already exists",
                release.tag_name
            )));
        }

        let id = state.next_id;
        state.next_id += 1;
        state.log.push(format!("create {}", release.tag_name));
        Ok(state.store(id, release))
    }

    fn update(&self, id: u64, release: &NewRelease) -> Result<Release> {
        let mut state = self.state();
        if !state.releases.contains_key(&id) {
            return Err(ReleaseError::api(format!("404 release {} not found", id)));
        }

        state.log.push(format!("update {}", release.tag_name));
        Ok(state.store(id, release))
    }

    fn delete(&self, id: u64) -> Result<()> {
        let mut state = self.state();
        if let Some(removed) = state.releases.remove(&id) {
            state.assets.remove(&id);
            state.log.push(format!("delete {}", removed.tag_name));
        }
        Ok(())
    }

    fn list_assets(&self, release: &Release) -> Result<Vec<Asset>> {
        let state = self.state();
        if state.fail_list_assets {
            return Err(ReleaseError::api("injected list assets failure"));
        }
        Ok(state.assets.get(&release.id).cloned().unwrap_or_default())
    }

    fn copy_asset(&self, _source: &Release, target: &Release, asset: &Asset) -> Result<()> {
        let mut state = self.state();
        if state.failing_assets.contains(&asset.name) {
            return Err(ReleaseError::asset_copy(format!(
                "injected failure for '{}'",
                asset.name
            )));
        }

        let copied = Asset {
            id: asset.id + 10_000,
            ..asset.clone()
        };
        state.assets.entry(target.id).or_default().push(copied);
        state.log.push(format!("copy {} -> {}", asset.name, target.tag_name));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get_by_tag() {
        let repo = MockReleaseRepository::new();
        let created = repo
            .create(&NewRelease::new("v1.0.0", "Release v1.0.0", "notes", false))
            .unwrap();

        let found = repo.get_by_tag("v1.0.0").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.body.as_deref(), Some("notes"));
        assert!(repo.get_by_tag("v2.0.0").unwrap().is_none());
    }

    #[test]
    fn test_one_release_per_tag() {
        let repo = MockReleaseRepository::new();
        let release = NewRelease::new("v1.0.0", "t", "b", false);
        repo.create(&release).unwrap();
        assert!(repo.create(&release).is_err());
        assert_eq!(repo.count(), 1);
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let repo = MockReleaseRepository::new();
        assert!(repo.delete(99).is_ok());
    }

    #[test]
    fn test_update_replaces_body() {
        let repo = MockReleaseRepository::new();
        let created = repo.seed(NewRelease::new("v1.0.0", "t", "old", false));
        repo.update(created.id, &NewRelease::new("v1.0.0", "t", "new", false))
            .unwrap();
        assert_eq!(repo.release_for("v1.0.0").unwrap().body.as_deref(), Some("new"));
    }

    #[test]
    fn test_copy_asset() {
        let repo = MockReleaseRepository::new();
        let source = repo.seed(NewRelease::new("v1.0.0", "t", "b", false));
        let target = repo.seed(NewRelease::new("v1", "t", "b", false));
        repo.add_asset(source.id, "app.tar.gz");

        let assets = repo.list_assets(&source).unwrap();
        repo.copy_asset(&source, &target, &assets[0]).unwrap();
        assert_eq!(repo.asset_names("v1"), vec!["app.tar.gz"]);
    }
}
