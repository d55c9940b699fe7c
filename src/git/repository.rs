use crate::domain::tag::sort_full_version_tags;
use crate::error::{ReleaseError, Result};
use git2::{
    Cred, CredentialType, Direction, ErrorCode, FetchOptions, PushOptions, RemoteCallbacks,
    Repository, Signature,
};
use std::cell::RefCell;
use std::path::Path;
use tracing::debug;

const DEFAULT_TAGGER_NAME: &str = "auto-release";
const DEFAULT_TAGGER_EMAIL: &str = "auto-release@users.noreply.github.com";

/// Tag repository backed by a local clone via libgit2
pub struct Git2TagRepository {
    repo: Repository,
    remote: String,
    token: Option<String>,
}

impl Git2TagRepository {
    /// Open or discover a git repository, using `remote` for push and fetch
    pub fn open<P: AsRef<Path>>(path: P, remote: impl Into<String>) -> Result<Self> {
        let repo = Repository::discover(path)?;

        Ok(Git2TagRepository {
            repo,
            remote: remote.into(),
            token: None,
        })
    }

    /// Authenticate HTTPS remotes with an access token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn find_remote(&self) -> Result<git2::Remote<'_>> {
        self.repo.find_remote(&self.remote).map_err(|e| {
            ReleaseError::tag_operation(format!("Cannot find remote '{}': {}", self.remote, e))
        })
    }

    fn callbacks(&self) -> RemoteCallbacks<'_> {
        let token = self.token.as_deref();
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, username_from_url, allowed_types| {
            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                if let Some(token) = token {
                    return Cred::userpass_plaintext("x-access-token", token);
                }
            }

            if allowed_types.contains(CredentialType::SSH_KEY) {
                return Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"));
            }

            Cred::default()
        });
        callbacks
    }

    fn push_refspecs(&self, refspecs: &[String]) -> Result<()> {
        let mut remote = self.find_remote()?;
        let rejected = RefCell::new(Vec::new());

        {
            let mut callbacks = self.callbacks();
            callbacks.push_update_reference(|refname, status| {
                if let Some(status) = status {
                    rejected
                        .borrow_mut()
                        .push(format!("{}: {}", refname, status));
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);

            let specs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
            remote.push(&specs, Some(&mut options)).map_err(|e| {
                ReleaseError::tag_operation(format!(
                    "Push of {} to '{}' failed: {}",
                    refspecs.join(", "),
                    self.remote,
                    e
                ))
            })?;
        }

        let rejected = rejected.into_inner();
        if rejected.is_empty() {
            Ok(())
        } else {
            Err(ReleaseError::tag_operation(format!(
                "Remote '{}' rejected {}",
                self.remote,
                rejected.join("; ")
            )))
        }
    }

    fn remote_has_tag(&self, name: &str) -> Result<bool> {
        let mut remote = self.find_remote()?;
        let connection = remote.connect_auth(Direction::Fetch, Some(self.callbacks()), None)?;
        let reference = format!("refs/tags/{}", name);

        let exists = connection
            .list()?
            .iter()
            .any(|head| head.name() == reference);
        Ok(exists)
    }
}

impl super::TagRepository for Git2TagRepository {
    fn list_full_version_tags(&self) -> Result<Vec<String>> {
        let names = self.repo.tag_names(Some("v*"))?;

        Ok(sort_full_version_tags(names.iter().flatten()))
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.tag_target(name)?.is_some())
    }

    fn tag_target(&self, name: &str) -> Result<Option<String>> {
        match self.repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(reference) => {
                let commit = reference.peel_to_commit().map_err(|e| {
                    ReleaseError::tag_operation(format!("Cannot peel tag '{}': {}", name, e))
                })?;
                Ok(Some(commit.id().to_string()))
            }
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(ReleaseError::tag_operation(format!(
                "Cannot find tag '{}': {}",
                name, e
            ))),
        }
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        let signature = self
            .repo
            .signature()
            .or_else(|_| Signature::now(DEFAULT_TAGGER_NAME, DEFAULT_TAGGER_EMAIL))?;

        self.repo
            .tag(name, head.as_object(), &signature, message, false)
            .map_err(|e| ReleaseError::tag_operation(format!("Cannot create tag '{}': {}", name, e)))?;

        debug!(tag = name, commit = %head.id(), "created local tag");
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        match self.repo.tag_delete(name) {
            Ok(()) => debug!(tag = name, "deleted local tag"),
            Err(e) if e.code() == ErrorCode::NotFound => {}
            Err(e) => {
                return Err(ReleaseError::tag_operation(format!(
                    "Cannot delete tag '{}': {}",
                    name, e
                )))
            }
        }

        if self.remote_has_tag(name)? {
            self.push_refspecs(&[format!(":refs/tags/{}", name)])?;
            debug!(tag = name, remote = %self.remote, "deleted remote tag");
        }

        Ok(())
    }

    fn push_tag(&self, name: &str) -> Result<()> {
        let reference = format!("refs/tags/{}", name);
        self.push_refspecs(&[format!("{}:{}", reference, reference)])
    }

    fn push_all_pending_commits(&self) -> Result<()> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(ReleaseError::tag_operation(
                "HEAD is detached; there is no branch to push",
            ));
        }

        let branch = head
            .name()
            .ok_or_else(|| ReleaseError::tag_operation("Branch name is not valid UTF-8"))?
            .to_string();
        self.push_refspecs(&[format!("{}:{}", branch, branch)])
    }

    fn fetch_remote_tags(&self) -> Result<()> {
        let mut remote = self.find_remote()?;

        let mut options = FetchOptions::new();
        options.remote_callbacks(self.callbacks());

        remote
            .fetch(&["+refs/tags/*:refs/tags/*"], Some(&mut options), None)
            .map_err(|e| {
                ReleaseError::tag_operation(format!(
                    "Failed to fetch tags from '{}': {}",
                    self.remote, e
                ))
            })?;

        Ok(())
    }
}
