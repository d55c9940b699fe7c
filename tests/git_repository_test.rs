// tests/git_repository_test.rs
use auto_release::git::{Git2TagRepository, TagRepository};
use git2::{Commit, Oid, Repository, Signature};
use std::path::Path;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    work: Repository,
    remote: Repository,
    work_path: std::path::PathBuf,
}

fn commit(repo: &Repository, message: &str) -> Oid {
    let signature = Signature::now("Test", "test@example.com").unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap()
}

fn setup() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let remote_path = dir.path().join("remote.git");
    let work_path = dir.path().join("work");

    let remote = Repository::init_bare(&remote_path).unwrap();
    let work = Repository::init(&work_path).unwrap();
    {
        let mut config = work.config().unwrap();
        config.set_str("user.name", "Test").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    work.remote("origin", remote_path.to_str().unwrap()).unwrap();
    commit(&work, "initial commit");

    Fixture {
        _dir: dir,
        work,
        remote,
        work_path,
    }
}

fn open(path: &Path) -> Git2TagRepository {
    Git2TagRepository::open(path, "origin").unwrap()
}

fn remote_tag(repo: &Repository, name: &str) -> Option<Oid> {
    repo.find_reference(&format!("refs/tags/{}", name))
        .ok()
        .and_then(|r| r.peel_to_commit().ok())
        .map(|c| c.id())
}

#[test]
fn test_create_and_push_tag() {
    let fixture = setup();
    let repo = open(&fixture.work_path);
    let head = fixture.work.head().unwrap().peel_to_commit().unwrap().id().to_string();

    repo.create_tag("v1.0.0", "Release v1.0.0").unwrap();
    assert!(repo.tag_exists("v1.0.0").unwrap());
    assert_eq!(repo.tag_target("v1.0.0").unwrap(), Some(head.clone()));

    repo.push_tag("v1.0.0").unwrap();
    assert_eq!(
        remote_tag(&fixture.remote, "v1.0.0").map(|id| id.to_string()),
        Some(head)
    );
}

#[test]
fn test_create_existing_tag_fails() {
    let fixture = setup();
    let repo = open(&fixture.work_path);

    repo.create_tag("v1.0.0", "first").unwrap();
    assert!(repo.create_tag("v1.0.0", "second").is_err());
}

#[test]
fn test_list_excludes_major_tags() {
    let fixture = setup();
    let repo = open(&fixture.work_path);

    for name in ["v1.0.0", "v1.10.0", "v1.2.0", "v1", "nightly"] {
        repo.create_tag(name, name).unwrap();
    }

    assert_eq!(
        repo.list_full_version_tags().unwrap(),
        vec!["v1.10.0", "v1.2.0", "v1.0.0"]
    );
}

#[test]
fn test_delete_removes_local_and_remote() {
    let fixture = setup();
    let repo = open(&fixture.work_path);

    repo.create_tag("v2", "major").unwrap();
    repo.push_tag("v2").unwrap();
    assert!(remote_tag(&fixture.remote, "v2").is_some());

    repo.delete_tag("v2").unwrap();
    assert!(!repo.tag_exists("v2").unwrap());
    assert!(remote_tag(&fixture.remote, "v2").is_none());
}

#[test]
fn test_delete_missing_tag_is_ok() {
    let fixture = setup();
    let repo = open(&fixture.work_path);

    repo.delete_tag("v9.9.9").unwrap();
}

#[test]
fn test_repoint_tag_to_new_commit() {
    let fixture = setup();
    let repo = open(&fixture.work_path);

    repo.create_tag("v1", "first").unwrap();
    repo.push_tag("v1").unwrap();

    let second = commit(&fixture.work, "second commit");
    repo.delete_tag("v1").unwrap();
    repo.create_tag("v1", "moved").unwrap();
    repo.push_tag("v1").unwrap();

    assert_eq!(remote_tag(&fixture.remote, "v1"), Some(second));
}

#[test]
fn test_push_commits_and_fetch_tags() {
    let fixture = setup();
    let repo = open(&fixture.work_path);

    repo.push_all_pending_commits().unwrap();

    // Someone else tagged the pushed commit on the remote
    let head = fixture.work.head().unwrap().peel_to_commit().unwrap().id();
    let target = fixture.remote.find_object(head, None).unwrap();
    fixture
        .remote
        .tag_lightweight("v3.1.4", &target, false)
        .unwrap();

    assert!(!repo.tag_exists("v3.1.4").unwrap());
    repo.fetch_remote_tags().unwrap();
    assert_eq!(repo.tag_target("v3.1.4").unwrap(), Some(head.to_string()));
}

#[test]
fn test_unknown_remote_fails() {
    let fixture = setup();
    let repo = Git2TagRepository::open(&fixture.work_path, "upstream").unwrap();

    repo.create_tag("v1.0.0", "local only").unwrap();
    assert!(repo.push_tag("v1.0.0").is_err());
    assert!(repo.fetch_remote_tags().is_err());
}
