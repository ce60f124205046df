//! Git repository fixtures built with `git2`, so no `git` binary is needed.

use std::fs;
use std::path::Path;

/// Initialises a real git repository with no commits.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Initialises a repository with one commit containing `README.md`.
///
/// Returns the full hash of that commit, which is also `HEAD`.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) -> String {
    let repo = real_git_repo(path);
    fs::write(path.join("README.md"), "# Test")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));
    commit_all(&repo, "Initial commit")
}

/// Stage every file in the work tree and commit it on `HEAD`.
///
/// Returns the new commit hash.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_all(repo: &git2::Repository, message: &str) -> String {
    let mut index = ok(repo.index(), "open index");
    ok(
        index.add_all(["*"], git2::IndexAddOption::DEFAULT, None),
        "stage files",
    );
    ok(index.write(), "write index");
    let tree_id = ok(index.write_tree(), "write tree");
    let tree = ok(repo.find_tree(tree_id), "find tree");

    let signature = ok(
        git2::Signature::now("Test User", "test@test.com"),
        "create signature",
    );
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    ok(
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents),
        "commit",
    )
    .to_string()
}

fn ok<T>(result: Result<T, git2::Error>, action: &str) -> T {
    result.unwrap_or_else(|e| panic!("commit_all: failed to {action}: {e}"))
}
