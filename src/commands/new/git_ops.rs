//! Git and GitHub operations for the `new` command.
//!
//! The template clone, the fresh repository on the composed tree, and the
//! optional remote creation all go through the external tool runner; exit
//! status is the only signal inspected.

use crate::error::{Result, SprigError};
use crate::tools::run_tool;
use std::fs;
use std::path::Path;

/// Clone the template repository into `target`. Works for git URLs and
/// local paths alike.
pub(super) fn clone_template(template: &str, target: &Path) -> Result<()> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let target_str = target.to_str().ok_or_else(|| {
        SprigError::User(format!("target path '{}' is not valid UTF-8", target.display()))
    })?;

    run_tool(parent, "git", &["clone", "--depth", "1", template, target_str])?;
    Ok(())
}

/// Drop the template's own history; the composed service starts fresh.
pub(super) fn remove_embedded_git(target: &Path) -> Result<()> {
    let git_dir = target.join(".git");
    if git_dir.exists() {
        fs::remove_dir_all(&git_dir).map_err(|e| {
            SprigError::User(format!(
                "failed to remove template git directory '{}': {}",
                git_dir.display(),
                e
            ))
        })?;
    }
    Ok(())
}

/// Initialize a fresh repository on `branch`. After this point the composed
/// tree is never cleaned up automatically.
pub(super) fn init_repository(target: &Path, branch: &str) -> Result<()> {
    run_tool(target, "git", &["init"])?;
    // Sets HEAD to an unborn branch of the configured name; works on git
    // versions without `init --initial-branch`.
    run_tool(
        target,
        "git",
        &["symbolic-ref", "HEAD", &format!("refs/heads/{}", branch)],
    )?;
    Ok(())
}

/// Stage everything and create the initial commit.
pub(super) fn initial_commit(target: &Path, message: &str) -> Result<()> {
    run_tool(target, "git", &["add", "-A"])?;
    run_tool(target, "git", &["commit", "-m", message])?;
    Ok(())
}

/// Create a private remote repository and push the initial commit.
pub(super) fn publish(target: &Path, name: &str) -> Result<()> {
    run_tool(
        target,
        "gh",
        &["repo", "create", name, "--private", "--source", ".", "--push"],
    )?;
    Ok(())
}

/// True once git history exists on the composed tree.
pub(super) fn has_git_history(target: &Path) -> bool {
    target.join(".git").exists()
}
