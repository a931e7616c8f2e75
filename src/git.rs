//! Git acquisition of remote dependencies
//!
//! [`VcsClient`] is the narrow contract the reconciler depends on; reference
//! resolution rules (branch vs tag vs commit expression) are delegated
//! entirely to the client. [`SystemGit`] implements it against the system
//! `git` binary, which automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};
use tempfile::TempDir;

/// Version-control operations needed to acquire one revision of a repository.
///
/// Each operation is independently failable with a human-readable diagnostic.
pub trait VcsClient {
    /// Shallow-clone `repo` into `dest`.
    fn clone_repo(&self, repo: &str, dest: &Path) -> Result<()>;
    /// Fetch the full tag set from origin; refs expressed as tags are not
    /// resolvable from a shallow clone without this.
    fn fetch_tags(&self, dest: &Path) -> Result<()>;
    /// Check out a reference: branch name, tag, or commit-like expression.
    fn checkout(&self, dest: &Path, reference: &str) -> Result<()>;
    /// The commit identifier of HEAD in the working copy.
    fn current_commit(&self, dest: &Path) -> Result<String>;
}

/// `VcsClient` backed by the system `git` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

impl SystemGit {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| Error::GitCommand {
                command: args.join(" "),
                dir: dir.display().to_string(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::GitCommand {
                command: args.join(" "),
                dir: dir.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl VcsClient for SystemGit {
    fn clone_repo(&self, repo: &str, dest: &Path) -> Result<()> {
        let url = format!("https://{}", repo);
        let output = Command::new("git")
            .args(["clone", "--depth", "1", &url])
            .arg(dest)
            .output()
            .map_err(|e| Error::GitClone {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);

            // Provide a helpful error message for common auth failures
            let message = if stderr.contains("Authentication failed")
                || stderr.contains("Permission denied")
                || stderr.contains("Could not read from remote repository")
            {
                format!(
                    "Authentication failed. Make sure you have access to the repository.\n\
                    For private repos, ensure you have:\n\
                    - SSH key added to ssh-agent\n\
                    - Git credentials configured\n\
                    - Personal access token set up\n\
                    Error: {}",
                    stderr
                )
            } else {
                stderr.to_string()
            };

            return Err(Error::GitClone { url, message });
        }

        Ok(())
    }

    fn fetch_tags(&self, dest: &Path) -> Result<()> {
        self.run(dest, &["fetch", "origin", "--tags"])?;
        Ok(())
    }

    fn checkout(&self, dest: &Path, reference: &str) -> Result<()> {
        self.run(dest, &["checkout", reference])?;
        Ok(())
    }

    fn current_commit(&self, dest: &Path) -> Result<String> {
        let stdout = self.run(dest, &["rev-parse", "HEAD"])?;
        Ok(stdout.trim().to_string())
    }
}

/// Obtain `reference` of `repo` in a fresh scratch directory and report the
/// resolved commit.
///
/// The returned [`TempDir`] owns the checkout; dropping it deletes the
/// scratch tree. On any failure mid-acquisition the partially-populated
/// scratch directory is dropped (and thus removed) before the error
/// propagates.
pub fn acquire(client: &dyn VcsClient, repo: &str, reference: &str) -> Result<(TempDir, String)> {
    let scratch = tempfile::Builder::new()
        .prefix("protovend-git-")
        .tempdir()?;

    client.clone_repo(repo, scratch.path())?;
    client.fetch_tags(scratch.path())?;
    client.checkout(scratch.path(), reference)?;
    let commit = client.current_commit(scratch.path())?;

    Ok((scratch, commit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;

    /// A client that fails at a chosen step and records every scratch path
    /// it was handed.
    struct FailingClient {
        fail_at: &'static str,
        seen_dirs: RefCell<Vec<PathBuf>>,
        calls: Cell<usize>,
    }

    impl FailingClient {
        fn new(fail_at: &'static str) -> Self {
            Self {
                fail_at,
                seen_dirs: RefCell::new(Vec::new()),
                calls: Cell::new(0),
            }
        }

        fn step(&self, name: &'static str, dest: &Path) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            self.seen_dirs.borrow_mut().push(dest.to_path_buf());
            if self.fail_at == name {
                Err(Error::GitCommand {
                    command: name.to_string(),
                    dir: dest.display().to_string(),
                    stderr: "injected failure".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    impl VcsClient for FailingClient {
        fn clone_repo(&self, _repo: &str, dest: &Path) -> Result<()> {
            self.step("clone", dest)
        }
        fn fetch_tags(&self, dest: &Path) -> Result<()> {
            self.step("fetch_tags", dest)
        }
        fn checkout(&self, dest: &Path, _reference: &str) -> Result<()> {
            self.step("checkout", dest)
        }
        fn current_commit(&self, dest: &Path) -> Result<String> {
            self.step("rev-parse", dest)?;
            Ok("deadbeef".to_string())
        }
    }

    #[test]
    fn test_acquire_success_reports_commit() {
        let client = FailingClient::new("never");
        let (scratch, commit) = acquire(&client, "github.com/example/repo", "main").unwrap();
        assert_eq!(commit, "deadbeef");
        assert_eq!(client.calls.get(), 4);
        assert!(scratch.path().exists());

        let path = scratch.path().to_path_buf();
        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_acquire_cleans_scratch_on_clone_failure() {
        let client = FailingClient::new("clone");
        let err = acquire(&client, "github.com/example/repo", "main").unwrap_err();
        assert!(err.to_string().contains("injected failure"));
        assert_eq!(client.calls.get(), 1);

        for dir in client.seen_dirs.borrow().iter() {
            assert!(!dir.exists(), "scratch dir {} leaked", dir.display());
        }
    }

    #[test]
    fn test_acquire_cleans_scratch_on_checkout_failure() {
        let client = FailingClient::new("checkout");
        acquire(&client, "github.com/example/repo", "v1.0.0").unwrap_err();
        // clone, fetch_tags, checkout ran; rev-parse never did.
        assert_eq!(client.calls.get(), 3);

        for dir in client.seen_dirs.borrow().iter() {
            assert!(!dir.exists(), "scratch dir {} leaked", dir.display());
        }
    }

    // Exercising SystemGit end to end needs network access and a real
    // remote, so it is covered by the feature-gated CLI integration tests
    // rather than unit tests here.
}
