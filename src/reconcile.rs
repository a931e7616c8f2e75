//! Dependency reconciliation
//!
//! For each declared dependency this module decides whether the previously
//! vendored output is still valid (reused without touching the network) or
//! must be re-acquired, and keeps the lock record consistent across runs.
//!
//! Per dependency the flow is: check the output tree for a local candidate;
//! if one exists and its digest byte-equals the stored lock entry, reuse it
//! and preserve the stored acquisition metadata. Anything else (no candidate,
//! no stored entry, digest drift) triggers a fresh acquisition. Dependencies
//! are processed strictly one at a time in declaration order.
//!
//! Side-effect ordering is the load-bearing part: digests are computed and
//! every bundle staged before a single output file is written, and the caller
//! persists the lock file only after this module returns `Ok`. A failure for
//! any dependency therefore leaves both the output tree's previous contents
//! and the on-disk lock exactly as they were.

use std::path::Path;

use crate::bundle::{self, Bundle};
use crate::config::{Config, Dep, DepKind};
use crate::digest;
use crate::error::Result;
use crate::git::{self, VcsClient};
use crate::lock::{LockFile, LockMetadata, LockedDep};

/// Inspect `output_base/basename(repo)` for an already-vendored bundle
/// matching the dependency's filters.
///
/// Absence of the directory or of matching files is not an error; it just
/// means there is nothing usable yet and a fetch is required.
pub fn check_local(output_base: &Path, dep: &Dep) -> Result<Option<Bundle>> {
    let candidate = output_base.join(dep.repo_basename());
    if !candidate.exists() {
        log::debug!("no local copy at {}", candidate.display());
        return Ok(None);
    }

    let files = bundle::find_schema_files(&candidate, &dep.filter)?;
    if files.is_empty() {
        log::warn!(
            "{} exists but holds no matching schema files, ignoring it",
            candidate.display()
        );
        return Ok(None);
    }

    let mut local = Bundle::new();
    for relative in &files {
        local.add_file(&candidate, relative)?;
    }
    Ok(Some(local))
}

/// Acquire the dependency's reference from its remote and build a bundle
/// from `<scratch>/<dep.path>`. The scratch checkout lives only as long as
/// bundle construction.
fn fetch_remote(client: &dyn VcsClient, dep: &Dep) -> Result<Bundle> {
    let (scratch, commit) = git::acquire(client, &dep.repo, &dep.r#ref)?;
    log::info!("{}@{} resolved to commit {}", dep.repo, dep.r#ref, commit);

    let mut fetched = Bundle::with_commit(commit);
    fetched.add_all_matching(&scratch.path().join(&dep.path), &dep.filter)?;
    Ok(fetched)
}

/// Build the lock entry recording `bundle` as the resolved content of `dep`.
fn lock_entry(dep: &Dep, resolved: &Bundle) -> Result<LockedDep> {
    Ok(LockedDep {
        metadata: LockMetadata {
            kind: dep.kind.as_str().to_string(),
            commit: resolved.commit().unwrap_or_default().to_string(),
        },
        repo: dep.repo.clone(),
        path: dep.path.clone(),
        r#ref: dep.r#ref.clone(),
        digest: digest::digest(resolved)?,
    })
}

/// Reconcile every declared dependency against the output tree and the lock
/// set, then write the resulting bundles under `output_base`.
///
/// This is the whole contract the CLI depends on. `lock` is updated in
/// memory; persisting it is the caller's job and must only happen when this
/// returns `Ok`.
pub fn reconcile(
    config: &Config,
    lock: &mut LockFile,
    output_base: &Path,
    client: &dyn VcsClient,
) -> Result<()> {
    let mut staged: Vec<(String, Bundle)> = Vec::new();

    for dep in &config.deps {
        if let DepKind::Other(kind) = &dep.kind {
            log::warn!(
                "unsupported dependency type '{}' for {}, skipping",
                kind,
                dep.repo
            );
            continue;
        }

        let stored = lock.entry_for(dep).cloned();
        let mut resolved: Option<(Bundle, LockedDep)> = None;

        if let Some(local) = check_local(output_base, dep)? {
            let mut entry = lock_entry(dep, &local)?;
            match &stored {
                Some(stored) if stored.content_matches(&entry) => {
                    log::info!("{}@{} is up to date, reusing local copy", dep.repo, dep.r#ref);
                    entry.metadata = stored.metadata.clone();
                    resolved = Some((local, entry));
                }
                _ => {
                    log::warn!(
                        "local copy of {}@{} does not match the lock record, refetching",
                        dep.repo,
                        dep.r#ref
                    );
                }
            }
        }

        let (chosen, entry) = match resolved {
            Some(reused) => reused,
            None => {
                log::info!("fetching {}@{}", dep.repo, dep.r#ref);
                let fetched = fetch_remote(client, dep)?;
                let entry = lock_entry(dep, &fetched)?;
                (fetched, entry)
            }
        };

        lock.upsert(entry);
        staged.push((dep.repo_basename().to_string(), chosen));
    }

    // Decision phase is over; only now do filesystem side effects begin.
    for (basename, bundle) in &staged {
        let dest = output_base.join(basename);
        log::info!("writing {} files to {}", bundle.len(), dest.display());
        bundle.write_to(&dest)?;
    }

    Ok(())
}
