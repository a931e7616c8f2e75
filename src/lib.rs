//! # Protovend Library
//!
//! This library provides the core functionality for vendoring Protobuf schema
//! files from remote git repositories into a local output tree. It is designed
//! to be used by the `protovend` command-line tool but can also be integrated
//! into other build tooling that needs reproducible schema dependencies.
//!
//! ## Quick Example
//!
//! ```
//! use protovend::config;
//! use protovend::lock::LockFile;
//!
//! // Parse a configuration
//! let yaml = r#"
//! path: proto/3pd
//! deps:
//!   - type: git
//!     repo: github.com/example/schemas
//!     path: proto
//!     ref: v1.0.0
//! "#;
//! let cfg = config::parse(yaml).unwrap();
//! assert_eq!(cfg.deps.len(), 1);
//!
//! // An absent lock file is just an empty set
//! let lock = LockFile::default();
//! assert!(lock.deps.is_empty());
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The declarative list of schema
//!   dependencies (repository, sub-path, git ref, filters) and the output
//!   path, read from `protovend.yaml` or an embedded `buf.yaml` section.
//! - **Bundle (`bundle`)**: An in-memory set of path+content pairs
//!   representing one dependency's materialized files, staged before any
//!   write to the output tree.
//! - **Digest (`digest`)**: A deterministic SHA-256 fingerprint over a
//!   bundle's sorted contents, used for change detection.
//! - **Lock record (`lock`)**: The persisted `protovend.lock` mapping each
//!   dependency identity to its resolved digest and commit, making re-runs
//!   idempotent and auditable.
//! - **Acquisition (`git`)**: Drives the system git client to obtain one
//!   revision of a repository in a self-cleaning scratch directory.
//! - **Reconciliation (`reconcile`)**: Per dependency, decides reuse-vs-
//!   refetch, updates the lock set, and stages bundles for a single write-out
//!   pass at the end of the run.
//!
//! ## Execution Flow
//!
//! For each declared dependency, in order: check the output tree for a local
//! candidate; reuse it if its digest matches the lock record, otherwise clone
//! the repository, check out the ref, and rebuild the bundle from the fresh
//! tree. Only after every dependency has been decided are bundles written to
//! disk and the lock record persisted. Any failure aborts the run before any
//! file is written, so the lock file always reflects a complete run.

pub mod bundle;
pub mod config;
pub mod digest;
pub mod error;
pub mod git;
pub mod lock;
pub mod reconcile;
