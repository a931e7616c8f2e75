//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `protovend` application. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures and ensure
//!   type safety.
//!
//! Failures from collaborators (git, the filesystem, YAML parsing) are wrapped
//! with the operation that produced them and propagated unchanged to the
//! top-level caller. No error in this crate is silently retried.

use thiserror::Error;

/// Main error type for protovend operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing the `protovend.yaml` configuration.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An error occurred while cloning a Git repository.
    #[error("Git clone error for {url}: {message}")]
    GitClone { url: String, message: String },

    /// An error occurred while executing a Git command in a working copy.
    #[error("Git command failed in {dir}: {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// Discovery under a directory yielded no schema files at all.
    ///
    /// Fatal when it happens during a remote fetch: a dependency that
    /// resolves to zero files would vendor nothing and poison the lock
    /// record.
    #[error("No .proto files matching filters {filters:?} under {dir}")]
    NoMatchingFiles { dir: String, filters: Vec<String> },

    /// A bundle was empty, or its digest collapsed to the empty-input
    /// sentinel. Either way the bundle must not be persisted or locked.
    #[error("Degenerate bundle: {message}")]
    DegenerateBundle { message: String },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
