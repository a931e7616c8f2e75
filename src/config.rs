//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent the `protovend.yaml`
//! configuration file, as well as the logic for parsing it.
//!
//! ## Key Components
//!
//! - **`Config`**: The top-level configuration: the output path for vendored
//!   schema files and the ordered list of declared dependencies.
//!
//! - **`Dep`**: One declared dependency: a repository identifier, a sub-path
//!   within it, a git reference, and a list of glob filters. Repository,
//!   sub-path, and reference together form the dependency's logical identity.
//!
//! - **`DepKind`**: The tagged dependency kind. Only `git` is currently
//!   meaningful; unknown kinds round-trip through `Other` so that future
//!   kinds never break parsing of existing files.
//!
//! ## Parsing
//!
//! `load` is the main entry point. It prefers a dedicated `protovend.yaml`
//! file in the working directory and falls back to a `protovend:` section
//! embedded in `buf.yaml` (which may be a multi-document YAML file; every
//! document is inspected). Either way the resulting configuration is
//! validated: it must declare at least one dependency, and no two
//! dependencies may share the same identity.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Name of the dedicated configuration file, looked up in the work dir.
pub const CONFIG_FILE: &str = "protovend.yaml";

/// The kind of a declared dependency.
///
/// Serialized as a plain string (`type: git`). Unknown strings deserialize
/// into `Other` and are skipped with a warning at reconcile time rather than
/// failing the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DepKind {
    /// A git repository reachable over HTTPS.
    Git,
    /// Any kind this version of the tool does not understand.
    Other(String),
}

impl From<String> for DepKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "git" => DepKind::Git,
            _ => DepKind::Other(s),
        }
    }
}

impl From<DepKind> for String {
    fn from(kind: DepKind) -> Self {
        match kind {
            DepKind::Git => "git".to_string(),
            DepKind::Other(s) => s,
        }
    }
}

impl DepKind {
    /// The serialized name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            DepKind::Git => "git",
            DepKind::Other(s) => s,
        }
    }
}

/// One declared schema dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dep {
    /// Dependency kind (`git` is the only supported kind today).
    #[serde(rename = "type")]
    pub kind: DepKind,
    /// Repository identifier, e.g. `github.com/bufbuild/protovalidate`.
    pub repo: String,
    /// Sub-path within the repository to vendor from.
    #[serde(default)]
    pub path: String,
    /// Git reference: branch name, tag, or commit-like expression.
    ///
    /// Used verbatim; no version-range resolution is performed.
    pub r#ref: String,
    /// Glob filters applied to discovered files. A file is kept only if it
    /// matches every filter; an empty list keeps everything.
    #[serde(default)]
    pub filter: Vec<String>,
}

impl Dep {
    /// The last path segment of the repository identifier, used as the
    /// directory name for this dependency under the output tree.
    pub fn repo_basename(&self) -> &str {
        self.repo.rsplit('/').next().unwrap_or(&self.repo)
    }

    /// The logical identity of this dependency as a comparable tuple.
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.repo, &self.path, &self.r#ref)
    }
}

/// The `protovend` configuration for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Output directory for vendored files, relative to the work dir.
    pub path: String,
    /// Declared dependencies, in order.
    pub deps: Vec<Dep>,
}

/// The subset of `buf.yaml` this tool cares about when falling back to an
/// embedded configuration section.
#[derive(Debug, Deserialize)]
struct BufYaml {
    #[serde(default)]
    protovend: Option<Config>,
}

/// Load the configuration for `workdir`.
///
/// Prefers `protovend.yaml` in the work dir; falls back to the `protovend:`
/// section of the file at `fallback` (typically `buf.yaml`).
pub fn load(workdir: &Path, fallback: &Path) -> Result<Config> {
    let dedicated = workdir.join(CONFIG_FILE);
    let config = if dedicated.exists() {
        log::info!("reading config from {}", dedicated.display());
        let content = fs::read_to_string(&dedicated)?;
        serde_yaml::from_str(&content)?
    } else {
        log::info!("reading embedded config from {}", fallback.display());
        from_embedded(fallback)?
    };
    validate(&config)?;
    Ok(config)
}

/// Parse a configuration directly from a YAML string. Used by `load` and by
/// tests that build configurations in memory.
pub fn parse(content: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Extract the `protovend:` section from a (possibly multi-document)
/// `buf.yaml` file.
fn from_embedded(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        message: format!("cannot read {}: {}", path.display(), e),
        hint: Some(format!(
            "create {} or add a 'protovend:' section to buf.yaml",
            CONFIG_FILE
        )),
    })?;

    for document in serde_yaml::Deserializer::from_str(&content) {
        let Ok(buf) = BufYaml::deserialize(document) else {
            continue;
        };
        if let Some(config) = buf.protovend {
            return Ok(config);
        }
    }

    Err(Error::ConfigParse {
        message: format!("{} does not contain a protovend section", path.display()),
        hint: Some(format!("add a 'protovend:' section or create {}", CONFIG_FILE)),
    })
}

/// Validate a parsed configuration.
///
/// A configuration with zero dependencies is unusable, and two declarations
/// with the same identity (repo + path + ref) would race each other for the
/// same lock entry and output directory.
fn validate(config: &Config) -> Result<()> {
    if config.path.is_empty() {
        return Err(Error::ConfigParse {
            message: "output path is empty".to_string(),
            hint: Some("set 'path:' to the directory vendored files go into".to_string()),
        });
    }

    if config.deps.is_empty() {
        return Err(Error::ConfigParse {
            message: "configuration does not declare any dependencies".to_string(),
            hint: Some("add at least one entry under 'deps:'".to_string()),
        });
    }

    let mut seen = HashSet::new();
    for dep in &config.deps {
        if !seen.insert(dep.identity()) {
            return Err(Error::ConfigParse {
                message: format!(
                    "duplicate dependency: {} path={} ref={}",
                    dep.repo, dep.path, dep.r#ref
                ),
                hint: Some("each repo + path + ref combination may appear only once".to_string()),
            });
        }
    }

    Ok(())
}

/// Ensure the output directory exists, creating it if necessary.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BASIC: &str = r#"
path: proto/3pd
deps:
  - type: git
    repo: github.com/bufbuild/protovalidate
    path: proto/protovalidate
    ref: v0.5.1
    filter:
      - "buf/**/*.proto"
"#;

    #[test]
    fn test_parse_basic() {
        let config = parse(BASIC).unwrap();
        assert_eq!(config.path, "proto/3pd");
        assert_eq!(config.deps.len(), 1);

        let dep = &config.deps[0];
        assert_eq!(dep.kind, DepKind::Git);
        assert_eq!(dep.repo, "github.com/bufbuild/protovalidate");
        assert_eq!(dep.path, "proto/protovalidate");
        assert_eq!(dep.r#ref, "v0.5.1");
        assert_eq!(dep.filter, vec!["buf/**/*.proto"]);
    }

    #[test]
    fn test_parse_defaults() {
        let yaml = r#"
path: out
deps:
  - type: git
    repo: github.com/example/schemas
    ref: main
"#;
        let config = parse(yaml).unwrap();
        let dep = &config.deps[0];
        assert_eq!(dep.path, "");
        assert!(dep.filter.is_empty());
    }

    #[test]
    fn test_parse_unknown_kind() {
        let yaml = r#"
path: out
deps:
  - type: registry
    repo: buf.build/example/schemas
    ref: main
"#;
        let config = parse(yaml).unwrap();
        assert_eq!(
            config.deps[0].kind,
            DepKind::Other("registry".to_string())
        );
        assert_eq!(config.deps[0].kind.as_str(), "registry");
    }

    #[test]
    fn test_parse_rejects_empty_deps() {
        let yaml = "path: out\ndeps: []\n";
        let err = parse(yaml).unwrap_err();
        assert!(err.to_string().contains("does not declare any dependencies"));
    }

    #[test]
    fn test_parse_rejects_empty_path() {
        let yaml = r#"
path: ""
deps:
  - type: git
    repo: github.com/example/schemas
    ref: main
"#;
        let err = parse(yaml).unwrap_err();
        assert!(err.to_string().contains("output path is empty"));
    }

    #[test]
    fn test_parse_rejects_duplicate_identity() {
        let yaml = r#"
path: out
deps:
  - type: git
    repo: github.com/example/schemas
    path: proto
    ref: main
  - type: git
    repo: github.com/example/schemas
    path: proto
    ref: main
"#;
        let err = parse(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate dependency"));
    }

    #[test]
    fn test_same_repo_different_ref_is_not_duplicate() {
        let yaml = r#"
path: out
deps:
  - type: git
    repo: github.com/example/schemas
    path: proto
    ref: v1.0.0
  - type: git
    repo: github.com/example/schemas
    path: proto
    ref: v2.0.0
"#;
        assert!(parse(yaml).is_ok());
    }

    #[test]
    fn test_repo_basename() {
        let config = parse(BASIC).unwrap();
        assert_eq!(config.deps[0].repo_basename(), "protovalidate");
    }

    #[test]
    fn test_load_prefers_dedicated_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), BASIC).unwrap();
        fs::write(temp.path().join("buf.yaml"), "version: v2\n").unwrap();

        let config = load(temp.path(), &temp.path().join("buf.yaml")).unwrap();
        assert_eq!(config.path, "proto/3pd");
    }

    #[test]
    fn test_load_falls_back_to_embedded_section() {
        let temp = TempDir::new().unwrap();
        let buf_yaml = r#"version: v2
modules:
  - path: proto
protovend:
  path: proto/3pd
  deps:
    - type: git
      repo: github.com/example/schemas
      ref: main
"#;
        fs::write(temp.path().join("buf.yaml"), buf_yaml).unwrap();

        let config = load(temp.path(), &temp.path().join("buf.yaml")).unwrap();
        assert_eq!(config.path, "proto/3pd");
        assert_eq!(config.deps[0].repo, "github.com/example/schemas");
    }

    #[test]
    fn test_load_embedded_multi_document() {
        let temp = TempDir::new().unwrap();
        let buf_yaml = r#"version: v1
---
version: v2
protovend:
  path: proto/3pd
  deps:
    - type: git
      repo: github.com/example/schemas
      ref: main
"#;
        fs::write(temp.path().join("buf.yaml"), buf_yaml).unwrap();

        let config = load(temp.path(), &temp.path().join("buf.yaml")).unwrap();
        assert_eq!(config.deps.len(), 1);
    }

    #[test]
    fn test_load_missing_everything() {
        let temp = TempDir::new().unwrap();
        let err = load(temp.path(), &temp.path().join("buf.yaml")).unwrap_err();
        assert!(err.to_string().contains("Configuration parsing error"));
    }

    #[test]
    fn test_load_embedded_without_section() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("buf.yaml"), "version: v2\n").unwrap();
        let err = load(temp.path(), &temp.path().join("buf.yaml")).unwrap_err();
        assert!(err.to_string().contains("protovend section"));
    }

    #[test]
    fn test_kind_round_trips_through_yaml() {
        let config = parse(BASIC).unwrap();
        let serialized = serde_yaml::to_string(&config).unwrap();
        assert!(serialized.contains("type: git"));
        let reparsed = parse(&serialized).unwrap();
        assert_eq!(reparsed, config);
    }
}
