/// Run configuration.
///
/// Read from TOML:
///
/// ```toml
/// paths = ["tests"]
/// skip = ["tests/Fixtures"]
/// test_case_classes = ["App\\Testing\\IntegrationCase"]
/// ```
///
/// # Lookup order ([`Config::load`])
///
///   1. An explicit `--config <file>` (must exist)
///   2. `<root>/phpantom-refactor.toml`
///   3. `<user config dir>/phpantom/refactor.toml`
///   4. [`Config::default`]
use std::path::{Path, PathBuf};

use etcetera::BaseStrategy;
use serde::Deserialize;

use crate::error::{RefactorError, Result};

/// File name looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "phpantom-refactor.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Files or directories to process, relative to the root.
    pub paths: Vec<PathBuf>,
    /// Relative path prefixes or path fragments to leave alone.
    pub skip: Vec<String>,
    /// Extra base classes whose subclasses count as test cases.
    pub test_case_classes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from(".")],
            skip: Vec::new(),
            test_case_classes: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_toml(path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| RefactorError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RefactorError::io(path, e))?;
        Self::from_toml(path, &content)
    }

    /// Find and read the configuration for a run rooted at `root`.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let project = root.join(PROJECT_CONFIG_FILE);
        if project.is_file() {
            tracing::debug!("using config {}", project.display());
            return Self::from_file(&project);
        }

        if let Some(user) = user_config_path().filter(|p| p.is_file()) {
            tracing::debug!("using config {}", user.display());
            return Self::from_file(&user);
        }

        Ok(Self::default())
    }

    /// Whether `relative` (a path relative to the root) matches a `skip`
    /// entry, either as a leading path or as a fragment.
    pub fn is_skipped(&self, relative: &Path) -> bool {
        let text = relative.to_string_lossy().replace('\\', "/");
        let text = text.trim_start_matches("./");
        self.skip.iter().any(|entry| {
            let entry = entry.trim_start_matches("./").trim_end_matches('/');
            !entry.is_empty() && (text.starts_with(entry) || text.contains(entry))
        })
    }
}

/// `<config dir>/phpantom/refactor.toml` for the current user.
fn user_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("phpantom").join("refactor.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_keys() {
        let config = Config::from_toml(Path::new("c.toml"), "skip = [\"vendor\"]\n")
            .expect("valid config");
        assert_eq!(config.paths, vec![PathBuf::from(".")]);
        assert_eq!(config.skip, vec!["vendor".to_string()]);
        assert!(config.test_case_classes.is_empty());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = Config::from_toml(Path::new("c.toml"), "rules = [\"x\"]\n")
            .expect_err("unknown key");
        assert!(matches!(err, RefactorError::Config { .. }));
        assert!(err.to_string().contains("c.toml"));
    }

    #[test]
    fn test_project_file_wins_over_defaults() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            "paths = [\"tests\"]\ntest_case_classes = [\"App\\\\BaseCase\"]\n",
        )
        .expect("failed to write config");

        let config = Config::load(None, dir.path()).expect("config loads");
        assert_eq!(config.paths, vec![PathBuf::from("tests")]);
        assert_eq!(config.test_case_classes, vec!["App\\BaseCase".to_string()]);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&missing), dir.path()),
            Err(RefactorError::Io { .. })
        ));
    }

    #[test]
    fn test_skip_matches_prefix_and_fragment() {
        let config = Config {
            skip: vec!["tests/Fixtures/".to_string(), "Generated".to_string()],
            ..Config::default()
        };
        assert!(config.is_skipped(Path::new("tests/Fixtures/a.php")));
        assert!(config.is_skipped(Path::new("./src/Generated/b.php")));
        assert!(!config.is_skipped(Path::new("tests/Unit/c.php")));
    }
}
