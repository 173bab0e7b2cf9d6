//! PHPantom Refactor: type-aware PHPUnit assertion refactoring.
//!
//! The crate rewrites `assertTrue(isset(...))` / `assertFalse(isset(...))`
//! in PHPUnit test classes into the specific assertion that says what is
//! being checked (`assertArrayHasKey`, `assertObjectHasAttribute`, and
//! their negations).  Property checks are only rewritten when the object's
//! class cannot intercept `isset()` through a magic `__isset` method.
//!
//! The pieces, leaves first:
//!
//! - [`parser`]: mago_syntax parsing, class extraction, call lowering
//! - [`node`] / [`printer`]: the owned call model rules work on
//! - [`type_resolver`] / [`reflection`]: the type and class queries the
//!   rule's safety check consumes
//! - [`rule`]: the rewrite rule itself plus its renamer and argument
//!   rebuilder
//! - [`rewrite`]: the file-level pass that finds calls inside test classes,
//!   offers them to the rule, and applies the resulting text edits
//! - [`runner`]: file discovery and the two-phase multi-file run
pub mod composer;
pub mod config;
pub mod error;
pub mod node;
pub mod parser;
pub mod printer;
pub mod reflection;
pub mod rewrite;
pub mod rule;
pub mod runner;
pub mod type_resolver;
pub mod types;
pub mod util;

mod resolution;
mod test_case;

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::Mutex;

pub use error::RefactorError;
pub use rewrite::{AppliedRewrite, FileReport};
pub use types::*;

use composer::Psr4Mapping;

/// The fully-qualified name of PHPUnit's base test class.
pub const PHPUNIT_TEST_CASE: &str = "PHPUnit\\Framework\\TestCase";

/// Project-wide state shared by every file of a run: the class cache and
/// the information needed to load more classes from disk.
pub struct Workspace {
    /// Project root that PSR-4 base paths are relative to.
    root: Option<PathBuf>,
    /// PSR-4 mappings from the root's `composer.json`.
    psr4_mappings: Vec<Psr4Mapping>,
    /// Lower-cased FQN → file, from Composer's generated classmap.
    classmap: HashMap<String, PathBuf>,
    /// Maps a lower-cased FQN to its class.  `None` records a lookup that
    /// already failed so the disk is not searched for it again.
    classes: Mutex<HashMap<String, Option<ClassInfo>>>,
    /// Extra fully-qualified base classes that mark a class as a test case,
    /// in addition to [`PHPUNIT_TEST_CASE`].
    test_case_classes: Vec<String>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// A workspace without a project root: only classes registered from
    /// processed files are known.
    pub fn new() -> Self {
        Self {
            root: None,
            psr4_mappings: Vec::new(),
            classmap: HashMap::new(),
            classes: Mutex::new(HashMap::new()),
            test_case_classes: Vec::new(),
        }
    }

    /// A workspace rooted at `root`, loading classes through Composer's
    /// classmap and the PSR-4 mappings of `root/composer.json` when they
    /// exist.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let psr4_mappings = composer::parse_composer_json(&root);
        let classmap = composer::parse_autoload_classmap(&root, &composer::vendor_dir(&root));
        tracing::debug!(
            "workspace {} has {} PSR-4 mapping(s) and {} classmap entries",
            root.display(),
            psr4_mappings.len(),
            classmap.len()
        );
        Self {
            root: Some(root),
            psr4_mappings,
            classmap,
            ..Self::new()
        }
    }

    /// Treat classes extending any of `classes` as test cases too.
    pub fn with_test_case_classes(mut self, classes: Vec<String>) -> Self {
        self.test_case_classes = classes
            .into_iter()
            .map(|c| c.trim_start_matches('\\').to_string())
            .collect();
        self
    }
}
