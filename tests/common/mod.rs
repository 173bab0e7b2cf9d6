#![allow(dead_code)]

use phpantom_refactor::Workspace;
use phpantom_refactor::rewrite::{SourceRewrite, rewrite_source};
use std::fs;

/// Wrap a test class body in a PHPUnit test case.
pub fn test_case(body: &str) -> String {
    format!(
        "<?php\nnamespace Tests;\n\nuse PHPUnit\\Framework\\TestCase;\n\nfinal class SubjectTest extends TestCase\n{{\n{}\n}}\n",
        body
    )
}

/// Rewrite `content` in a workspace without a project root.
pub fn rewrite(content: &str) -> SourceRewrite {
    rewrite_source(&Workspace::new(), content)
}

/// Helper: create a temp workspace with a composer.json and PHP files,
/// then return a Workspace rooted there with its PSR-4 mappings loaded.
pub fn create_psr4_workspace(
    composer_json: &str,
    files: &[(&str, &str)],
) -> (Workspace, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    fs::write(dir.path().join("composer.json"), composer_json)
        .expect("failed to write composer.json");
    for (rel_path, content) in files {
        let full = dir.path().join(rel_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create dirs");
        }
        fs::write(&full, content).expect("failed to write PHP file");
    }

    let workspace = Workspace::with_root(dir.path());
    (workspace, dir)
}

pub const APP_COMPOSER_JSON: &str = r#"{
    "autoload": { "psr-4": { "App\\": "src/" } },
    "autoload-dev": { "psr-4": { "Tests\\": "tests/" } }
}"#;
