/// File discovery and the multi-file run.
///
/// A run has two phases.  Every discovered file is read and its class-likes
/// registered first, so a test class can find a base class or a fixture
/// type declared in another file of the same run even without PSR-4.
/// Then each file that mentions `isset` at all is rewritten and, unless
/// this is a dry run, written back.
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use memchr::memmem;

use crate::Workspace;
use crate::config::Config;
use crate::error::{RefactorError, Result};
use crate::rewrite::{FileReport, rewrite_source};

/// Collect the `.php` files under `paths` (relative to `root` unless
/// absolute), honouring `.gitignore` and the config's `skip` list.
pub fn discover_files(root: &Path, paths: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let full = if path.is_absolute() {
            path.clone()
        } else {
            root.join(path)
        };
        if !full.exists() {
            return Err(RefactorError::MissingPath(full));
        }

        for entry in WalkBuilder::new(&full).build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let file = entry.path();
            if file.extension().and_then(|e| e.to_str()) != Some("php") {
                continue;
            }
            let relative = file.strip_prefix(root).unwrap_or(file);
            if config.is_skipped(relative) {
                tracing::debug!("skipping {}", relative.display());
                continue;
            }
            files.push(file.to_path_buf());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Whether a file can contain anything the rule would rewrite.
fn mentions_isset(content: &str) -> bool {
    memmem::find(content.as_bytes(), b"isset").is_some()
}

/// Rewrite `files`, returning a report for every file that changed.
pub fn run(workspace: &Workspace, files: &[PathBuf], dry_run: bool) -> Result<Vec<FileReport>> {
    let mut sources = Vec::with_capacity(files.len());
    for path in files {
        let content = std::fs::read_to_string(path).map_err(|e| RefactorError::io(path, e))?;
        workspace.register_source(&content);
        sources.push((path, content));
    }
    tracing::info!("registered classes from {} file(s)", sources.len());

    let mut reports = Vec::new();
    for (path, content) in sources {
        if !mentions_isset(&content) {
            continue;
        }

        let result = rewrite_source(workspace, &content);
        if !result.is_changed() {
            continue;
        }

        if !dry_run {
            std::fs::write(path, &result.content).map_err(|e| RefactorError::io(path, e))?;
        }
        tracing::info!("{}: {} rewrite(s)", path.display(), result.rewrites.len());
        reports.push(FileReport {
            path: path.clone(),
            rewrites: result.rewrites,
        });
    }
    Ok(reports)
}
