/// Composer autoload support.
///
/// Parses `composer.json` for PSR-4 autoload mappings and resolves
/// fully-qualified PHP class names to files on disk with them.  The
/// workspace uses this to load parent classes and property types of the
/// test code being rewritten without scanning the whole project.
///
/// # PSR-4 Resolution
///
/// Given a mapping like `"App\\" => "src/"`, the class `App\Models\User`
/// resolves to `<root>/src/Models/User.php`: strip the matching prefix,
/// turn namespace separators into directory separators, append `.php`.
///
/// # Classmap
///
/// Dependencies under `vendor/` are not covered by the project's PSR-4
/// mappings.  `composer install` writes `vendor/composer/autoload_classmap.php`
/// mapping class names straight to files; with `-o` it lists every
/// autoloadable class.  [`parse_autoload_classmap`] reads it so parents
/// such as a framework's base model can be loaded too.
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::util::is_builtin_type;

/// A single PSR-4 namespace-to-directory mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Psr4Mapping {
    /// The namespace prefix, always ending with `\` (e.g. `"App\"`), or
    /// empty for a root fallback.
    pub prefix: String,
    /// The base directory relative to the workspace root, with forward
    /// slashes and a trailing `/` (e.g. `"src/"`).
    pub base_path: String,
}

/// The subset of `composer.json` this crate reads.
#[derive(Debug, Default, Deserialize)]
struct ComposerJson {
    #[serde(default)]
    autoload: Autoload,
    #[serde(default, rename = "autoload-dev")]
    autoload_dev: Autoload,
    #[serde(default)]
    config: ComposerConfig,
}

#[derive(Debug, Default, Deserialize)]
struct ComposerConfig {
    #[serde(default, rename = "vendor-dir")]
    vendor_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Autoload {
    #[serde(default, rename = "psr-4")]
    psr4: BTreeMap<String, Psr4Paths>,
}

/// A PSR-4 value is either one directory or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Psr4Paths {
    One(String),
    Many(Vec<String>),
}

/// Parse `<workspace_root>/composer.json` and return all PSR-4 mappings
/// from `autoload` and `autoload-dev`, longest prefix first.
///
/// A missing or malformed file yields no mappings; class loading then
/// simply falls back to the files being processed.
pub fn parse_composer_json(workspace_root: &Path) -> Vec<Psr4Mapping> {
    let Some(composer) = read_composer_json(workspace_root) else {
        return Vec::new();
    };

    let mut mappings = Vec::new();
    for section in [composer.autoload, composer.autoload_dev] {
        for (prefix, paths) in section.psr4 {
            let prefix = normalise_prefix(&prefix);
            let paths = match paths {
                Psr4Paths::One(path) => vec![path],
                Psr4Paths::Many(paths) => paths,
            };
            mappings.extend(paths.iter().map(|path| Psr4Mapping {
                prefix: prefix.clone(),
                base_path: normalise_path(path),
            }));
        }
    }

    // Stable sort keeps the declared order of multi-directory prefixes.
    mappings.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
    mappings
}

fn read_composer_json(workspace_root: &Path) -> Option<ComposerJson> {
    let composer_path = workspace_root.join("composer.json");
    let content = match std::fs::read_to_string(&composer_path) {
        Ok(c) => c,
        Err(_) => {
            tracing::debug!("no composer.json at {}", composer_path.display());
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!("ignoring malformed {}: {}", composer_path.display(), err);
            None
        }
    }
}

/// The vendor directory relative to the root: `config.vendor-dir` from
/// `composer.json`, or `vendor`.
pub fn vendor_dir(workspace_root: &Path) -> String {
    read_composer_json(workspace_root)
        .and_then(|composer| composer.config.vendor_dir)
        .map(|dir| dir.trim_end_matches('/').to_string())
        .unwrap_or_else(|| "vendor".to_string())
}

/// Parse `<root>/<vendor_dir>/composer/autoload_classmap.php` into a map
/// from lower-cased FQN to file path.
///
/// Composer generates one `'Name' => <path expression>,` line per class,
/// where the path expression is `$vendorDir . '/…'`, `$baseDir . '/…'`, or
/// a plain string.  Lines of any other shape are ignored.  A missing file
/// yields an empty map.
pub fn parse_autoload_classmap(
    workspace_root: &Path,
    vendor_dir: &str,
) -> HashMap<String, PathBuf> {
    let vendor_path = workspace_root.join(vendor_dir);
    let classmap_path = vendor_path.join("composer").join("autoload_classmap.php");
    let content = match std::fs::read_to_string(&classmap_path) {
        Ok(c) => c,
        Err(_) => {
            tracing::debug!("no classmap at {}", classmap_path.display());
            return HashMap::new();
        }
    };

    let mut classmap = HashMap::new();
    for line in content.lines() {
        let Some((key, value)) = line.trim().split_once("=>") else {
            continue;
        };
        let Some(class_name) = single_quoted(key.trim()) else {
            continue;
        };
        let value = value.trim().trim_end_matches(',').trim_end();
        let Some(path) = classmap_path_value(value, workspace_root, &vendor_path) else {
            continue;
        };
        let key = class_name.trim_start_matches('\\').to_ascii_lowercase();
        classmap.insert(key, path);
    }
    tracing::debug!("classmap has {} entries", classmap.len());
    classmap
}

/// Evaluate a classmap path expression.
fn classmap_path_value(value: &str, base_dir: &Path, vendor_dir: &Path) -> Option<PathBuf> {
    let (base, literal) = match value.split_once('.') {
        Some((variable, rest)) if variable.trim_start().starts_with('$') => {
            let base = match variable.trim() {
                "$vendorDir" => vendor_dir,
                "$baseDir" => base_dir,
                _ => return None,
            };
            (Some(base), rest.trim())
        }
        _ => (None, value),
    };

    let literal = single_quoted(literal)?;
    Some(match base {
        Some(base) => base.join(literal.trim_start_matches('/')),
        None => PathBuf::from(literal),
    })
}

/// The contents of a PHP single-quoted string literal that makes up all
/// of `text`, with `\\` and `\'` unescaped.
fn single_quoted(text: &str) -> Option<String> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('\\' | '\'')) => out.push(next),
                Some(next) => {
                    out.push(c);
                    out.push(next);
                }
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

fn normalise_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('\\') {
        prefix.to_string()
    } else {
        format!("{}\\", prefix)
    }
}

/// Use forward slashes and end with `/` (empty stays empty: the root).
fn normalise_path(path: &str) -> String {
    let p = path.replace('\\', "/");
    if p.is_empty() || p.ends_with('/') {
        p
    } else {
        format!("{}/", p)
    }
}

/// Resolve a fully-qualified class name to an existing file using PSR-4
/// mappings.  A leading `\` is ignored.
///
/// Returns the first candidate that exists on disk.
pub fn resolve_class_path(
    mappings: &[Psr4Mapping],
    workspace_root: &Path,
    class_name: &str,
) -> Option<PathBuf> {
    let name = class_name.strip_prefix('\\').unwrap_or(class_name);
    if is_builtin_type(name) {
        return None;
    }

    mappings.iter().find_map(|mapping| {
        let relative = if mapping.prefix.is_empty() {
            name
        } else {
            name.strip_prefix(&mapping.prefix)?
        };
        let file_path = workspace_root
            .join(&mapping.base_path)
            .join(format!("{}.php", relative.replace('\\', "/")));
        file_path.is_file().then_some(file_path)
    })
}
