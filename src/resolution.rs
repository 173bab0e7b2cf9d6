/// Class lookup and lazy loading.
///
/// # Resolution pipeline ([`Workspace::find_class`])
///
///   1. **Class cache**: classes registered from files already parsed in
///      this run, plus remembered misses
///   2. **Composer classmap**: `vendor/composer/autoload_classmap.php`
///      names the file directly; this is how dependencies under `vendor/`
///      are found
///   3. **PSR-4 resolution**: map the namespace to a file through
///      `composer.json`
///
/// A loaded file is parsed and every class-like it declares registered.
///
/// Built-in PHP classes (`stdClass`, `ArrayObject`, ...) are never found,
/// which the type resolver treats as "no class information".
use std::path::Path;

use crate::Workspace;
use crate::composer;
use crate::parser;
use crate::types::ClassInfo;

/// Maximum parent-chain length followed before giving up, guarding
/// against circular `extends`.
pub(crate) const MAX_INHERITANCE_DEPTH: u32 = 20;

fn cache_key(fqn: &str) -> String {
    fqn.trim_start_matches('\\').to_ascii_lowercase()
}

impl Workspace {
    /// Add classes to the cache, replacing earlier entries of the same name.
    pub fn register_classes(&self, classes: &[ClassInfo]) {
        let mut map = self.classes.lock();
        for class in classes {
            map.insert(cache_key(&class.fqn), Some(class.clone()));
        }
    }

    /// Parse `content` and register every class-like it declares.
    /// Returns how many were registered.
    pub fn register_source(&self, content: &str) -> usize {
        match parser::parse_php(content) {
            Some(parsed) => {
                self.register_classes(&parsed.classes);
                parsed.classes.len()
            }
            None => 0,
        }
    }

    /// Find a class-like by fully-qualified name (leading `\` optional,
    /// case-insensitive as PHP class names are).
    pub fn find_class(&self, fqn: &str) -> Option<ClassInfo> {
        let key = cache_key(fqn);
        if let Some(cached) = self.classes.lock().get(&key) {
            return cached.clone();
        }

        // The lock is released here: loading reads and parses a file.
        let loaded = self.load_class_from_disk(fqn);
        let mut map = self.classes.lock();
        if loaded.is_none() {
            map.insert(key, None);
        }
        loaded
    }

    fn load_class_from_disk(&self, fqn: &str) -> Option<ClassInfo> {
        let root = self.root.as_deref()?;
        let key = cache_key(fqn);
        if let Some(file_path) = self.classmap.get(&key)
            && let Some(class) = self.load_class_from_file(&key, file_path)
        {
            return Some(class);
        }

        let file_path = composer::resolve_class_path(&self.psr4_mappings, root, fqn)?;
        self.load_class_from_file(&key, &file_path)
    }

    fn load_class_from_file(&self, key: &str, file_path: &Path) -> Option<ClassInfo> {
        let content = match std::fs::read_to_string(file_path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("cannot read {}: {}", file_path.display(), err);
                return None;
            }
        };

        tracing::debug!("loading {} from {}", key, file_path.display());
        let parsed = parser::parse_php(&content)?;
        self.register_classes(&parsed.classes);

        parsed
            .classes
            .into_iter()
            .find(|class| cache_key(&class.fqn) == key)
    }

    /// Walk the `extends` chain of `class`, nearest parent first, stopping
    /// at the first parent that cannot be loaded.
    pub(crate) fn parent_chain(&self, class: &ClassInfo) -> Vec<ClassInfo> {
        let mut chain = Vec::new();
        let mut current = class.parent_class.clone();
        let mut depth = 0;
        while let Some(parent_name) = current {
            depth += 1;
            if depth > MAX_INHERITANCE_DEPTH {
                break;
            }
            let Some(parent) = self.find_class(&parent_name) else {
                break;
            };
            current = parent.parent_class.clone();
            chain.push(parent);
        }
        chain
    }
}
