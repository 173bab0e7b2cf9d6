/// Small helpers shared across the crate.

/// Return the last segment of a namespace-qualified name
/// (`"App\\Models\\User"` → `"User"`).
pub fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// Check if a name is a PHP built-in type or relative class keyword
/// rather than a class name.
pub fn is_builtin_type(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "self"
            | "static"
            | "parent"
            | "string"
            | "int"
            | "float"
            | "bool"
            | "array"
            | "object"
            | "mixed"
            | "void"
            | "never"
            | "null"
            | "true"
            | "false"
            | "callable"
            | "iterable"
    )
}

/// 1-based line number of a byte offset.
pub fn offset_to_line(content: &str, offset: u32) -> usize {
    let end = (offset as usize).min(content.len());
    memchr::memchr_iter(b'\n', &content.as_bytes()[..end]).count() + 1
}
