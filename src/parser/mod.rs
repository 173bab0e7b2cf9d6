/// PHP parsing and AST extraction.
///
/// This module wraps the mago_syntax parser and turns the arena-allocated
/// AST into owned data: class-like declarations for the workspace cache,
/// the file's `use` imports and namespace for name resolution, and (via
/// [`calls`]) the owned call nodes that rewrite rules consume.
///
/// Sub-modules:
/// - [`calls`]: Lowering of method / static calls into [`crate::node`]
/// - [`classes`]: Class, interface, trait, and enum extraction
/// - [`use_statements`]: `use` statement and namespace extraction
pub mod calls;
mod classes;
mod use_statements;

use std::collections::HashMap;
use std::panic;

use bumpalo::Bump;
use mago_syntax::ast::*;
use mago_syntax::parser::parse_file_content;

use crate::types::{ClassInfo, ParameterInfo};
use crate::util::is_builtin_type;

pub(crate) use classes::extract_classes_from_statements;

/// Name-resolution context of one PHP file: its namespace and imports.
#[derive(Debug, Clone, Default)]
pub struct FileContext {
    /// The first namespace declared in the file, if any.
    pub namespace: Option<String>,
    /// Maps imported short names (or aliases) to fully-qualified names.
    pub use_map: HashMap<String, String>,
}

impl FileContext {
    /// Collect the namespace and `use` imports of a parsed program.
    pub fn from_program(program: &Program<'_>) -> Self {
        let mut use_map = HashMap::new();
        use_statements::extract_use_statements_from_statements(
            program.statements.iter(),
            &mut use_map,
        );
        let namespace =
            use_statements::extract_namespace_from_statements(program.statements.iter());
        Self { namespace, use_map }
    }

    /// The context inside one `namespace` declaration: its own name and
    /// only the imports declared within it.
    pub fn for_namespace(namespace: &Namespace<'_>) -> Self {
        let mut use_map = HashMap::new();
        use_statements::extract_use_statements_from_statements(
            namespace.statements().iter(),
            &mut use_map,
        );
        Self {
            namespace: namespace
                .name
                .as_ref()
                .map(|ident| ident.value().to_string())
                .filter(|name| !name.is_empty()),
            use_map,
        }
    }

    /// Resolve a class name as written in source to its fully-qualified
    /// form, without a leading `\`.
    ///
    /// Rules (matching PHP name resolution):
    ///   1. Fully-qualified (`\Foo\Bar`) → strip the leading `\`
    ///   2. Qualified (`Foo\Bar`) → expand the first segment through the
    ///      imports, otherwise prepend the current namespace
    ///   3. Unqualified (`Bar`) → imports, otherwise prepend the namespace
    ///   4. No namespace and no import → keep as-is
    pub fn resolve_name(&self, name: &str) -> String {
        if let Some(stripped) = name.strip_prefix('\\') {
            return stripped.to_string();
        }

        if let Some(pos) = name.find('\\') {
            let first = &name[..pos];
            let rest = &name[pos..];
            if let Some(fqn) = self.use_map.get(first) {
                return format!("{}{}", fqn, rest);
            }
        } else if let Some(fqn) = self.use_map.get(name) {
            return fqn.clone();
        }

        match self.namespace {
            Some(ref ns) => format!("{}\\{}", ns, name),
            None => name.to_string(),
        }
    }

    /// Resolve every class name inside a type hint string, keeping the
    /// hint's shape (`?Foo`, `Foo|Bar`, `(A&B)|null`).
    ///
    /// Builtin types and `self` / `static` / `parent` are left untouched.
    pub fn resolve_type_hint(&self, hint: &str) -> String {
        let mut out = String::with_capacity(hint.len());
        let mut atom = String::new();
        for ch in hint.chars() {
            if matches!(ch, '?' | '|' | '&' | '(' | ')' | ' ') {
                self.flush_hint_atom(&mut atom, &mut out);
                out.push(ch);
            } else {
                atom.push(ch);
            }
        }
        self.flush_hint_atom(&mut atom, &mut out);
        out
    }

    fn flush_hint_atom(&self, atom: &mut String, out: &mut String) {
        if atom.is_empty() {
            return;
        }
        if is_builtin_type(atom) {
            out.push_str(atom);
        } else {
            out.push_str(&self.resolve_name(atom));
        }
        atom.clear();
    }
}

/// Everything extracted from one PHP file that outlives its parse.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub classes: Vec<ClassInfo>,
    pub context: FileContext,
}

/// Parse PHP source text and extract its class-likes and name context.
///
/// The mago parser can panic on some malformed input (e.g. half-written
/// heredocs).  The panic is caught and `None` is returned so one bad file
/// cannot take the whole run down.
pub fn parse_php(content: &str) -> Option<ParsedFile> {
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        let arena = Bump::new();
        let file_id = mago_database::file::FileId::new("input.php");
        let program = parse_file_content(&arena, file_id, content);
        extract_file(program)
    }));

    match result {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::error!("parser panicked while extracting classes, skipping file");
            None
        }
    }
}

/// Extract the owned [`ParsedFile`] from an already-parsed program.
pub fn extract_file(program: &Program<'_>) -> ParsedFile {
    let context = FileContext::from_program(program);
    let mut classes = Vec::new();
    extract_classes_from_statements(program.statements.iter(), &context, &mut classes);
    ParsedFile { classes, context }
}

/// Extract a string representation of a type hint from the AST.
pub(crate) fn extract_hint_string(hint: &Hint) -> String {
    match hint {
        Hint::Identifier(ident) => ident.value().to_string(),
        Hint::Nullable(nullable) => {
            format!("?{}", extract_hint_string(nullable.hint))
        }
        Hint::Union(union) => {
            let left = extract_hint_string(union.left);
            let right = extract_hint_string(union.right);
            format!("{}|{}", left, right)
        }
        Hint::Intersection(intersection) => {
            let left = extract_hint_string(intersection.left);
            let right = extract_hint_string(intersection.right);
            format!("{}&{}", left, right)
        }
        Hint::Void(ident)
        | Hint::Never(ident)
        | Hint::Float(ident)
        | Hint::Bool(ident)
        | Hint::Integer(ident)
        | Hint::String(ident)
        | Hint::Object(ident)
        | Hint::Mixed(ident)
        | Hint::Iterable(ident) => ident.value.to_string(),
        Hint::Null(keyword)
        | Hint::True(keyword)
        | Hint::False(keyword)
        | Hint::Array(keyword)
        | Hint::Callable(keyword)
        | Hint::Static(keyword)
        | Hint::Self_(keyword)
        | Hint::Parent(keyword) => keyword.value.to_string(),
        Hint::Parenthesized(paren) => {
            format!("({})", extract_hint_string(paren.hint))
        }
    }
}

/// Extract parameter names and resolved type hints from a parameter list.
pub(crate) fn extract_parameters(
    parameter_list: &FunctionLikeParameterList,
    context: &FileContext,
) -> Vec<ParameterInfo> {
    parameter_list
        .parameters
        .iter()
        .map(|param| ParameterInfo {
            name: param.variable.name.to_string(),
            type_hint: param
                .hint
                .as_ref()
                .map(|h| context.resolve_type_hint(&extract_hint_string(h))),
        })
        .collect()
}
