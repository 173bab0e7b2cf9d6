//! Data types used throughout PHPantom Refactor.
//!
//! This module contains the owned "model" structs extracted from parsed PHP
//! (classes, methods, properties) that the workspace caches and the
//! class-reflection queries run against.  Nothing here borrows from the
//! parser's arena, so values can outlive the parse that produced them.

/// The syntactic kind of a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassLikeKind {
    /// A regular `class`, possibly abstract or final.
    Class,
    /// An `interface`.
    Interface,
    /// A `trait`.
    Trait,
    /// An `enum` (unit or backed).
    Enum,
}

/// Stores extracted parameter information from a parsed PHP function-like.
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    /// The parameter name including the `$` prefix (e.g. "$user").
    pub name: String,
    /// Optional type hint string (e.g. "string", "?Foo", "A|B").
    pub type_hint: Option<String>,
}

/// Stores extracted method information from a parsed PHP class-like.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// The method name as declared (e.g. "__isset", "testLogin").
    pub name: String,
    /// The parameters of the method.
    pub parameters: Vec<ParameterInfo>,
    /// Whether the method is static.
    pub is_static: bool,
}

/// Stores extracted property information from a parsed PHP class-like.
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    /// The property name WITHOUT the `$` prefix, matching access syntax
    /// (`$this->name`).
    pub name: String,
    /// Optional type hint string, already resolved to a fully-qualified
    /// name when it refers to a class.
    pub type_hint: Option<String>,
    /// Whether the property is static.
    pub is_static: bool,
}

/// Stores extracted class-like information from a parsed PHP file.
/// All data is owned so we don't depend on the parser's arena lifetime.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    /// Whether this is a class, interface, trait, or enum.
    pub kind: ClassLikeKind,
    /// The short name of the class (e.g. "User").
    pub name: String,
    /// The fully-qualified name without a leading `\` (e.g. "App\\User").
    pub fqn: String,
    /// The methods declared directly in this class-like.
    pub methods: Vec<MethodInfo>,
    /// The properties declared directly in this class-like, including
    /// promoted constructor parameters.
    pub properties: Vec<PropertyInfo>,
    /// Fully-qualified parent class from the `extends` clause, if any.
    pub parent_class: Option<String>,
    /// Fully-qualified names of traits pulled in with `use`.
    pub used_traits: Vec<String>,
    /// Byte offset where the class body starts (left brace).
    pub start_offset: u32,
    /// Byte offset where the class body ends (right brace).
    pub end_offset: u32,
}

impl ClassInfo {
    /// Whether this class-like declares `method` itself.
    ///
    /// PHP method names are case-insensitive, so `__ISSET` matches
    /// `__isset`.
    pub fn declares_method(&self, method: &str) -> bool {
        self.methods
            .iter()
            .any(|m| m.name.eq_ignore_ascii_case(method))
    }

    /// Look up a declared, non-static property by name.
    pub fn find_property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties
            .iter()
            .find(|p| !p.is_static && p.name == name)
    }
}
