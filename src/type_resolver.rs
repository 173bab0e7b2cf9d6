/// Static type resolution for expressions at a call site.
///
/// The rule only ever needs one answer: what class, if any, an expression
/// evaluates to.  [`ScopeTypeResolver`] answers it from facts the rewrite
/// pass collects while walking a method body (see [`Scope`]) plus the
/// workspace's class cache.
///
/// # Hint mapping
///
///   - `object`, or a union / intersection naming a class → unknown object
///   - `?Foo` / `Foo|null` → as `Foo`
///   - `self`, `static`, `$this` → the enclosing class
///   - a class the workspace can load → that class
///   - anything else (scalars, `array`, `mixed`, unknown classes) → other
use crate::Workspace;
use crate::node::{Expr, ExprKind, PropertyName};
use crate::types::ClassInfo;
use crate::util::is_builtin_type;

/// What is statically known about an expression's type.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// An instance of a class-like the workspace can describe.
    NamedClass(ClassInfo),
    /// Some object whose class is not known (`object`, ambiguous unions).
    UnknownObject,
    /// Not an object, or nothing is known.
    Other,
}

/// Resolves the static type of an expression.
pub trait TypeResolver {
    fn resolve_type(&self, expr: &Expr) -> TypeDescriptor;
}

/// A variable's declared or inferred type, valid from `offset` on.
#[derive(Debug, Clone)]
struct VariableFact {
    name: String,
    /// Resolved type hint string (class names fully qualified).
    type_hint: String,
    offset: u32,
}

/// Type facts of one function-like body.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// The class whose method this scope belongs to.
    pub current_class: Option<ClassInfo>,
    /// Whether `$this` is bound (false in static methods).
    pub has_this: bool,
    facts: Vec<VariableFact>,
}

impl Scope {
    pub fn new(current_class: Option<ClassInfo>, has_this: bool) -> Self {
        Self {
            current_class,
            has_this,
            facts: Vec::new(),
        }
    }

    /// Record that `name` has type `type_hint` from `offset` onward.
    /// Later facts for the same variable shadow earlier ones.
    pub fn record(&mut self, name: impl Into<String>, type_hint: impl Into<String>, offset: u32) {
        self.facts.push(VariableFact {
            name: name.into(),
            type_hint: type_hint.into(),
            offset,
        });
    }

    /// The type hint of `name` in effect at `offset`.
    pub fn type_of(&self, name: &str, offset: u32) -> Option<&str> {
        self.facts
            .iter()
            .filter(|fact| fact.name == name && fact.offset <= offset)
            .max_by_key(|fact| fact.offset)
            .map(|fact| fact.type_hint.as_str())
    }
}

/// A [`TypeResolver`] for one call site.
pub struct ScopeTypeResolver<'a> {
    workspace: &'a Workspace,
    scope: &'a Scope,
    offset: u32,
}

impl<'a> ScopeTypeResolver<'a> {
    /// Resolve types as seen at byte `offset` inside `scope`.
    pub fn new(workspace: &'a Workspace, scope: &'a Scope, offset: u32) -> Self {
        Self {
            workspace,
            scope,
            offset,
        }
    }

    /// Map a resolved type hint string to a descriptor.
    pub fn descriptor_for_hint(&self, hint: &str) -> TypeDescriptor {
        let hint = hint.trim();
        let hint = hint.strip_prefix('?').unwrap_or(hint);

        if hint.contains(['|', '&']) {
            let parts: Vec<&str> = hint
                .split(['|', '&'])
                .map(|p| p.trim().trim_matches(|c| c == '(' || c == ')').trim())
                .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("null"))
                .collect();
            if parts.len() == 1 {
                return self.descriptor_for_hint(parts[0]);
            }
            let names_object = parts.iter().any(|p| {
                p.eq_ignore_ascii_case("object")
                    || p.eq_ignore_ascii_case("self")
                    || p.eq_ignore_ascii_case("static")
                    || !is_builtin_type(p)
            });
            return if names_object {
                TypeDescriptor::UnknownObject
            } else {
                TypeDescriptor::Other
            };
        }

        match hint.to_ascii_lowercase().as_str() {
            "object" => TypeDescriptor::UnknownObject,
            "self" | "static" | "$this" => self.current_class(),
            "parent" => match self.scope.current_class.as_ref() {
                Some(class) => self.class_descriptor(class.parent_class.as_deref()),
                None => TypeDescriptor::Other,
            },
            lower if is_builtin_type(lower) => TypeDescriptor::Other,
            _ => self.class_descriptor(Some(hint)),
        }
    }

    fn current_class(&self) -> TypeDescriptor {
        match self.scope.current_class {
            Some(ref class) => TypeDescriptor::NamedClass(class.clone()),
            None => TypeDescriptor::Other,
        }
    }

    fn class_descriptor(&self, fqn: Option<&str>) -> TypeDescriptor {
        match fqn.and_then(|name| self.workspace.find_class(name)) {
            Some(class) => TypeDescriptor::NamedClass(class),
            None => TypeDescriptor::Other,
        }
    }

    /// Type hint of property `name` on `class` or the nearest ancestor
    /// declaring it.
    fn property_hint(&self, class: &ClassInfo, name: &str) -> Option<String> {
        if let Some(prop) = class.find_property(name) {
            return prop.type_hint.clone();
        }
        self.workspace
            .parent_chain(class)
            .iter()
            .find_map(|parent| parent.find_property(name))
            .and_then(|prop| prop.type_hint.clone())
    }

    /// Resolve a hint declared on `owner`, where `self` / `static` mean
    /// `owner` rather than the enclosing class.
    fn descriptor_for_member_hint(&self, owner: &ClassInfo, hint: &str) -> TypeDescriptor {
        let bare = hint.trim().trim_start_matches('?');
        if bare.eq_ignore_ascii_case("self") || bare.eq_ignore_ascii_case("static") {
            return TypeDescriptor::NamedClass(owner.clone());
        }
        self.descriptor_for_hint(hint)
    }
}

impl TypeResolver for ScopeTypeResolver<'_> {
    fn resolve_type(&self, expr: &Expr) -> TypeDescriptor {
        match &expr.kind {
            ExprKind::Variable(name) if name == "$this" => {
                if self.scope.has_this {
                    self.current_class()
                } else {
                    TypeDescriptor::Other
                }
            }
            ExprKind::Variable(name) => match self.scope.type_of(name, self.offset) {
                Some(hint) => self.descriptor_for_hint(hint),
                None => TypeDescriptor::Other,
            },
            ExprKind::PropertyFetch(fetch) => {
                let PropertyName::Identifier(ref prop) = fetch.property else {
                    return TypeDescriptor::Other;
                };
                match self.resolve_type(&fetch.object) {
                    TypeDescriptor::NamedClass(owner) => match self.property_hint(&owner, prop) {
                        Some(hint) => self.descriptor_for_member_hint(&owner, &hint),
                        None => TypeDescriptor::Other,
                    },
                    _ => TypeDescriptor::Other,
                }
            }
            ExprKind::Isset(_)
            | ExprKind::ArrayDimFetch(_)
            | ExprKind::String(_)
            | ExprKind::Other => TypeDescriptor::Other,
        }
    }
}
