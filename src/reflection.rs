/// Class reflection queries and the magic-`__isset` safety check.
///
/// `isset($obj->prop)` on an object whose class defines `__isset()` runs
/// user code instead of checking for a declared property, so rewriting it
/// to `assertObjectHasAttribute` could change what the test asserts.
/// [`ClassHierarchyAnalyzer::has_magic_isset`] decides, conservatively,
/// whether that risk exists for a given expression.
use crate::Workspace;
use crate::node::Expr;
use crate::resolution::MAX_INHERITANCE_DEPTH;
use crate::type_resolver::{TypeDescriptor, TypeResolver};
use crate::types::{ClassInfo, ClassLikeKind};

/// The magic method PHP calls for `isset()` on inaccessible properties.
pub const MAGIC_ISSET: &str = "__isset";

/// Questions the safety check asks about a class.
pub trait ClassReflection {
    /// Whether `class` declares `method` (case-insensitive).
    fn declares_method(&self, class: &ClassInfo, method: &str) -> bool;
    /// Whether `class` is a genuine class rather than an interface, trait,
    /// or enum.
    fn is_concrete_class(&self, class: &ClassInfo) -> bool;
    /// The parent class of `class`, if it has one that can be loaded.
    fn resolve_parent_class(&self, class: &ClassInfo) -> Option<ClassInfo>;
}

impl ClassReflection for Workspace {
    /// Own methods count, and so do methods of used traits that can be
    /// loaded (including traits used by those traits).
    fn declares_method(&self, class: &ClassInfo, method: &str) -> bool {
        if class.declares_method(method) {
            return true;
        }

        let mut pending: Vec<String> = class.used_traits.clone();
        let mut visited = 0;
        while let Some(trait_name) = pending.pop() {
            visited += 1;
            if visited > MAX_INHERITANCE_DEPTH {
                break;
            }
            if let Some(trait_info) = self.find_class(&trait_name) {
                if trait_info.declares_method(method) {
                    return true;
                }
                pending.extend(trait_info.used_traits.iter().cloned());
            }
        }
        false
    }

    fn is_concrete_class(&self, class: &ClassInfo) -> bool {
        class.kind == ClassLikeKind::Class
    }

    fn resolve_parent_class(&self, class: &ClassInfo) -> Option<ClassInfo> {
        class
            .parent_class
            .as_deref()
            .and_then(|parent| self.find_class(parent))
    }
}

/// Combines type resolution and class reflection to answer the safety
/// question for the property-rewrite path.
#[derive(Clone, Copy)]
pub struct ClassHierarchyAnalyzer<'a> {
    types: &'a dyn TypeResolver,
    classes: &'a dyn ClassReflection,
}

impl<'a> ClassHierarchyAnalyzer<'a> {
    pub fn new(types: &'a dyn TypeResolver, classes: &'a dyn ClassReflection) -> Self {
        Self { types, classes }
    }

    /// Whether `isset()` on a property of `expr` may run a magic
    /// `__isset` method.
    ///
    /// Ambiguity answers `true`:
    ///   1. an object of unknown class → `true`
    ///   2. not a class instance at all → `false`
    ///   3. the class declares `__isset` → `true`
    ///   4. an interface, trait, or enum → `false`
    ///   5. a loadable parent class exists → `true`, without looking at
    ///      the parent's methods; a declared parent that cannot be loaded
    ///      is ambiguous and answers `true` as well
    ///   6. otherwise → `false`
    pub fn has_magic_isset(&self, expr: &Expr) -> bool {
        let class = match self.types.resolve_type(expr) {
            TypeDescriptor::UnknownObject => return true,
            TypeDescriptor::Other => return false,
            TypeDescriptor::NamedClass(class) => class,
        };

        if self.classes.declares_method(&class, MAGIC_ISSET) {
            tracing::debug!("{} declares {}", class.fqn, MAGIC_ISSET);
            return true;
        }

        if !self.classes.is_concrete_class(&class) {
            return false;
        }

        if self.classes.resolve_parent_class(&class).is_some() {
            return true;
        }
        if let Some(parent) = &class.parent_class {
            tracing::debug!("{} extends unloadable {}", class.fqn, parent);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MethodInfo;

    struct FixedType(TypeDescriptor);

    impl TypeResolver for FixedType {
        fn resolve_type(&self, _expr: &Expr) -> TypeDescriptor {
            self.0.clone()
        }
    }

    /// Reflection over a fixed set of classes, keyed by FQN.
    struct FakeClasses(Vec<ClassInfo>);

    impl ClassReflection for FakeClasses {
        fn declares_method(&self, class: &ClassInfo, method: &str) -> bool {
            class.declares_method(method)
        }

        fn is_concrete_class(&self, class: &ClassInfo) -> bool {
            class.kind == ClassLikeKind::Class
        }

        fn resolve_parent_class(&self, class: &ClassInfo) -> Option<ClassInfo> {
            let parent = class.parent_class.as_deref()?;
            self.0.iter().find(|c| c.fqn == parent).cloned()
        }
    }

    fn class(kind: ClassLikeKind, fqn: &str, methods: &[&str], parent: Option<&str>) -> ClassInfo {
        ClassInfo {
            kind,
            name: crate::util::short_name(fqn).to_string(),
            fqn: fqn.to_string(),
            methods: methods
                .iter()
                .map(|m| MethodInfo {
                    name: m.to_string(),
                    parameters: Vec::new(),
                    is_static: false,
                })
                .collect(),
            properties: Vec::new(),
            parent_class: parent.map(str::to_string),
            used_traits: Vec::new(),
            start_offset: 0,
            end_offset: 0,
        }
    }

    fn check(ty: TypeDescriptor, known: Vec<ClassInfo>) -> bool {
        let types = FixedType(ty);
        let classes = FakeClasses(known);
        ClassHierarchyAnalyzer::new(&types, &classes).has_magic_isset(&Expr::variable("$x"))
    }

    // ─── Policy steps ───────────────────────────────────────────────────

    #[test]
    fn test_unknown_object_is_unsafe() {
        assert!(check(TypeDescriptor::UnknownObject, vec![]));
    }

    #[test]
    fn test_non_object_is_safe() {
        assert!(!check(TypeDescriptor::Other, vec![]));
    }

    #[test]
    fn test_declared_isset_is_unsafe_in_any_case() {
        let magic = class(ClassLikeKind::Class, "App\\Magic", &["__ISSET"], None);
        assert!(check(TypeDescriptor::NamedClass(magic), vec![]));
    }

    #[test]
    fn test_interface_without_isset_is_safe() {
        let contract = class(ClassLikeKind::Interface, "App\\Contract", &["run"], None);
        assert!(!check(TypeDescriptor::NamedClass(contract), vec![]));
    }

    #[test]
    fn test_interface_declaring_isset_is_unsafe() {
        let contract = class(ClassLikeKind::Interface, "App\\Contract", &["__isset"], None);
        assert!(check(TypeDescriptor::NamedClass(contract), vec![]));
    }

    #[test]
    fn test_any_loadable_parent_is_unsafe() {
        let base = class(ClassLikeKind::Class, "App\\Base", &[], None);
        let child = class(ClassLikeKind::Class, "App\\Child", &[], Some("App\\Base"));
        assert!(check(TypeDescriptor::NamedClass(child), vec![base]));
    }

    #[test]
    fn test_unloadable_parent_is_unsafe() {
        let child = class(ClassLikeKind::Class, "App\\Child", &[], Some("Vendor\\Gone"));
        assert!(check(TypeDescriptor::NamedClass(child), vec![]));
    }

    #[test]
    fn test_plain_class_is_safe() {
        let plain = class(ClassLikeKind::Class, "App\\Plain", &["getName"], None);
        assert!(!check(TypeDescriptor::NamedClass(plain), vec![]));
    }

    // ─── Workspace reflection ───────────────────────────────────────────

    #[test]
    fn test_workspace_sees_isset_from_used_trait() {
        let workspace = Workspace::new();
        workspace.register_source(
            "<?php\nnamespace App;\ntrait MagicAccess { public function __isset($n) { return true; } }\nclass Model { use MagicAccess; }\n",
        );
        let model = workspace.find_class("App\\Model").expect("Model registered");
        assert!(ClassReflection::declares_method(&workspace, &model, MAGIC_ISSET));
        assert!(workspace.is_concrete_class(&model));
    }

    #[test]
    fn test_workspace_resolves_parent() {
        let workspace = Workspace::new();
        workspace.register_source(
            "<?php\nclass Base {}\nclass Child extends Base {}\ninterface Shape {}\n",
        );
        let child = workspace.find_class("Child").expect("Child registered");
        let parent = workspace.resolve_parent_class(&child).expect("parent loads");
        assert_eq!(parent.fqn, "Base");

        let shape = workspace.find_class("shape").expect("lookup ignores case");
        assert!(!workspace.is_concrete_class(&shape));
    }
}
