/// `assertTrue(isset(...))` / `assertFalse(isset(...))` → the specific
/// PHPUnit assertion for the checked access.
///
/// ```php
/// $this->assertTrue(isset($anything->foo));
/// $this->assertObjectHasAttribute('foo', $anything);
///
/// $this->assertFalse(isset($anything["foo"]), "message");
/// $this->assertArrayNotHasKey("foo", $anything, "message");
/// ```
///
/// Property checks are left alone when the object's class may define a
/// magic `__isset` (see [`ClassHierarchyAnalyzer::has_magic_isset`]).
use crate::node::{ArrayDimFetch, CallExpr, Expr, ExprKind, PropertyFetch, PropertyName};
use crate::reflection::ClassHierarchyAnalyzer;

use super::arguments::replace_first_argument;
use super::rename::rename_with_map;
use super::{CallRewriteRule, CodeSample, RewriteResult, RuleDefinition};

pub const ASSERT_TRUE: &str = "assertTrue";
pub const ASSERT_FALSE: &str = "assertFalse";

const PROPERTY_RENAMES: &[(&str, &str)] = &[
    (ASSERT_TRUE, "assertObjectHasAttribute"),
    (ASSERT_FALSE, "assertObjectNotHasAttribute"),
];

const ARRAY_RENAMES: &[(&str, &str)] = &[
    (ASSERT_TRUE, "assertArrayHasKey"),
    (ASSERT_FALSE, "assertArrayNotHasKey"),
];

pub struct AssertIssetToSpecificMethodRule<'a> {
    analyzer: ClassHierarchyAnalyzer<'a>,
}

impl<'a> AssertIssetToSpecificMethodRule<'a> {
    pub fn new(analyzer: ClassHierarchyAnalyzer<'a>) -> Self {
        Self { analyzer }
    }

    /// The rule's definition, available without building a rule.
    pub fn describe() -> RuleDefinition {
        RuleDefinition {
            name: "assert-isset-to-specific-method",
            description:
                "Turns isset comparisons to their method name alternatives in PHPUnit TestCase"
                    .to_string(),
            samples: vec![
                CodeSample {
                    before: "$this->assertTrue(isset($anything->foo));".to_string(),
                    after: "$this->assertObjectHasAttribute(\"foo\", $anything);".to_string(),
                },
                CodeSample {
                    before: "$this->assertFalse(isset($anything[\"foo\"]), \"message\");"
                        .to_string(),
                    after: "$this->assertArrayNotHasKey(\"foo\", $anything, \"message\");"
                        .to_string(),
                },
            ],
        }
    }

    fn rewrite_property_fetch(&self, mut call: CallExpr, fetch: PropertyFetch) -> RewriteResult {
        let PropertyName::Identifier(name) = fetch.property else {
            return RewriteResult::Unchanged(call);
        };

        rename_with_map(&mut call, PROPERTY_RENAMES);
        let arguments = std::mem::take(&mut call.arguments);
        call.arguments = replace_first_argument(arguments, vec![Expr::string(name), *fetch.object]);
        RewriteResult::Rewritten(call)
    }

    fn rewrite_array_dim_fetch(&self, mut call: CallExpr, fetch: ArrayDimFetch) -> RewriteResult {
        rename_with_map(&mut call, ARRAY_RENAMES);
        let arguments = std::mem::take(&mut call.arguments);
        call.arguments = replace_first_argument(arguments, vec![*fetch.index, *fetch.array]);
        RewriteResult::Rewritten(call)
    }
}

/// The single access `call` checks with `isset()`, if it has that shape.
fn isset_target(call: &CallExpr) -> Option<&Expr> {
    let first = call.arguments.first()?;
    if first.unpack {
        return None;
    }
    let ExprKind::Isset(ref values) = first.value.kind else {
        return None;
    };
    match values.as_slice() {
        [single] => Some(single),
        _ => None,
    }
}

impl CallRewriteRule for AssertIssetToSpecificMethodRule<'_> {
    fn definition(&self) -> RuleDefinition {
        Self::describe()
    }

    fn attempt_rewrite(&self, call: CallExpr) -> RewriteResult {
        if !(call.is_name(ASSERT_TRUE) || call.is_name(ASSERT_FALSE)) {
            return RewriteResult::Unchanged(call);
        }
        if call.is_first_class_callable {
            return RewriteResult::Unchanged(call);
        }

        let target = match isset_target(&call) {
            Some(target) => target.kind.clone(),
            None => return RewriteResult::Unchanged(call),
        };

        match target {
            ExprKind::PropertyFetch(fetch) => {
                if self.analyzer.has_magic_isset(&fetch.object) {
                    tracing::debug!(
                        "skipping {}: {} may define __isset",
                        call.name,
                        crate::printer::print_expr(&fetch.object)
                    );
                    return RewriteResult::Unchanged(call);
                }
                self.rewrite_property_fetch(call, fetch)
            }
            ExprKind::ArrayDimFetch(fetch) => self.rewrite_array_dim_fetch(call, fetch),
            ExprKind::Isset(_) | ExprKind::Variable(_) | ExprKind::String(_) | ExprKind::Other => {
                RewriteResult::Unchanged(call)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Argument, CallKind};
    use crate::printer::print_call;
    use crate::reflection::ClassReflection;
    use crate::type_resolver::{TypeDescriptor, TypeResolver};
    use crate::types::{ClassInfo, ClassLikeKind, MethodInfo};

    /// Every variable resolves to the same descriptor.
    struct FixedType(TypeDescriptor);

    impl TypeResolver for FixedType {
        fn resolve_type(&self, _expr: &Expr) -> TypeDescriptor {
            self.0.clone()
        }
    }

    struct NoParents;

    impl ClassReflection for NoParents {
        fn declares_method(&self, class: &ClassInfo, method: &str) -> bool {
            class.declares_method(method)
        }

        fn is_concrete_class(&self, class: &ClassInfo) -> bool {
            class.kind == ClassLikeKind::Class
        }

        fn resolve_parent_class(&self, _class: &ClassInfo) -> Option<ClassInfo> {
            None
        }
    }

    fn class_with_methods(methods: &[&str]) -> ClassInfo {
        ClassInfo {
            kind: ClassLikeKind::Class,
            name: "Subject".to_string(),
            fqn: "App\\Subject".to_string(),
            methods: methods
                .iter()
                .map(|m| MethodInfo {
                    name: m.to_string(),
                    parameters: Vec::new(),
                    is_static: false,
                })
                .collect(),
            properties: Vec::new(),
            parent_class: None,
            used_traits: Vec::new(),
            start_offset: 0,
            end_offset: 0,
        }
    }

    fn run(ty: TypeDescriptor, call: CallExpr) -> RewriteResult {
        let types = FixedType(ty);
        let classes = NoParents;
        let rule = AssertIssetToSpecificMethodRule::new(ClassHierarchyAnalyzer::new(&types, &classes));
        rule.attempt_rewrite(call)
    }

    fn source_arg(text: &str, value: Expr) -> Argument {
        Argument {
            name: None,
            unpack: false,
            value,
            source: Some(text.to_string()),
        }
    }

    fn isset_arg(target: Expr) -> Argument {
        Argument::positional(Expr::isset(vec![target]))
    }

    fn property(object: &str, name: &str) -> Expr {
        Expr::property_fetch(
            Expr::with_source(ExprKind::Variable(object.to_string()), object),
            PropertyName::Identifier(name.to_string()),
        )
    }

    fn dim(array: Expr, index: &str) -> Expr {
        Expr::array_dim_fetch(
            array,
            Expr::with_source(
                ExprKind::String(index.trim_matches('"').to_string()),
                index,
            ),
        )
    }

    fn var(name: &str) -> Expr {
        Expr::with_source(ExprKind::Variable(name.to_string()), name)
    }

    fn printed(result: RewriteResult) -> Option<String> {
        result.rewritten().map(|call| print_call(&call))
    }

    // ─── Property path ──────────────────────────────────────────────────

    #[test]
    fn test_property_isset_becomes_object_has_attribute() {
        let call = CallExpr::new(CallKind::Method, "assertTrue", vec![isset_arg(property("$obj", "foo"))]);
        assert_eq!(
            printed(run(TypeDescriptor::Other, call)),
            Some("assertObjectHasAttribute('foo', $obj)".to_string())
        );
    }

    #[test]
    fn test_property_path_keeps_trailing_arguments() {
        let call = CallExpr::new(
            CallKind::StaticMethod,
            "assertFalse",
            vec![
                isset_arg(property("$obj", "foo")),
                source_arg("\"msg\"", Expr::string("msg")),
            ],
        );
        assert_eq!(
            printed(run(TypeDescriptor::Other, call)),
            Some("assertObjectNotHasAttribute('foo', $obj, \"msg\")".to_string())
        );
    }

    #[test]
    fn test_dynamic_property_name_is_unchanged() {
        let target = Expr::property_fetch(var("$obj"), PropertyName::Dynamic);
        let call = CallExpr::new(CallKind::Method, "assertTrue", vec![isset_arg(target)]);
        assert_eq!(
            run(TypeDescriptor::Other, call.clone()),
            RewriteResult::Unchanged(call)
        );
    }

    #[test]
    fn test_magic_isset_aborts_for_both_directions() {
        for name in [ASSERT_TRUE, ASSERT_FALSE] {
            let call = CallExpr::new(CallKind::Method, name, vec![isset_arg(property("$obj", "foo"))]);
            let magic = TypeDescriptor::NamedClass(class_with_methods(&["__isset"]));
            assert_eq!(run(magic, call.clone()), RewriteResult::Unchanged(call));
        }
    }

    #[test]
    fn test_unknown_object_aborts() {
        let call = CallExpr::new(CallKind::Method, "assertTrue", vec![isset_arg(property("$obj", "foo"))]);
        assert!(!run(TypeDescriptor::UnknownObject, call).is_rewritten());
    }

    #[test]
    fn test_class_without_magic_is_rewritten() {
        let call = CallExpr::new(CallKind::Method, "assertTrue", vec![isset_arg(property("$obj", "foo"))]);
        let plain = TypeDescriptor::NamedClass(class_with_methods(&["getFoo"]));
        assert!(run(plain, call).is_rewritten());
    }

    // ─── Array path ─────────────────────────────────────────────────────

    #[test]
    fn test_array_isset_becomes_array_not_has_key_with_message() {
        let call = CallExpr::new(
            CallKind::Method,
            "assertFalse",
            vec![
                isset_arg(dim(var("$arr"), "\"foo\"")),
                source_arg("\"msg\"", Expr::string("msg")),
            ],
        );
        assert_eq!(
            printed(run(TypeDescriptor::Other, call)),
            Some("assertArrayNotHasKey(\"foo\", $arr, \"msg\")".to_string())
        );
    }

    #[test]
    fn test_nested_array_access_keeps_inner_access() {
        let inner = Expr::with_source(dim(var("$a"), "\"x\"").kind, "$a[\"x\"]");
        let call = CallExpr::new(CallKind::Method, "assertTrue", vec![isset_arg(dim(inner, "\"y\""))]);
        assert_eq!(
            printed(run(TypeDescriptor::Other, call)),
            Some("assertArrayHasKey(\"y\", $a[\"x\"])".to_string())
        );
    }

    #[test]
    fn test_array_path_ignores_magic_isset() {
        let call = CallExpr::new(CallKind::Method, "assertTrue", vec![isset_arg(dim(var("$arr"), "\"k\""))]);
        let magic = TypeDescriptor::NamedClass(class_with_methods(&["__isset"]));
        assert!(run(magic, call).is_rewritten());
    }

    // ─── Rejected shapes ────────────────────────────────────────────────

    #[test]
    fn test_other_assertions_are_unchanged() {
        let call = CallExpr::new(CallKind::Method, "assertSame", vec![isset_arg(dim(var("$arr"), "\"k\""))]);
        assert_eq!(
            run(TypeDescriptor::Other, call.clone()),
            RewriteResult::Unchanged(call)
        );
    }

    #[test]
    fn test_argument_without_isset_is_unchanged() {
        let call = CallExpr::new(CallKind::Method, "assertTrue", vec![Argument::positional(var("$x"))]);
        assert_eq!(
            run(TypeDescriptor::Other, call.clone()),
            RewriteResult::Unchanged(call)
        );
    }

    #[test]
    fn test_empty_argument_list_is_unchanged() {
        let call = CallExpr::new(CallKind::Method, "assertTrue", vec![]);
        assert!(!run(TypeDescriptor::Other, call).is_rewritten());
    }

    #[test]
    fn test_first_class_callable_is_unchanged() {
        let mut call = CallExpr::new(CallKind::Method, "assertTrue", vec![isset_arg(dim(var("$arr"), "\"k\""))]);
        call.is_first_class_callable = true;
        assert_eq!(
            run(TypeDescriptor::Other, call.clone()),
            RewriteResult::Unchanged(call)
        );
    }

    #[test]
    fn test_multi_target_isset_is_unchanged() {
        let both = Argument::positional(Expr::isset(vec![
            dim(var("$a"), "\"x\""),
            dim(var("$b"), "\"y\""),
        ]));
        let call = CallExpr::new(CallKind::Method, "assertTrue", vec![both]);
        assert!(!run(TypeDescriptor::Other, call).is_rewritten());
    }

    #[test]
    fn test_isset_of_plain_variable_is_unchanged() {
        let call = CallExpr::new(CallKind::Method, "assertTrue", vec![isset_arg(var("$x"))]);
        assert!(!run(TypeDescriptor::Other, call).is_rewritten());
    }

    // ─── Properties ─────────────────────────────────────────────────────

    #[test]
    fn test_rewriting_is_idempotent() {
        let call = CallExpr::new(
            CallKind::Method,
            "assertTrue",
            vec![isset_arg(property("$obj", "foo")), source_arg("'m'", Expr::string("m"))],
        );
        let once = run(TypeDescriptor::Other, call).into_call();
        assert_eq!(
            run(TypeDescriptor::Other, once.clone()),
            RewriteResult::Unchanged(once)
        );
    }

    #[test]
    fn test_name_match_ignores_case() {
        let call = CallExpr::new(CallKind::Method, "ASSERTTRUE", vec![isset_arg(dim(var("$arr"), "\"k\""))]);
        assert_eq!(
            printed(run(TypeDescriptor::Other, call)),
            Some("assertArrayHasKey(\"k\", $arr)".to_string())
        );
    }

    #[test]
    fn test_definition_samples() {
        let definition = AssertIssetToSpecificMethodRule::describe();
        assert_eq!(definition.samples.len(), 2);
        assert!(definition.description.contains("PHPUnit TestCase"));
    }
}
