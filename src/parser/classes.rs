/// Class, interface, trait, and enum extraction.
///
/// Each class-like declaration is tagged with a [`ClassLikeKind`] so that
/// class-reflection queries can tell genuine classes from interfaces,
/// traits, and enums.  Names that refer to other classes (parent class,
/// used traits, property and parameter type hints) are resolved to
/// fully-qualified form here, while the file's imports are still at hand.
use mago_syntax::ast::*;

use crate::types::*;

use super::{FileContext, extract_hint_string, extract_parameters};

/// Members of a class-like body: methods, properties, used traits.
type ExtractedMembers = (Vec<MethodInfo>, Vec<PropertyInfo>, Vec<String>);

/// Recursively walk statements and extract class-like information.
/// Classes nested inside namespace declarations take that namespace.
pub(crate) fn extract_classes_from_statements<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    context: &FileContext,
    classes: &mut Vec<ClassInfo>,
) {
    for statement in statements {
        match statement {
            Statement::Class(class) => {
                let parent_class = class
                    .extends
                    .as_ref()
                    .and_then(|ext| ext.types.first().map(|ident| ident.value().to_string()))
                    .map(|name| context.resolve_name(&name));

                let (methods, properties, used_traits) =
                    extract_class_like_members(class.members.iter(), context);

                classes.push(new_class_info(
                    ClassLikeKind::Class,
                    class.name.value,
                    context,
                    (methods, properties, used_traits),
                    parent_class,
                    (class.left_brace.start.offset, class.right_brace.end.offset),
                ));
            }
            Statement::Interface(iface) => {
                // Interfaces may extend several parents; only the first
                // matters for single-inheritance lookups.
                let parent_class = iface
                    .extends
                    .as_ref()
                    .and_then(|ext| ext.types.first().map(|ident| ident.value().to_string()))
                    .map(|name| context.resolve_name(&name));

                let members = extract_class_like_members(iface.members.iter(), context);
                classes.push(new_class_info(
                    ClassLikeKind::Interface,
                    iface.name.value,
                    context,
                    members,
                    parent_class,
                    (iface.left_brace.start.offset, iface.right_brace.end.offset),
                ));
            }
            Statement::Trait(trait_def) => {
                let members = extract_class_like_members(trait_def.members.iter(), context);
                classes.push(new_class_info(
                    ClassLikeKind::Trait,
                    trait_def.name.value,
                    context,
                    members,
                    None,
                    (
                        trait_def.left_brace.start.offset,
                        trait_def.right_brace.end.offset,
                    ),
                ));
            }
            Statement::Enum(enum_def) => {
                let members = extract_class_like_members(enum_def.members.iter(), context);
                classes.push(new_class_info(
                    ClassLikeKind::Enum,
                    enum_def.name.value,
                    context,
                    members,
                    None,
                    (
                        enum_def.left_brace.start.offset,
                        enum_def.right_brace.end.offset,
                    ),
                ));
            }
            Statement::Namespace(namespace) => {
                let ns_context = FileContext::for_namespace(namespace);
                extract_classes_from_statements(
                    namespace.statements().iter(),
                    &ns_context,
                    classes,
                );
            }
            _ => {}
        }
    }
}

fn new_class_info(
    kind: ClassLikeKind,
    name: &str,
    context: &FileContext,
    (methods, properties, used_traits): ExtractedMembers,
    parent_class: Option<String>,
    (start_offset, end_offset): (u32, u32),
) -> ClassInfo {
    let fqn = match context.namespace {
        Some(ref ns) => format!("{}\\{}", ns, name),
        None => name.to_string(),
    };
    ClassInfo {
        kind,
        name: name.to_string(),
        fqn,
        methods,
        properties,
        parent_class,
        used_traits,
        start_offset,
        end_offset,
    }
}

/// Extract methods, properties, and used trait names from class-like
/// members.  Shared by all four class-like kinds since they use the same
/// `ClassLikeMember` representation.
fn extract_class_like_members<'a>(
    members: impl Iterator<Item = &'a ClassLikeMember<'a>>,
    context: &FileContext,
) -> ExtractedMembers {
    let mut methods = Vec::new();
    let mut properties = Vec::new();
    let mut used_traits = Vec::new();

    for member in members {
        match member {
            ClassLikeMember::Method(method) => {
                let name = method.name.value.to_string();

                // Promoted constructor parameters are properties too.
                if name.eq_ignore_ascii_case("__construct") {
                    for param in method.parameter_list.parameters.iter() {
                        if param.is_promoted_property() {
                            let raw_name = param.variable.name.to_string();
                            properties.push(PropertyInfo {
                                name: raw_name.strip_prefix('$').unwrap_or(&raw_name).to_string(),
                                type_hint: param
                                    .hint
                                    .as_ref()
                                    .map(|h| context.resolve_type_hint(&extract_hint_string(h))),
                                is_static: false,
                            });
                        }
                    }
                }

                methods.push(MethodInfo {
                    name,
                    parameters: extract_parameters(&method.parameter_list, context),
                    is_static: method.modifiers.iter().any(|m| m.is_static()),
                });
            }
            ClassLikeMember::Property(property) => {
                properties.append(&mut extract_property_info(property, context));
            }
            ClassLikeMember::TraitUse(trait_use) => {
                for trait_name_ident in trait_use.trait_names.iter() {
                    used_traits.push(context.resolve_name(trait_name_ident.value()));
                }
            }
            _ => {}
        }
    }

    (methods, properties, used_traits)
}

/// Extract property information from a class member Property node.  One
/// declaration can introduce several properties (`public $a, $b;`).
fn extract_property_info(property: &Property, context: &FileContext) -> Vec<PropertyInfo> {
    let is_static = property.modifiers().iter().any(|m| m.is_static());
    let type_hint = property
        .hint()
        .map(|h| context.resolve_type_hint(&extract_hint_string(h)));

    property
        .variables()
        .iter()
        .map(|var| {
            let raw_name = var.name.to_string();
            PropertyInfo {
                name: raw_name.strip_prefix('$').unwrap_or(&raw_name).to_string(),
                type_hint: type_hint.clone(),
                is_static,
            }
        })
        .collect()
}
