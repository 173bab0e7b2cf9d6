/// `use` statement and namespace extraction.
///
/// Builds the mapping of short (imported) names to fully-qualified names
/// that [`super::FileContext::resolve_name`] consults.
use std::collections::HashMap;

use mago_syntax::ast::*;

use crate::util::short_name;

/// Walk statements and extract `use` statement mappings.
pub(super) fn extract_use_statements_from_statements<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    use_map: &mut HashMap<String, String>,
) {
    for statement in statements {
        match statement {
            Statement::Use(use_stmt) => {
                extract_use_items(&use_stmt.items, use_map);
            }
            Statement::Namespace(namespace) => {
                extract_use_statements_from_statements(namespace.statements().iter(), use_map);
            }
            _ => {}
        }
    }
}

/// Extract class imports from a `UseItems` node.  Function and constant
/// imports never name a class, so they are skipped.
fn extract_use_items(items: &UseItems, use_map: &mut HashMap<String, String>) {
    match items {
        UseItems::Sequence(seq) => {
            for item in seq.items.iter() {
                register_use_item(item, None, use_map);
            }
        }
        UseItems::TypedSequence(seq) => {
            if seq.r#type.is_function() || seq.r#type.is_const() {
                return;
            }
            for item in seq.items.iter() {
                register_use_item(item, None, use_map);
            }
        }
        UseItems::TypedList(list) => {
            if list.r#type.is_function() || list.r#type.is_const() {
                return;
            }
            let prefix = list.namespace.value();
            for item in list.items.iter() {
                register_use_item(item, Some(prefix), use_map);
            }
        }
        UseItems::MixedList(list) => {
            let prefix = list.namespace.value();
            for maybe_typed in list.items.iter() {
                if let Some(ref t) = maybe_typed.r#type
                    && (t.is_function() || t.is_const())
                {
                    continue;
                }
                register_use_item(&maybe_typed.item, Some(prefix), use_map);
            }
        }
    }
}

/// Register one imported name.  For group imports (`use Foo\{Bar}`) the
/// item is relative to `group_prefix`.
fn register_use_item(
    item: &UseItem,
    group_prefix: Option<&str>,
    use_map: &mut HashMap<String, String>,
) {
    let item_name = item.name.value();
    let fqn = match group_prefix {
        Some(prefix) => format!("{}\\{}", prefix.trim_end_matches('\\'), item_name),
        None => item_name.trim_start_matches('\\').to_string(),
    };

    let alias_name = match item.alias {
        Some(ref alias) => alias.identifier.value.to_string(),
        None => short_name(&fqn).to_string(),
    };

    use_map.insert(alias_name, fqn);
}

/// Return the first non-empty namespace declared in `statements`.
pub(super) fn extract_namespace_from_statements<'a>(
    mut statements: impl Iterator<Item = &'a Statement<'a>>,
) -> Option<String> {
    statements.find_map(|statement| match statement {
        Statement::Namespace(namespace) => namespace
            .name
            .as_ref()
            .map(|ident| ident.value())
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        _ => None,
    })
}
