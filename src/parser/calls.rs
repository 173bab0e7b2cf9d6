/// Lowering of method and static calls into the owned [`crate::node`] model.
///
/// Only the shapes rewrite rules inspect are given structure: `isset(...)`,
/// property access, array access, direct variables, and string literals.
/// Anything else becomes [`ExprKind::Other`] carrying its source text, so
/// the printer can reproduce it exactly wherever a rule moves it.
use mago_span::{HasSpan, Span};
use mago_syntax::ast::sequence::TokenSeparatedSequence;
use mago_syntax::ast::*;

use crate::node::{self, CallExpr, CallKind, Expr, ExprKind, PropertyName, TextRange};

/// The original text covered by `span`, or `""` if the span falls outside
/// `content` (which only happens when content and AST disagree).
pub(crate) fn span_text(content: &str, span: Span) -> &str {
    content
        .get(span.start.offset as usize..span.end.offset as usize)
        .unwrap_or("")
}

/// Lower an instance or static method call.
///
/// Returns `None` for function calls, null-safe method calls, and calls
/// whose method name is dynamic (`$this->$name()`), none of which a
/// call-rewrite rule can match by name.
pub fn lower_call(call: &Call<'_>, content: &str) -> Option<CallExpr> {
    let (kind, selector, argument_list) = match call {
        Call::Method(mc) => (CallKind::Method, &mc.method, &mc.argument_list),
        Call::StaticMethod(sc) => (CallKind::StaticMethod, &sc.method, &sc.argument_list),
        _ => return None,
    };

    let ClassLikeMemberSelector::Identifier(ident) = selector else {
        return None;
    };

    let list_span = argument_list.span();
    let list_text = span_text(content, list_span);

    Some(CallExpr {
        kind,
        name: ident.value.to_string(),
        arguments: lower_arguments(&argument_list.arguments, content),
        is_first_class_callable: is_first_class_callable_list(list_text),
        range: TextRange::new(selector.span().start.offset, list_span.end.offset),
    })
}

/// Whether an argument list is the first-class callable marker `(...)`.
fn is_first_class_callable_list(list_text: &str) -> bool {
    let compact: String = list_text.chars().filter(|c| !c.is_whitespace()).collect();
    compact == "(...)"
}

fn lower_arguments(
    arguments: &TokenSeparatedSequence<'_, Argument<'_>>,
    content: &str,
) -> Vec<node::Argument> {
    arguments
        .iter()
        .map(|arg| {
            let source = span_text(content, arg.span());
            let (name, value) = match arg {
                Argument::Positional(pos) => (None, pos.value),
                Argument::Named(named) => (Some(named.name.value.to_string()), named.value),
            };
            node::Argument {
                name,
                unpack: source.trim_start().starts_with("..."),
                value: lower_expression(value, content),
                source: Some(source.to_string()),
            }
        })
        .collect()
}

/// Lower an arbitrary expression, keeping its source text.
pub fn lower_expression(expr: &Expression<'_>, content: &str) -> Expr {
    let kind = match expr {
        Expression::Construct(Construct::Isset(isset)) => ExprKind::Isset(
            isset
                .values
                .iter()
                .map(|value| lower_expression(value, content))
                .collect(),
        ),
        Expression::Access(Access::Property(pa)) => {
            let property = match &pa.property {
                ClassLikeMemberSelector::Identifier(ident) => {
                    PropertyName::Identifier(ident.value.to_string())
                }
                _ => PropertyName::Dynamic,
            };
            ExprKind::PropertyFetch(node::PropertyFetch {
                object: Box::new(lower_expression(pa.object, content)),
                property,
            })
        }
        Expression::ArrayAccess(array_access) => ExprKind::ArrayDimFetch(node::ArrayDimFetch {
            array: Box::new(lower_expression(array_access.array, content)),
            index: Box::new(lower_expression(array_access.index, content)),
        }),
        Expression::Variable(Variable::Direct(dv)) => ExprKind::Variable(dv.name.to_string()),
        Expression::Literal(Literal::String(lit_str)) => {
            ExprKind::String(lit_str.value.map(|v| v.to_string()).unwrap_or_else(|| {
                let raw = lit_str.raw;
                raw.get(1..raw.len().saturating_sub(1))
                    .unwrap_or_default()
                    .to_string()
            }))
        }
        // Redundant parentheses carry no meaning of their own; the outer
        // text is kept so the printed node stays as written.
        Expression::Parenthesized(parenthesized) => {
            lower_expression(parenthesized.expression, content).kind
        }
        _ => ExprKind::Other,
    };
    Expr::with_source(kind, span_text(content, expr.span()))
}
