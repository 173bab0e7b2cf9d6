/// Rendering of owned call nodes back to PHP source.
///
/// Nodes lowered from a file print their original text verbatim; only
/// nodes a rule synthesized are rendered from their structure.  The
/// printed call covers the same region as [`CallExpr::range`]: method name
/// through the closing parenthesis.
use crate::node::{Argument, CallExpr, Expr, ExprKind, PropertyName};

/// Render `name(arg, arg, ...)`.
pub fn print_call(call: &CallExpr) -> String {
    if call.is_first_class_callable {
        return format!("{}(...)", call.name);
    }
    let args: Vec<String> = call.arguments.iter().map(print_argument).collect();
    format!("{}({})", call.name, args.join(", "))
}

pub fn print_argument(arg: &Argument) -> String {
    if let Some(ref source) = arg.source {
        return source.clone();
    }
    let value = print_expr(&arg.value);
    match (&arg.name, arg.unpack) {
        (Some(name), _) => format!("{}: {}", name, value),
        (None, true) => format!("...{}", value),
        (None, false) => value,
    }
}

pub fn print_expr(expr: &Expr) -> String {
    if let Some(ref source) = expr.source {
        return source.clone();
    }
    match &expr.kind {
        ExprKind::Isset(values) => {
            let values: Vec<String> = values.iter().map(print_expr).collect();
            format!("isset({})", values.join(", "))
        }
        ExprKind::PropertyFetch(fetch) => match &fetch.property {
            PropertyName::Identifier(name) => format!("{}->{}", print_expr(&fetch.object), name),
            // A dynamic selector without source text has nothing to print;
            // lowering always attaches source to these.
            PropertyName::Dynamic => format!("{}->{{}}", print_expr(&fetch.object)),
        },
        ExprKind::ArrayDimFetch(fetch) => {
            format!("{}[{}]", print_expr(&fetch.array), print_expr(&fetch.index))
        }
        ExprKind::Variable(name) => name.clone(),
        ExprKind::String(value) => quote_single(value),
        ExprKind::Other => String::new(),
    }
}

/// Render a single-quoted PHP string literal.
///
/// Inside single quotes only `\` and `'` need escaping.
fn quote_single(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\\' || ch == '\'' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::CallKind;

    #[test]
    fn test_synthesized_string_is_single_quoted() {
        assert_eq!(print_expr(&Expr::string("foo")), "'foo'");
        assert_eq!(print_expr(&Expr::string("it's")), r"'it\'s'");
        assert_eq!(print_expr(&Expr::string(r"a\b")), r"'a\\b'");
    }

    #[test]
    fn test_source_text_wins_over_structure() {
        let expr = Expr::with_source(ExprKind::Variable("$a".to_string()), "$a /* keep */");
        assert_eq!(print_expr(&expr), "$a /* keep */");
    }

    #[test]
    fn test_print_call_joins_arguments() {
        let call = CallExpr::new(
            CallKind::Method,
            "assertArrayHasKey",
            vec![
                Argument::positional(Expr::other("\"foo\"")),
                Argument::positional(Expr::variable("$arr")),
                Argument {
                    name: Some("message".to_string()),
                    unpack: false,
                    value: Expr::string("msg"),
                    source: None,
                },
            ],
        );
        assert_eq!(
            print_call(&call),
            "assertArrayHasKey(\"foo\", $arr, message: 'msg')"
        );
    }

    #[test]
    fn test_print_structural_accesses() {
        let expr = Expr::array_dim_fetch(
            Expr::property_fetch(
                Expr::variable("$this"),
                PropertyName::Identifier("items".to_string()),
            ),
            Expr::string("x"),
        );
        assert_eq!(print_expr(&expr), "$this->items['x']");
    }
}
