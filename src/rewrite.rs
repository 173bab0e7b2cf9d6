/// The source-level rewrite pass.
///
/// [`rewrite_source`] parses one file, finds every PHPUnit test class in
/// it, and walks the bodies of their methods (including closures and
/// arrow functions) in source order.  Along the way it keeps a [`Scope`]
/// of what is known about each variable's type, so that when a method or
/// static call is reached it can be lowered and offered to the rule with a
/// type resolver for exactly that call site.
///
/// Replacements become [`TextEdit`]s over the call's method-name-to-`)`
/// range; the receiver is never touched.  The arguments of a rewritten
/// call are not searched further, so edits never overlap.
use std::panic;

use bumpalo::Bump;
use mago_span::HasSpan;
use mago_syntax::ast::sequence::TokenSeparatedSequence;
use mago_syntax::ast::*;
use mago_syntax::parser::parse_file_content;
use serde::Serialize;

use crate::Workspace;
use crate::node::TextRange;
use crate::parser::calls::{lower_call, span_text};
use crate::parser::{self, FileContext};
use crate::printer::print_call;
use crate::reflection::ClassHierarchyAnalyzer;
use crate::rule::{AssertIssetToSpecificMethodRule, CallRewriteRule, RewriteResult};
use crate::type_resolver::{Scope, ScopeTypeResolver};
use crate::types::ClassInfo;
use crate::util::offset_to_line;

/// Replace `range` of the original content with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
}

/// One rewritten call, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRewrite {
    /// 1-based line of the call.
    pub line: usize,
    /// The whole call expression before the rewrite.
    pub before: String,
    /// The whole call expression after the rewrite.
    pub after: String,
}

/// The outcome of rewriting one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReport {
    pub path: std::path::PathBuf,
    pub rewrites: Vec<AppliedRewrite>,
}

/// The outcome of rewriting one source text.
#[derive(Debug, Clone, Default)]
pub struct SourceRewrite {
    pub rewrites: Vec<AppliedRewrite>,
    /// The new source; equal to the input when nothing was rewritten.
    pub content: String,
}

impl SourceRewrite {
    pub fn is_changed(&self) -> bool {
        !self.rewrites.is_empty()
    }
}

/// Rewrite every eligible assertion in `content`.
///
/// Class-likes declared in `content` are registered with the workspace
/// first, so test classes and the types they use can be resolved even when
/// they live in the same file.  A parser panic leaves the file unchanged.
pub fn rewrite_source(workspace: &Workspace, content: &str) -> SourceRewrite {
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        let arena = Bump::new();
        let file_id = mago_database::file::FileId::new("input.php");
        let program = parse_file_content(&arena, file_id, content);

        let parsed = parser::extract_file(program);
        workspace.register_classes(&parsed.classes);

        let mut collector = EditCollector {
            workspace,
            content,
            classes: &parsed.classes,
            edits: Vec::new(),
            rewrites: Vec::new(),
        };
        collector.walk_declarations(program.statements.iter(), &parsed.context);
        (collector.edits, collector.rewrites)
    }));

    match result {
        Ok((edits, rewrites)) => SourceRewrite {
            content: apply_edits(content, edits),
            rewrites,
        },
        Err(_) => {
            tracing::error!("parser panicked during rewrite, leaving file unchanged");
            SourceRewrite {
                rewrites: Vec::new(),
                content: content.to_string(),
            }
        }
    }
}

/// Apply non-overlapping edits, back to front so earlier offsets stay
/// valid.
pub fn apply_edits(content: &str, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));
    let mut out = content.to_string();
    for edit in edits {
        let start = edit.range.start as usize;
        let end = edit.range.end as usize;
        if start <= end && end <= out.len() {
            out.replace_range(start..end, &edit.replacement);
        }
    }
    out
}

struct EditCollector<'w> {
    workspace: &'w Workspace,
    content: &'w str,
    /// Class-likes declared in the file being rewritten.
    classes: &'w [ClassInfo],
    edits: Vec<TextEdit>,
    rewrites: Vec<AppliedRewrite>,
}

impl EditCollector<'_> {
    // ─── Declarations ───────────────────────────────────────────────────

    fn walk_declarations<'b>(
        &mut self,
        statements: impl Iterator<Item = &'b Statement<'b>>,
        context: &FileContext,
    ) {
        for statement in statements {
            match statement {
                Statement::Class(class) => {
                    let start = class.left_brace.start.offset;
                    let Some(info) = self.classes.iter().find(|c| c.start_offset == start) else {
                        continue;
                    };
                    if !self.workspace.is_test_case_class(info) {
                        continue;
                    }
                    tracing::trace!("walking test class {}", info.fqn);
                    let info = info.clone();
                    self.walk_test_class(class.members.iter(), &info, context);
                }
                Statement::Namespace(namespace) => {
                    let ns_context = FileContext::for_namespace(namespace);
                    self.walk_declarations(namespace.statements().iter(), &ns_context);
                }
                _ => {}
            }
        }
    }

    fn walk_test_class<'b>(
        &mut self,
        members: impl Iterator<Item = &'b ClassLikeMember<'b>>,
        class: &ClassInfo,
        context: &FileContext,
    ) {
        for member in members {
            let ClassLikeMember::Method(method) = member else {
                continue;
            };
            let MethodBody::Concrete(block) = &method.body else {
                continue;
            };

            let is_static = method.modifiers.iter().any(|m| m.is_static());
            let mut scope = Scope::new(Some(class.clone()), !is_static);
            record_parameters(&mut scope, &method.parameter_list, context, 0);
            self.walk_statements(block.statements.iter(), &mut scope, context);
        }
    }

    // ─── Statements ─────────────────────────────────────────────────────

    fn walk_statements<'b>(
        &mut self,
        statements: impl Iterator<Item = &'b Statement<'b>>,
        scope: &mut Scope,
        context: &FileContext,
    ) {
        for statement in statements {
            self.walk_statement(statement, scope, context);
        }
    }

    fn walk_statement(&mut self, statement: &Statement<'_>, scope: &mut Scope, context: &FileContext) {
        match statement {
            Statement::Expression(expr_stmt) => {
                self.walk_expression(expr_stmt.expression, scope, context);
            }
            Statement::Return(ret) => {
                if let Some(value) = ret.value {
                    self.walk_expression(value, scope, context);
                }
            }
            Statement::Echo(echo) => {
                for value in echo.values.iter() {
                    self.walk_expression(value, scope, context);
                }
            }
            Statement::Block(block) => {
                self.walk_statements(block.statements.iter(), scope, context);
            }
            Statement::If(if_stmt) => {
                self.walk_expression(if_stmt.condition, scope, context);
                match &if_stmt.body {
                    IfBody::Statement(body) => {
                        self.walk_statement(body.statement, scope, context);
                        for else_if in body.else_if_clauses.iter() {
                            self.walk_expression(else_if.condition, scope, context);
                            self.walk_statement(else_if.statement, scope, context);
                        }
                        if let Some(else_clause) = &body.else_clause {
                            self.walk_statement(else_clause.statement, scope, context);
                        }
                    }
                    IfBody::ColonDelimited(body) => {
                        self.walk_statements(body.statements.iter(), scope, context);
                        for else_if in body.else_if_clauses.iter() {
                            self.walk_expression(else_if.condition, scope, context);
                            self.walk_statements(else_if.statements.iter(), scope, context);
                        }
                        if let Some(else_clause) = &body.else_clause {
                            self.walk_statements(else_clause.statements.iter(), scope, context);
                        }
                    }
                }
            }
            Statement::Foreach(foreach) => {
                self.walk_expression(foreach.expression, scope, context);
                match &foreach.body {
                    ForeachBody::Statement(inner) => self.walk_statement(inner, scope, context),
                    ForeachBody::ColonDelimited(body) => {
                        self.walk_statements(body.statements.iter(), scope, context);
                    }
                }
            }
            Statement::While(while_stmt) => {
                self.walk_expression(while_stmt.condition, scope, context);
                match &while_stmt.body {
                    WhileBody::Statement(inner) => self.walk_statement(inner, scope, context),
                    WhileBody::ColonDelimited(body) => {
                        self.walk_statements(body.statements.iter(), scope, context);
                    }
                }
            }
            Statement::For(for_stmt) => match &for_stmt.body {
                ForBody::Statement(inner) => self.walk_statement(inner, scope, context),
                ForBody::ColonDelimited(body) => {
                    self.walk_statements(body.statements.iter(), scope, context);
                }
            },
            Statement::DoWhile(dw) => {
                self.walk_statement(dw.statement, scope, context);
                self.walk_expression(dw.condition, scope, context);
            }
            Statement::Try(try_stmt) => {
                self.walk_statements(try_stmt.block.statements.iter(), scope, context);
                for catch in try_stmt.catch_clauses.iter() {
                    self.walk_statements(catch.block.statements.iter(), scope, context);
                }
                if let Some(finally) = &try_stmt.finally_clause {
                    self.walk_statements(finally.block.statements.iter(), scope, context);
                }
            }
            Statement::Switch(switch) => {
                self.walk_expression(switch.expression, scope, context);
                match &switch.body {
                    SwitchBody::BraceDelimited(body) => {
                        for case in body.cases.iter() {
                            self.walk_statements(case.statements().iter(), scope, context);
                        }
                    }
                    SwitchBody::ColonDelimited(body) => {
                        for case in body.cases.iter() {
                            self.walk_statements(case.statements().iter(), scope, context);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    // ─── Expressions ────────────────────────────────────────────────────

    fn walk_expression(&mut self, expr: &Expression<'_>, scope: &mut Scope, context: &FileContext) {
        match expr {
            Expression::Call(call) => self.walk_call(call, scope, context),
            Expression::Assignment(assignment) => {
                self.walk_expression(assignment.rhs, scope, context);
                self.walk_expression(assignment.lhs, scope, context);
                if assignment.operator.is_assign()
                    && let Expression::Variable(Variable::Direct(dv)) = assignment.lhs
                {
                    let hint = instantiated_class(assignment.rhs, context)
                        .unwrap_or_else(|| "mixed".to_string());
                    scope.record(dv.name, hint, assignment.span().end.offset);
                }
            }
            Expression::Closure(closure) => {
                let has_this = scope.has_this && closure.r#static.is_none();
                let mut inner = Scope::new(scope.current_class.clone(), has_this);
                if let Some(ref use_clause) = closure.use_clause {
                    for use_var in use_clause.variables.iter() {
                        let name = use_var.variable.name;
                        if let Some(hint) = scope.type_of(name, closure.span().start.offset) {
                            inner.record(name, hint, 0);
                        }
                    }
                }
                record_parameters(&mut inner, &closure.parameter_list, context, 0);
                self.walk_statements(closure.body.statements.iter(), &mut inner, context);
            }
            Expression::ArrowFunction(arrow) => {
                // Arrow functions capture the enclosing scope by value.
                let mut inner = scope.clone();
                record_parameters(
                    &mut inner,
                    &arrow.parameter_list,
                    context,
                    arrow.span().start.offset,
                );
                self.walk_expression(arrow.expression, &mut inner, context);
            }
            Expression::Parenthesized(p) => self.walk_expression(p.expression, scope, context),
            Expression::Binary(bin) => {
                self.walk_expression(bin.lhs, scope, context);
                self.walk_expression(bin.rhs, scope, context);
            }
            Expression::Conditional(cond) => {
                self.walk_expression(cond.condition, scope, context);
                if let Some(then) = cond.then {
                    self.walk_expression(then, scope, context);
                }
                self.walk_expression(cond.r#else, scope, context);
            }
            Expression::Array(arr) => {
                for elem in arr.elements.iter() {
                    self.walk_array_element(elem, scope, context);
                }
            }
            Expression::LegacyArray(arr) => {
                for elem in arr.elements.iter() {
                    self.walk_array_element(elem, scope, context);
                }
            }
            Expression::Match(m) => {
                self.walk_expression(m.expression, scope, context);
                for arm in m.arms.iter() {
                    self.walk_expression(arm.expression(), scope, context);
                }
            }
            Expression::Access(access) => match access {
                Access::Property(pa) => self.walk_expression(pa.object, scope, context),
                Access::NullSafeProperty(pa) => self.walk_expression(pa.object, scope, context),
                Access::StaticProperty(pa) => self.walk_expression(pa.class, scope, context),
                Access::ClassConstant(pa) => self.walk_expression(pa.class, scope, context),
            },
            Expression::ArrayAccess(aa) => {
                self.walk_expression(aa.array, scope, context);
                self.walk_expression(aa.index, scope, context);
            }
            Expression::Instantiation(inst) => {
                if let Some(ref args) = inst.argument_list {
                    self.walk_arguments(&args.arguments, scope, context);
                }
            }
            Expression::UnaryPrefix(u) => self.walk_expression(u.operand, scope, context),
            Expression::UnaryPostfix(u) => self.walk_expression(u.operand, scope, context),
            Expression::Yield(y) => match y {
                Yield::Value(yv) => {
                    if let Some(value) = &yv.value {
                        self.walk_expression(value, scope, context);
                    }
                }
                Yield::Pair(yp) => {
                    self.walk_expression(yp.key, scope, context);
                    self.walk_expression(yp.value, scope, context);
                }
                Yield::From(yf) => self.walk_expression(yf.iterator, scope, context),
            },
            Expression::Throw(t) => self.walk_expression(t.exception, scope, context),
            Expression::Clone(c) => self.walk_expression(c.object, scope, context),
            Expression::Pipe(p) => {
                self.walk_expression(p.input, scope, context);
                self.walk_expression(p.callable, scope, context);
            }
            _ => {}
        }
    }

    fn walk_array_element(
        &mut self,
        elem: &ArrayElement<'_>,
        scope: &mut Scope,
        context: &FileContext,
    ) {
        match elem {
            ArrayElement::KeyValue(kv) => {
                self.walk_expression(kv.key, scope, context);
                self.walk_expression(kv.value, scope, context);
            }
            ArrayElement::Value(v) => self.walk_expression(v.value, scope, context),
            ArrayElement::Variadic(v) => self.walk_expression(v.value, scope, context),
            ArrayElement::Missing(_) => {}
        }
    }

    fn walk_arguments(
        &mut self,
        arguments: &TokenSeparatedSequence<'_, Argument<'_>>,
        scope: &mut Scope,
        context: &FileContext,
    ) {
        for arg in arguments.iter() {
            let value = match arg {
                Argument::Positional(pos) => pos.value,
                Argument::Named(named) => named.value,
            };
            self.walk_expression(value, scope, context);
        }
    }

    fn walk_call(&mut self, call: &Call<'_>, scope: &mut Scope, context: &FileContext) {
        match call {
            Call::Function(fc) => {
                self.walk_arguments(&fc.argument_list.arguments, scope, context);
            }
            Call::NullSafeMethod(mc) => {
                self.walk_expression(mc.object, scope, context);
                self.walk_arguments(&mc.argument_list.arguments, scope, context);
            }
            Call::Method(mc) => {
                self.walk_expression(mc.object, scope, context);
                if !self.offer_call(call, scope) {
                    self.walk_arguments(&mc.argument_list.arguments, scope, context);
                }
            }
            Call::StaticMethod(sc) => {
                self.walk_expression(sc.class, scope, context);
                if !self.offer_call(call, scope) {
                    self.walk_arguments(&sc.argument_list.arguments, scope, context);
                }
            }
        }
    }

    // ─── Rewriting ──────────────────────────────────────────────────────

    /// Offer a method or static call to the rule; record an edit and
    /// return `true` when it was rewritten.
    fn offer_call(&mut self, call: &Call<'_>, scope: &Scope) -> bool {
        let Some(lowered) = lower_call(call, self.content) else {
            return false;
        };

        let range = lowered.range;
        let resolver = ScopeTypeResolver::new(self.workspace, scope, range.start);
        let analyzer = ClassHierarchyAnalyzer::new(&resolver, self.workspace);
        let rule = AssertIssetToSpecificMethodRule::new(analyzer);

        let RewriteResult::Rewritten(rewritten) = rule.attempt_rewrite(lowered) else {
            return false;
        };

        let replacement = print_call(&rewritten);
        let call_span = call.span();
        let receiver = self
            .content
            .get(call_span.start.offset as usize..range.start as usize)
            .unwrap_or("");
        let rewrite = AppliedRewrite {
            line: offset_to_line(self.content, call_span.start.offset),
            before: span_text(self.content, call_span).to_string(),
            after: format!("{}{}", receiver, replacement),
        };
        tracing::debug!("line {}: {} → {}", rewrite.line, rewrite.before, rewrite.after);

        self.rewrites.push(rewrite);
        self.edits.push(TextEdit { range, replacement });
        true
    }
}

/// Record the type hints of a parameter list into `scope`.
fn record_parameters(
    scope: &mut Scope,
    parameter_list: &FunctionLikeParameterList<'_>,
    context: &FileContext,
    offset: u32,
) {
    for param in parser::extract_parameters(parameter_list, context) {
        if let Some(hint) = param.type_hint {
            scope.record(param.name, hint, offset);
        }
    }
}

/// The class an expression instantiates, when it is `new Name(...)`,
/// `new self` or `new static`.
fn instantiated_class(expr: &Expression<'_>, context: &FileContext) -> Option<String> {
    let Expression::Instantiation(inst) = expr else {
        return None;
    };
    match inst.class {
        Expression::Self_(_) => Some("self".to_string()),
        Expression::Static(_) => Some("static".to_string()),
        Expression::Identifier(ident) => Some(context.resolve_name(ident.value())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_edits_back_to_front() {
        let content = "aaa bbb ccc";
        let edits = vec![
            TextEdit {
                range: TextRange::new(0, 3),
                replacement: "x".to_string(),
            },
            TextEdit {
                range: TextRange::new(8, 11),
                replacement: "zzzz".to_string(),
            },
        ];
        assert_eq!(apply_edits(content, edits), "x bbb zzzz");
    }

    #[test]
    fn test_rewrite_in_test_class_only() {
        let workspace = Workspace::new();
        let content = "<?php\nclass FooTest extends \\PHPUnit\\Framework\\TestCase {\n    public function testIt(array $data) {\n        $this->assertTrue(isset($data['id']));\n    }\n}\nclass NotATest {\n    public function check(array $data) {\n        $this->assertTrue(isset($data['id']));\n    }\n}\n";
        let result = rewrite_source(&workspace, content);
        assert_eq!(result.rewrites.len(), 1);
        assert_eq!(result.rewrites[0].line, 4);
        assert_eq!(result.rewrites[0].before, "$this->assertTrue(isset($data['id']))");
        assert_eq!(result.rewrites[0].after, "$this->assertArrayHasKey('id', $data)");
        assert!(result.content.contains("class NotATest"));
        assert_eq!(
            result.content.matches("assertTrue(isset($data['id']))").count(),
            1
        );
    }

    #[test]
    fn test_file_without_test_classes_is_unchanged() {
        let workspace = Workspace::new();
        let content = "<?php\n$this->assertTrue(isset($a['x']));\n";
        let result = rewrite_source(&workspace, content);
        assert!(!result.is_changed());
        assert_eq!(result.content, content);
    }
}
