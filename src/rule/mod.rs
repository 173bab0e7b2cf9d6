/// Call-rewrite rules.
///
/// A rule receives a lowered call by value and either hands it back
/// untouched or returns its replacement.  Rules never see the file; the
/// host decides which calls to offer (only those inside PHPUnit test
/// classes) and turns replacements into text edits.
///
/// Sub-modules:
/// - [`rename`]: direction-keyed renaming of call targets
/// - [`arguments`]: rebuilding argument lists around a new first argument
/// - `assert_isset`: the `assertTrue(isset(...))` rule
pub mod arguments;
pub mod rename;

mod assert_isset;

pub use assert_isset::{ASSERT_FALSE, ASSERT_TRUE, AssertIssetToSpecificMethodRule};

use crate::node::CallExpr;

/// Outcome of offering a call to a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteResult {
    /// The rule did not apply; the call is returned as it came in.
    Unchanged(CallExpr),
    /// The call to put in place of the original.
    Rewritten(CallExpr),
}

impl RewriteResult {
    pub fn is_rewritten(&self) -> bool {
        matches!(self, RewriteResult::Rewritten(_))
    }

    /// The call either way.
    pub fn into_call(self) -> CallExpr {
        match self {
            RewriteResult::Unchanged(call) | RewriteResult::Rewritten(call) => call,
        }
    }

    /// The replacement, if the rule applied.
    pub fn rewritten(self) -> Option<CallExpr> {
        match self {
            RewriteResult::Rewritten(call) => Some(call),
            RewriteResult::Unchanged(_) => None,
        }
    }
}

/// A before / after example of a rule.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CodeSample {
    pub before: String,
    pub after: String,
}

/// Human-readable description of a rule.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RuleDefinition {
    pub name: &'static str,
    pub description: String,
    pub samples: Vec<CodeSample>,
}

/// A rule that rewrites method / static calls.
pub trait CallRewriteRule {
    fn definition(&self) -> RuleDefinition;

    /// Offer `call` to the rule.
    fn attempt_rewrite(&self, call: CallExpr) -> RewriteResult;
}
