/// PHPUnit test class detection.
///
/// Assertion calls are only rewritten inside classes that extend
/// `PHPUnit\Framework\TestCase` (directly or through intermediate base
/// classes), or one of the extra base classes the workspace is configured
/// with.  PHPUnit itself normally lives in `vendor/` and is not loaded, so
/// the check compares names along the `extends` chain rather than
/// requiring the base class to be resolvable.
use crate::types::{ClassInfo, ClassLikeKind};
use crate::{PHPUNIT_TEST_CASE, Workspace};

impl Workspace {
    /// Whether `class` is a PHPUnit test class.
    pub(crate) fn is_test_case_class(&self, class: &ClassInfo) -> bool {
        if class.kind != ClassLikeKind::Class {
            return false;
        }

        if class
            .parent_class
            .as_deref()
            .is_some_and(|parent| self.is_test_case_name(parent))
        {
            return true;
        }

        self.parent_chain(class).iter().any(|ancestor| {
            ancestor
                .parent_class
                .as_deref()
                .is_some_and(|parent| self.is_test_case_name(parent))
        })
    }

    fn is_test_case_name(&self, fqn: &str) -> bool {
        let fqn = fqn.trim_start_matches('\\');
        fqn.eq_ignore_ascii_case(PHPUNIT_TEST_CASE)
            || self
                .test_case_classes
                .iter()
                .any(|extra| extra.eq_ignore_ascii_case(fqn))
    }
}
