//! Rule trait for defining lint rules.

use crate::ast::Program;
use crate::context::FileContext;
use crate::types::{Severity, Violation};

/// A per-file lint rule over the syntax tree.
///
/// Rules receive the parsed [`Program`] and usually walk it with a
/// [`crate::visit::Visit`] implementation. Any state a rule tracks while
/// walking belongs to the visitor created inside [`Rule::check`], so a single
/// rule instance can be reused across files.
///
/// # Example
///
/// ```ignore
/// use script_lint_core::{FileContext, Program, Rule, Violation};
/// use script_lint_core::visit::Visit;
///
/// pub struct NoEval;
///
/// impl Rule for NoEval {
///     fn name(&self) -> &'static str { "no-eval" }
///     fn code(&self) -> &'static str { "SL900" }
///
///     fn check(&self, ctx: &FileContext, program: &Program) -> Vec<Violation> {
///         let mut visitor = EvalVisitor::new(ctx);
///         visitor.visit_program(program);
///         visitor.violations
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "no-chai-assert").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "SL002").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether this rule requires a reason when using allow directives.
    ///
    /// By default, rules with `Severity::Error` require a reason.
    fn requires_allow_reason(&self) -> bool {
        self.default_severity() == Severity::Error
    }

    /// Checks a single file and returns any violations found.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Context about the file being checked
    /// * `program` - The parsed syntax tree of the file
    fn check(&self, ctx: &FileContext, program: &Program) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
