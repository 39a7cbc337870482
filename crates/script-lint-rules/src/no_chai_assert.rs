//! Rule to forbid `require("chai").assert`.
//!
//! # Rationale
//!
//! Test suites use chai's `expect` style. Mixing in the `assert` interface
//! makes assertions inconsistent across files.
//!
//! # Detected Patterns
//!
//! - `require("chai").assert`
//!
//! `require("chai").expect`, `require("other").assert` and
//! `load("chai").assert` are not reported.
//!
//! # Configuration
//!
//! - `module`: forbidden module (default: `chai`)
//! - `property`: forbidden property (default: `assert`)
//! - `replacement`: name suggested instead (default: `expect`)
//! - `import_function`: module import function (default: `require`)

use script_lint_core::ast::{Expr, MemberExpr};
use script_lint_core::visit::{self, Visit};
use script_lint_core::{FileContext, Program, Rule, Severity, Suggestion, Violation};

/// Rule code for no-chai-assert.
pub const CODE: &str = "SL002";

/// Rule name for no-chai-assert.
pub const NAME: &str = "no-chai-assert";

/// Forbids accessing a property directly on an imported module.
#[derive(Debug, Clone)]
pub struct NoChaiAssert {
    module: String,
    property: String,
    replacement: String,
    import_function: String,
    severity: Severity,
}

impl Default for NoChaiAssert {
    fn default() -> Self {
        Self::new()
    }
}

impl NoChaiAssert {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            module: "chai".to_string(),
            property: "assert".to_string(),
            replacement: "expect".to_string(),
            import_function: "require".to_string(),
            severity: Severity::Error,
        }
    }

    /// Sets the forbidden module name.
    #[must_use]
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Sets the forbidden property name.
    #[must_use]
    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }

    /// Sets the name suggested in place of the forbidden property.
    #[must_use]
    pub fn replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    /// Sets the module import function name.
    #[must_use]
    pub fn import_function(mut self, name: impl Into<String>) -> Self {
        self.import_function = name.into();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Returns true if `node` is `<import>("<module>").<property>`.
    fn is_forbidden(&self, node: &MemberExpr) -> bool {
        self.forbidden_access(node).is_some()
    }

    fn forbidden_access(&self, node: &MemberExpr) -> Option<()> {
        if node.property_name()? != self.property {
            return None;
        }
        let Expr::Call(call) = node.object.as_ref() else {
            return None;
        };
        if call.callee.as_identifier()? != self.import_function {
            return None;
        }
        let [argument] = call.arguments.as_slice() else {
            return None;
        };
        (argument.as_str_literal()? == self.module).then_some(())
    }
}

impl Rule for NoChaiAssert {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids require(\"chai\").assert in favor of expect"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext, program: &Program) -> Vec<Violation> {
        let mut visitor = AssertVisitor {
            ctx,
            rule: self,
            violations: Vec::new(),
        };

        visitor.visit_program(program);
        visitor.violations
    }
}

struct AssertVisitor<'a> {
    ctx: &'a FileContext<'a>,
    rule: &'a NoChaiAssert,
    violations: Vec<Violation>,
}

impl<'ast> Visit<'ast> for AssertVisitor<'_> {
    fn visit_member_expr(&mut self, node: &'ast MemberExpr) {
        if self.rule.is_forbidden(node) {
            let rule = self.rule;
            self.violations.push(
                Violation::at(
                    rule,
                    self.ctx,
                    node.span,
                    format!("Use {} instead of {}", rule.replacement, rule.property),
                )
                .with_suggestion(Suggestion::new(format!(
                    "Use {}(\"{}\").{}",
                    rule.import_function, rule.module, rule.replacement
                ))),
            );
        }

        visit::visit_member_expr(self, node);
    }
}
