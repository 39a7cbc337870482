//! Rule restricting the namespaces passed to `Console.get()`.
//!
//! # Rationale
//!
//! Logger namespaces are routed and filtered by their first dot-delimited
//! segment. A namespace whose first segment is not a known area ends up in
//! a catch-all log that nobody watches.
//!
//! # Detected Patterns
//!
//! ```text
//! var Console = require('../monitoring/Console.ds');            // tracks `Console`
//! var log = require('../monitoring/Console.ds').get('pdp.x');   // checked
//! var log = Console.get('checkout.cart');                       // checked
//! log = require('/scripts/monitoring/Console.ds').get('jobs');  // checked
//! Console.get('checkout.minicart', true).error('...');          // checked
//! ```
//!
//! Calls on a receiver other than the tracked binding are ignored, including
//! member receivers such as `grunt.config.get('x')`. The binding is tracked
//! in source order, so a `get` call above its `require` is not checked.
//!
//! # Configuration
//!
//! - `allowed_namespaces`: inline list of allowed first segments
//! - `allowed_namespaces_file`: JSON array file with the same content
//! - `import_function`: module import function (default: `require`)
//! - `factory_path`: substring identifying the factory module
//!   (default: `monitoring/Console`)
//! - `accessor`: accessor method name (default: `get`)

use crate::RuleSetupError;
use script_lint_core::ast::{CallExpr, Expr, ExpressionStatement, Span, VariableDeclarator};
use script_lint_core::visit::{self, Visit};
use script_lint_core::{FileContext, Program, Rule, Severity, Suggestion, Violation};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Rule code for console-namespace.
pub const CODE: &str = "SL001";

/// Rule name for console-namespace.
pub const NAME: &str = "console-namespace";

/// Namespaces allowed when nothing is configured.
pub const DEFAULT_NAMESPACES: &[&str] = &[
    "account",
    "pdp",
    "plp",
    "content",
    "checkout",
    "jobs",
    "adyen",
    "globalcollect",
    "klarna",
    "sds",
    "mailchimp",
    "marked",
    "marketingcloud",
    "paris",
    "zendesk",
    "multipage",
];

/// Ordered list of allowed namespace prefixes.
///
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    names: Vec<String>,
}

impl AllowList {
    /// Creates an allow-list from the given names.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a JSON array of strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a JSON array of strings.
    pub fn from_json_str(json: &str) -> Result<Self, RuleSetupError> {
        let names: Vec<String> =
            serde_json::from_str(json).map_err(|source| RuleSetupError::AllowListParse {
                origin: "<inline>".to_string(),
                source,
            })?;
        Ok(Self { names })
    }

    /// Reads a JSON array of strings from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON array of
    /// strings.
    pub fn from_json_file(path: &Path) -> Result<Self, RuleSetupError> {
        let content = std::fs::read_to_string(path).map_err(|source| RuleSetupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content).map_err(|e| match e {
            RuleSetupError::AllowListParse { source, .. } => RuleSetupError::AllowListParse {
                origin: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// Returns true if `segment` is allowed.
    #[must_use]
    pub fn contains(&self, segment: &str) -> bool {
        self.names.iter().any(|n| n == segment)
    }

    /// Allowed names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACES.iter().copied())
    }
}

impl fmt::Display for AllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names.join(", "))
    }
}

/// Restricts `Console.get()` namespaces to an allow-list.
#[derive(Debug, Clone)]
pub struct ConsoleNamespace {
    allowed: AllowList,
    import_function: String,
    factory_path: String,
    accessor: String,
    severity: Severity,
}

impl Default for ConsoleNamespace {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleNamespace {
    /// Creates a new rule with the default allow-list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allowed: AllowList::default(),
            import_function: "require".to_string(),
            factory_path: "monitoring/Console".to_string(),
            accessor: "get".to_string(),
            severity: Severity::Error,
        }
    }

    /// Replaces the allow-list.
    #[must_use]
    pub fn allowed(mut self, allowed: AllowList) -> Self {
        self.allowed = allowed;
        self
    }

    /// Sets the module import function name.
    #[must_use]
    pub fn import_function(mut self, name: impl Into<String>) -> Self {
        self.import_function = name.into();
        self
    }

    /// Sets the substring identifying the factory module path.
    #[must_use]
    pub fn factory_path(mut self, path: impl Into<String>) -> Self {
        self.factory_path = path.into();
        self
    }

    /// Sets the accessor method name.
    #[must_use]
    pub fn accessor(mut self, name: impl Into<String>) -> Self {
        self.accessor = name.into();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Returns the allow-list in use.
    #[must_use]
    pub fn allow_list(&self) -> &AllowList {
        &self.allowed
    }

    /// Returns the first segment of `namespace` if it is not allowed.
    #[must_use]
    pub fn disallowed_segment<'a>(&self, namespace: &'a str) -> Option<&'a str> {
        let segment = namespace.split('.').next().unwrap_or(namespace);
        (!self.allowed.contains(segment)).then_some(segment)
    }

    /// `require("…monitoring/Console…")`
    fn factory_import<'a>(&self, expr: &'a Expr) -> Option<&'a CallExpr> {
        let Expr::Call(call) = expr else {
            return None;
        };
        if call.callee.as_identifier() != Some(self.import_function.as_str()) {
            return None;
        }
        let path = call.arguments.first()?.as_str_literal()?;
        path.contains(self.factory_path.as_str()).then_some(call)
    }

    /// `<receiver>.get("<ns>", …)`, returning the receiver and namespace.
    fn accessor_call<'a>(&self, call: &'a CallExpr) -> Option<(&'a Expr, &'a str)> {
        let Expr::Member(member) = call.callee.as_ref() else {
            return None;
        };
        if member.property_name() != Some(self.accessor.as_str()) {
            return None;
        }
        let namespace = call.arguments.first()?.as_str_literal()?;
        Some((member.object.as_ref(), namespace))
    }

    /// `require("…monitoring/Console…").get("<ns>", …)`
    fn factory_get<'a>(&self, expr: &'a Expr) -> Option<&'a str> {
        let Expr::Call(call) = expr else {
            return None;
        };
        let (receiver, namespace) = self.accessor_call(call)?;
        self.factory_import(receiver).map(|_| namespace)
    }

    /// `<binding>.get("<ns>", …)` where the receiver is the plain identifier
    /// `binding`.
    fn tracked_get<'a>(&self, call: &'a CallExpr, binding: &str) -> Option<&'a str> {
        let (receiver, namespace) = self.accessor_call(call)?;
        (receiver.as_identifier()? == binding).then_some(namespace)
    }

    fn violation(&self, ctx: &FileContext<'_>, span: Span, segment: &str) -> Violation {
        Violation::at(
            self,
            ctx,
            span,
            format!(
                "\"{segment}\" is not an allowed namespace. Console.{}() must be called with a namespace starting with one of: {}",
                self.accessor, self.allowed
            ),
        )
        .with_suggestion(Suggestion::new(format!(
            "Use one of the allowed namespaces or add \"{segment}\" to allowed_namespaces"
        )))
    }
}

impl Rule for ConsoleNamespace {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Restricts Console.get() namespaces to an allow-list"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext, program: &Program) -> Vec<Violation> {
        let mut visitor = NamespaceVisitor {
            ctx,
            rule: self,
            violations: Vec::new(),
            factory_binding: None,
        };

        visitor.visit_program(program);
        visitor.violations
    }
}

struct NamespaceVisitor<'a> {
    ctx: &'a FileContext<'a>,
    rule: &'a ConsoleNamespace,
    violations: Vec<Violation>,
    /// Local name last bound to the factory module in this file.
    factory_binding: Option<String>,
}

impl NamespaceVisitor<'_> {
    fn validate(&mut self, namespace: &str, span: Span) {
        if let Some(segment) = self.rule.disallowed_segment(namespace) {
            self.violations
                .push(self.rule.violation(self.ctx, span, segment));
        }
    }

    fn tracked_get<'c>(&self, call: &'c CallExpr) -> Option<&'c str> {
        let binding = self.factory_binding.as_deref()?;
        self.rule.tracked_get(call, binding)
    }
}

impl<'ast> Visit<'ast> for NamespaceVisitor<'_> {
    fn visit_variable_declarator(&mut self, node: &'ast VariableDeclarator) {
        if let Some(init) = &node.init {
            if self.rule.factory_import(init).is_some() {
                if let Some(name) = node.id.name() {
                    debug!("Tracking console binding `{}`", name);
                    self.factory_binding = Some(name.to_string());
                }
            } else if let Some(namespace) = self.rule.factory_get(init) {
                self.validate(namespace, node.span);
            } else if let Expr::Call(call) = init {
                if let Some(namespace) = self.tracked_get(call) {
                    self.validate(namespace, node.span);
                }
            }
        }

        visit::visit_variable_declarator(self, node);
    }

    fn visit_expression_statement(&mut self, node: &'ast ExpressionStatement) {
        match &node.expression {
            Expr::Assignment(assign) if assign.operator == "=" => {
                if let Some(namespace) = self.rule.factory_get(&assign.right) {
                    self.validate(namespace, node.span);
                }
            }
            Expr::Call(call) => {
                // `<binding>.get(...).error(...)` checks the inner call.
                let get_call = match call.callee.as_ref() {
                    Expr::Member(member) => match member.object.as_ref() {
                        Expr::Call(inner) => inner,
                        _ => call,
                    },
                    _ => call,
                };
                if let Some(namespace) = self.tracked_get(get_call) {
                    self.validate(namespace, node.span);
                }
            }
            _ => {}
        }

        visit::visit_expression_statement(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use script_lint_core::ast::{
        AssignmentExpr, Binding, DeclarationKind, Identifier, Literal, LiteralValue, MemberExpr,
        Stmt, VariableDeclaration,
    };
    use std::path::Path;

    const CONSOLE_PATH: &str = "../monitoring/Console.ds";

    fn ident(name: &str) -> Expr {
        Expr::Identifier(Identifier {
            name: name.to_string(),
            span: Span::default(),
        })
    }

    fn lit(value: &str) -> Expr {
        Expr::Literal(Literal {
            value: LiteralValue::String(value.to_string()),
            raw: format!("'{value}'"),
            span: Span::default(),
        })
    }

    fn boolean(value: bool) -> Expr {
        Expr::Literal(Literal {
            value: LiteralValue::Boolean(value),
            raw: value.to_string(),
            span: Span::default(),
        })
    }

    fn call(callee: Expr, arguments: Vec<Expr>) -> Expr {
        Expr::Call(CallExpr {
            callee: Box::new(callee),
            arguments,
            span: Span::default(),
        })
    }

    fn member(object: Expr, property: &str) -> Expr {
        Expr::Member(MemberExpr {
            object: Box::new(object),
            property: Box::new(ident(property)),
            computed: false,
            span: Span::default(),
        })
    }

    fn require(path: &str) -> Expr {
        call(ident("require"), vec![lit(path)])
    }

    fn var(name: &str, init: Expr) -> Stmt {
        Stmt::VariableDeclaration(VariableDeclaration {
            kind: DeclarationKind::Var,
            declarations: vec![VariableDeclarator {
                id: Binding::Identifier(Identifier {
                    name: name.to_string(),
                    span: Span::default(),
                }),
                init: Some(init),
                span: Span::new(1, 5, 4, 20),
            }],
            span: Span::new(1, 1, 0, 21),
        })
    }

    fn stmt(expression: Expr) -> Stmt {
        stmt_on(2, expression)
    }

    fn stmt_on(line: usize, expression: Expr) -> Stmt {
        Stmt::Expression(ExpressionStatement {
            expression,
            span: Span::new(line, 1, 0, 0),
        })
    }

    fn check(rule: &ConsoleNamespace, body: Vec<Stmt>) -> Vec<Violation> {
        let ctx = FileContext::new(
            Path::new("/proj/cartridge/scripts/cart.js"),
            "",
            Path::new("/proj"),
        );
        let program = Program {
            body,
            span: Span::default(),
        };
        rule.check(&ctx, &program)
    }

    fn check_default(body: Vec<Stmt>) -> Vec<Violation> {
        check(&ConsoleNamespace::new(), body)
    }

    #[test]
    fn test_disallowed_segment() {
        let rule = ConsoleNamespace::new();
        assert_eq!(rule.disallowed_segment("checkout.minicart.rendering"), None);
        assert_eq!(
            rule.disallowed_segment("invalid.minicart.rendering"),
            Some("invalid")
        );
        assert_eq!(rule.disallowed_segment("checkout"), None);
        assert_eq!(rule.disallowed_segment("Checkout.cart"), Some("Checkout"));
        assert_eq!(rule.disallowed_segment(".checkout"), Some(""));
        assert_eq!(rule.disallowed_segment(""), Some(""));
    }

    #[test]
    fn test_require_only_tracks_binding() {
        let violations = check_default(vec![var("console", require(CONSOLE_PATH))]);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_require_get_declaration() {
        let init = |ns| call(member(require(CONSOLE_PATH), "get"), vec![lit(ns)]);

        assert!(check_default(vec![var("console", init("multipage.widget"))]).is_empty());

        let violations = check_default(vec![var("console", init("invalid.minicart.rendering"))]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE);
        assert!(violations[0].message.contains("\"invalid\""));
        assert_eq!(violations[0].location.line, 1);
        assert_eq!(violations[0].location.column, 5);
    }

    #[test]
    fn test_require_get_of_other_module_is_ignored() {
        let init = call(member(require("dw/system/Logger"), "get"), vec![lit("invalid")]);
        assert!(check_default(vec![var("log", init)]).is_empty());
    }

    #[test]
    fn test_require_get_does_not_track_binding() {
        let violations = check_default(vec![
            var(
                "console",
                call(member(require(CONSOLE_PATH), "get"), vec![lit("checkout")]),
            ),
            stmt(call(member(ident("console"), "get"), vec![lit("invalid")])),
        ]);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_tracked_get_declaration() {
        let get = |receiver, ns| call(member(ident(receiver), "get"), vec![lit(ns)]);

        let violations = check_default(vec![
            var("Console", require(CONSOLE_PATH)),
            var("Logger", get("Console", "mailchimp.newsletter.addmember")),
            var("Other", get("Console", "invalid.minicart.rendering")),
        ]);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("invalid"));
    }

    #[test]
    fn test_later_import_rebinds() {
        let get = |line, receiver| {
            stmt_on(line, call(member(ident(receiver), "get"), vec![lit("invalid")]))
        };

        let violations = check_default(vec![
            var("A", require(CONSOLE_PATH)),
            var("B", require(CONSOLE_PATH)),
            get(3, "A"),
            get(4, "B"),
        ]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 4);
    }

    #[test]
    fn test_unrelated_import_keeps_binding() {
        let violations = check_default(vec![
            var("C", require(CONSOLE_PATH)),
            var("x", require("other")),
            stmt_on(3, call(member(ident("C"), "get"), vec![lit("invalid")])),
        ]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 3);
    }

    #[test]
    fn test_untracked_receiver_is_ignored() {
        let violations = check_default(vec![
            var("console", require(CONSOLE_PATH)),
            var(
                "Logger",
                call(member(ident("other"), "get"), vec![lit("invalid.x")]),
            ),
            stmt(call(member(ident("other"), "get"), vec![lit("checkout.x")])),
        ]);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_member_receiver_is_ignored() {
        // var unitTestsSrc = grunt.config.get('unitTestsSrc');
        let violations = check_default(vec![
            var("grunt", require(CONSOLE_PATH)),
            var(
                "unitTestsSrc",
                call(
                    member(member(ident("grunt"), "config"), "get"),
                    vec![lit("unitTestsSrc")],
                ),
            ),
        ]);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_get_before_require_is_not_checked() {
        let violations = check_default(vec![
            stmt(call(member(ident("Console"), "get"), vec![lit("invalid")])),
            var("Console", require(CONSOLE_PATH)),
        ]);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_assignment_statement() {
        let assign = |ns| {
            stmt(Expr::Assignment(AssignmentExpr {
                operator: "=".to_string(),
                left: Box::new(ident("console")),
                right: Box::new(call(
                    member(
                        require("/mod_bse_core/cartridge/scripts/monitoring/Console.ds"),
                        "get",
                    ),
                    vec![lit(ns)],
                )),
                span: Span::default(),
            }))
        };

        assert!(check_default(vec![assign("checkout.cart.change-quantity")]).is_empty());

        let violations = check_default(vec![assign("invalid.cart")]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 2);
    }

    #[test]
    fn test_augmented_assignment_is_ignored() {
        let violations = check_default(vec![stmt(Expr::Assignment(AssignmentExpr {
            operator: "+=".to_string(),
            left: Box::new(ident("console")),
            right: Box::new(call(member(require(CONSOLE_PATH), "get"), vec![lit("invalid")])),
            span: Span::default(),
        }))]);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_call_statement() {
        let get = |ns| {
            stmt(call(
                member(ident("console"), "get"),
                vec![lit(ns), boolean(true)],
            ))
        };

        let violations = check_default(vec![
            var("console", require(CONSOLE_PATH)),
            get("checkout.minicart.rendering"),
            get("invalid.minicart.rendering"),
        ]);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("invalid"));
    }

    #[test]
    fn test_chained_call_statement() {
        let chained = |ns| {
            stmt(call(
                member(
                    call(member(ident("Console"), "get"), vec![lit(ns), boolean(true)]),
                    "error",
                ),
                vec![lit("Error when rendering the minicart")],
            ))
        };

        assert!(check_default(vec![
            var("Console", require(CONSOLE_PATH)),
            chained("checkout.minicart.rendering"),
        ])
        .is_empty());

        let violations = check_default(vec![
            var("Console", require(CONSOLE_PATH)),
            chained("invalid.minicart.rendering"),
        ]);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_other_accessor_is_ignored() {
        let violations = check_default(vec![
            var("Console", require(CONSOLE_PATH)),
            stmt(call(member(ident("Console"), "set"), vec![lit("invalid")])),
        ]);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_non_literal_namespace_is_ignored() {
        let violations = check_default(vec![
            var("Console", require(CONSOLE_PATH)),
            stmt(call(member(ident("Console"), "get"), vec![ident("ns")])),
            stmt(call(member(ident("Console"), "get"), vec![])),
        ]);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_declarator_without_initializer_is_ignored() {
        let body = vec![Stmt::VariableDeclaration(VariableDeclaration {
            kind: DeclarationKind::Var,
            declarations: vec![VariableDeclarator {
                id: Binding::Identifier(Identifier {
                    name: "Console".to_string(),
                    span: Span::default(),
                }),
                init: None,
                span: Span::default(),
            }],
            span: Span::default(),
        })];
        assert!(check_default(body).is_empty());
    }

    #[test]
    fn test_binding_does_not_leak_between_files() {
        let rule = ConsoleNamespace::new();
        let use_binding = || stmt(call(member(ident("Console"), "get"), vec![lit("invalid")]));

        let first = check(&rule, vec![var("Console", require(CONSOLE_PATH)), use_binding()]);
        assert_eq!(first.len(), 1);

        let second = check(&rule, vec![use_binding()]);
        assert!(second.is_empty());
    }

    #[test]
    fn test_custom_allow_list_and_accessor() {
        let rule = ConsoleNamespace::new()
            .allowed(AllowList::new(["orders"]))
            .accessor("getLogger")
            .factory_path("logging/Factory");

        let violations = check(
            &rule,
            vec![
                var("Factory", require("./logging/Factory")),
                stmt(call(member(ident("Factory"), "getLogger"), vec![lit("orders.sync")])),
                stmt(call(member(ident("Factory"), "getLogger"), vec![lit("checkout")])),
            ],
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Console.getLogger()"));
        assert!(violations[0].message.ends_with("one of: orders"));
    }

    #[test]
    fn test_message_lists_allowed_namespaces() {
        let violations = check_default(vec![var(
            "console",
            call(member(require(CONSOLE_PATH), "get"), vec![lit("invalid.minicart")]),
        )]);
        insta::assert_snapshot!(
            violations[0].message,
            @r#""invalid" is not an allowed namespace. Console.get() must be called with a namespace starting with one of: account, pdp, plp, content, checkout, jobs, adyen, globalcollect, klarna, sds, mailchimp, marked, marketingcloud, paris, zendesk, multipage"#
        );
        assert!(violations[0].suggestion.is_some());
    }

    #[test]
    fn test_allow_list_json() {
        let list = AllowList::from_json_str(r#"["account", "pdp"]"#).unwrap();
        assert!(list.contains("pdp"));
        assert!(!list.contains("plp"));
        assert_eq!(list.to_string(), "account, pdp");

        let err = AllowList::from_json_str(r#"{"account": true}"#).unwrap_err();
        assert!(matches!(err, RuleSetupError::AllowListParse { .. }));
    }

    #[test]
    fn test_allow_list_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("namespaces.json");
        std::fs::write(&path, r#"["jobs"]"#).unwrap();
        let list = AllowList::from_json_file(&path).unwrap();
        assert_eq!(list.names(), ["jobs".to_string()]);

        let missing = AllowList::from_json_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, RuleSetupError::Io { .. }));
    }
}
