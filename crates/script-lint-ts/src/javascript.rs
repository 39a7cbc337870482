//! JavaScript front-end using Tree-sitter.
//!
//! Parses source text with `tree-sitter-javascript` and lowers the concrete
//! syntax tree into the [`script_lint_core::ast`] model. Node kinds without
//! a dedicated variant become [`OtherNode`]s that keep their named children,
//! so nothing nested inside them is hidden from rules.
//!
//! Nesting deeper than [`MAX_DEPTH`] is cut off: the node at the limit is
//! kept as a childless [`OtherNode`], which keeps lowering, traversal and
//! drop within a bounded stack.

use script_lint_core::ast::{
    AssignmentExpr, Binding, CallExpr, Child, DeclarationKind, Expr, ExpressionStatement,
    Identifier, Literal, LiteralValue, MemberExpr, OtherNode, Program, Span, Stmt,
    VariableDeclaration, VariableDeclarator,
};
use script_lint_core::{ParseError, SourceParser};
use std::cell::Cell;
use tracing::debug;
use tree_sitter::{Language, Node, Parser};

/// Deepest expression or unmodelled node that is lowered with children.
pub const MAX_DEPTH: usize = 256;

/// Parses `.js`-family sources into a [`Program`].
pub struct JavaScriptParser {
    language: Language,
    recover_errors: bool,
}

impl JavaScriptParser {
    /// Creates a new JavaScript parser that rejects sources with syntax errors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_javascript::LANGUAGE.into(),
            recover_errors: false,
        }
    }

    /// When enabled, sources with syntax errors are lowered anyway; the
    /// erroneous regions appear as `ERROR` nodes.
    #[must_use]
    pub fn recover_errors(mut self, recover: bool) -> Self {
        self.recover_errors = recover;
        self
    }
}

impl Default for JavaScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for JavaScriptParser {
    fn language_id(&self) -> &'static str {
        "javascript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".js", ".mjs", ".cjs", ".jsx", ".ds"]
    }

    fn parse(&self, source: &str) -> Result<Program, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseError::Setup(e.to_string()))?;

        let src = source.as_bytes();
        let tree = parser.parse(src, None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();

        if root.has_error() {
            let at = first_error(root).unwrap_or(root);
            let span = span(&at);
            if !self.recover_errors {
                return Err(ParseError::Syntax {
                    line: span.line,
                    column: span.column,
                });
            }
            debug!("Recovering from syntax error at {}:{}", span.line, span.column);
        }

        let lowering = Lowering::new(src);
        let program = lowering.program(root);
        if lowering.truncated.get() {
            debug!("Nesting deeper than {MAX_DEPTH} levels was not lowered");
        }
        Ok(program)
    }
}

/// Finds the first error or missing node in document order.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            pending.extend(children.into_iter().rev());
        }
    }
    None
}

fn span(node: &Node<'_>) -> Span {
    let start = node.start_position();
    Span::new(
        start.row + 1,
        start.column + 1,
        node.start_byte(),
        node.end_byte(),
    )
}

/// Statement-like node kinds; anything else nested in an unmodelled node is
/// lowered as an expression.
fn is_statement_kind(kind: &str) -> bool {
    kind.ends_with("_statement") || kind.ends_with("_declaration") || kind == "statement_block"
}

struct Lowering<'src> {
    src: &'src [u8],
    depth: Cell<usize>,
    truncated: Cell<bool>,
}

impl<'src> Lowering<'src> {
    fn new(src: &'src [u8]) -> Self {
        Self {
            src,
            depth: Cell::new(0),
            truncated: Cell::new(false),
        }
    }

    /// Runs `lower` one level deeper, or returns `None` at the depth limit.
    fn nested<T>(&self, lower: impl FnOnce() -> T) -> Option<T> {
        let depth = self.depth.get();
        if depth >= MAX_DEPTH {
            self.truncated.set(true);
            return None;
        }
        self.depth.set(depth + 1);
        let lowered = lower();
        self.depth.set(depth);
        Some(lowered)
    }

    /// Placeholder for a node past the depth limit.
    fn cut_off(node: Node<'_>) -> OtherNode {
        OtherNode {
            kind: node.kind().to_string(),
            children: Vec::new(),
            span: span(&node),
        }
    }

    fn text(&self, node: &Node<'_>) -> &str {
        node.utf8_text(self.src).unwrap_or("")
    }

    /// Named children excluding comments.
    fn children<'tree>(node: &Node<'tree>) -> Vec<Node<'tree>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|c| !c.is_extra())
            .collect()
    }

    fn program(&self, root: Node<'_>) -> Program {
        Program {
            body: Self::children(&root)
                .into_iter()
                .map(|c| self.stmt(c))
                .collect(),
            span: span(&root),
        }
    }

    fn stmt(&self, node: Node<'_>) -> Stmt {
        match node.kind() {
            "expression_statement" => match Self::children(&node).into_iter().next() {
                Some(expr) => Stmt::Expression(ExpressionStatement {
                    expression: self.expr(expr),
                    span: span(&node),
                }),
                None => Stmt::Other(self.other(node)),
            },
            "variable_declaration" | "lexical_declaration" => {
                Stmt::VariableDeclaration(self.declaration(node))
            }
            _ => Stmt::Other(self.other(node)),
        }
    }

    fn declaration(&self, node: Node<'_>) -> VariableDeclaration {
        let keyword = node
            .child_by_field_name("kind")
            .or_else(|| node.children(&mut node.walk()).next())
            .map_or("var", |k| self.text(&k));
        let kind = match keyword {
            "let" => DeclarationKind::Let,
            "const" => DeclarationKind::Const,
            _ => DeclarationKind::Var,
        };

        VariableDeclaration {
            kind,
            declarations: Self::children(&node)
                .into_iter()
                .filter(|c| c.kind() == "variable_declarator")
                .map(|c| self.declarator(c))
                .collect(),
            span: span(&node),
        }
    }

    fn declarator(&self, node: Node<'_>) -> VariableDeclarator {
        let id = match node.child_by_field_name("name") {
            Some(name) if name.kind() == "identifier" => Binding::Identifier(self.identifier(name)),
            Some(pattern) => Binding::Pattern(span(&pattern)),
            None => Binding::Pattern(span(&node)),
        };

        VariableDeclarator {
            id,
            init: node.child_by_field_name("value").map(|v| self.expr(v)),
            span: span(&node),
        }
    }

    fn identifier(&self, node: Node<'_>) -> Identifier {
        Identifier {
            name: self.text(&node).to_string(),
            span: span(&node),
        }
    }

    fn expr(&self, node: Node<'_>) -> Expr {
        self.nested(|| self.expr_inner(node))
            .unwrap_or_else(|| Expr::Other(Self::cut_off(node)))
    }

    fn expr_inner(&self, node: Node<'_>) -> Expr {
        let lowered = match node.kind() {
            "identifier"
            | "property_identifier"
            | "private_property_identifier"
            | "shorthand_property_identifier" => Some(Expr::Identifier(self.identifier(node))),
            "string" => Some(self.literal(node, LiteralValue::String(self.string_value(node)))),
            "number" => parse_number(self.text(&node))
                .map(|n| self.literal(node, LiteralValue::Number(n))),
            "true" => Some(self.literal(node, LiteralValue::Boolean(true))),
            "false" => Some(self.literal(node, LiteralValue::Boolean(false))),
            "null" => Some(self.literal(node, LiteralValue::Null)),
            "regex" => Some(self.literal(node, LiteralValue::Regex(self.text(&node).to_string()))),
            "parenthesized_expression" => Self::children(&node)
                .into_iter()
                .next()
                .map(|inner| self.expr(inner)),
            "call_expression" => self.call(node),
            "member_expression" => self.member(node, "property", false),
            "subscript_expression" => self.member(node, "index", true),
            "assignment_expression" => self.assignment(node, "="),
            "augmented_assignment_expression" => {
                let operator = node
                    .child_by_field_name("operator")
                    .map_or("", |op| self.text(&op))
                    .to_string();
                self.assignment(node, &operator)
            }
            _ => None,
        };

        lowered.unwrap_or_else(|| Expr::Other(self.other(node)))
    }

    fn literal(&self, node: Node<'_>, value: LiteralValue) -> Expr {
        Expr::Literal(Literal {
            value,
            raw: self.text(&node).to_string(),
            span: span(&node),
        })
    }

    fn call(&self, node: Node<'_>) -> Option<Expr> {
        let function = node.child_by_field_name("function")?;
        let arguments = node.child_by_field_name("arguments")?;
        // Tagged templates carry a template string instead of an argument list.
        if arguments.kind() != "arguments" {
            return None;
        }

        Some(Expr::Call(CallExpr {
            callee: Box::new(self.expr(function)),
            arguments: Self::children(&arguments)
                .into_iter()
                .map(|a| self.expr(a))
                .collect(),
            span: span(&node),
        }))
    }

    fn member(&self, node: Node<'_>, property_field: &str, computed: bool) -> Option<Expr> {
        let object = node.child_by_field_name("object")?;
        let property = node.child_by_field_name(property_field)?;

        Some(Expr::Member(MemberExpr {
            object: Box::new(self.expr(object)),
            property: Box::new(self.expr(property)),
            computed,
            span: span(&node),
        }))
    }

    fn assignment(&self, node: Node<'_>, operator: &str) -> Option<Expr> {
        let left = node.child_by_field_name("left")?;
        let right = node.child_by_field_name("right")?;

        Some(Expr::Assignment(AssignmentExpr {
            operator: operator.to_string(),
            left: Box::new(self.expr(left)),
            right: Box::new(self.expr(right)),
            span: span(&node),
        }))
    }

    fn other(&self, node: Node<'_>) -> OtherNode {
        self.nested(|| self.other_inner(node))
            .unwrap_or_else(|| Self::cut_off(node))
    }

    fn other_inner(&self, node: Node<'_>) -> OtherNode {
        OtherNode {
            kind: node.kind().to_string(),
            children: Self::children(&node)
                .into_iter()
                .map(|c| {
                    if is_statement_kind(c.kind()) {
                        Child::Stmt(self.stmt(c))
                    } else {
                        Child::Expr(self.expr(c))
                    }
                })
                .collect(),
            span: span(&node),
        }
    }

    /// Decodes the contents of a `string` node.
    fn string_value(&self, node: Node<'_>) -> String {
        let mut value = String::new();
        for part in Self::children(&node) {
            match part.kind() {
                "string_fragment" => value.push_str(self.text(&part)),
                "escape_sequence" => decode_escape(self.text(&part), &mut value),
                _ => {}
            }
        }
        value
    }
}

fn decode_escape(sequence: &str, out: &mut String) {
    let body = sequence.strip_prefix('\\').unwrap_or(sequence);
    let simple = match body {
        "n" => Some('\n'),
        "t" => Some('\t'),
        "r" => Some('\r'),
        "b" => Some('\u{8}'),
        "f" => Some('\u{c}'),
        "v" => Some('\u{b}'),
        "0" => Some('\0'),
        _ => None,
    };
    if let Some(c) = simple {
        out.push(c);
        return;
    }

    let hex = body
        .strip_prefix("u{")
        .and_then(|h| h.strip_suffix('}'))
        .or_else(|| body.strip_prefix('u'))
        .or_else(|| body.strip_prefix('x'));
    if let Some(c) = hex
        .and_then(|h| u32::from_str_radix(h, 16).ok())
        .and_then(char::from_u32)
    {
        out.push(c);
        return;
    }

    // Line continuations produce nothing; `\'`, `\\` and friends are literal.
    if !body.starts_with(['\n', '\r']) {
        out.push_str(body);
    }
}

#[allow(clippy::cast_precision_loss)]
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let cleaned = cleaned.strip_suffix('n').unwrap_or(&cleaned);

    let radix = match cleaned.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    match radix {
        Some(radix) => u64::from_str_radix(&cleaned[2..], radix)
            .ok()
            .map(|n| n as f64),
        None => cleaned.parse().ok(),
    }
}
