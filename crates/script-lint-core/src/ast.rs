//! Syntax tree consumed by rules.
//!
//! The tree is a closed set of variants covering the node kinds rules care
//! about. Every other construct of the source language is kept as an
//! [`OtherNode`] so traversal still reaches the statements and expressions
//! nested inside it (function bodies, blocks, conditionals, ...).
//!
//! Front-ends (see the `script-lint-ts` crate) build this tree from source
//! text; rules only ever read it.


/// Source position of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in bytes).
    pub column: usize,
    /// Byte offset of the first byte of the node.
    pub start: usize,
    /// Byte offset one past the last byte of the node.
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub fn new(line: usize, column: usize, start: usize, end: usize) -> Self {
        Self {
            line,
            column,
            start,
            end,
        }
    }

    /// Length of the span in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span covers no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Root of a parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Top-level statements in document order.
    pub body: Vec<Stmt>,
    /// Span of the whole file.
    pub span: Span,
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `var a = ...`, `let a = ...`, `const a = ...`
    VariableDeclaration(VariableDeclaration),
    /// An expression followed by `;`.
    Expression(ExpressionStatement),
    /// Any other statement kind.
    Other(OtherNode),
}

impl Stmt {
    /// Span of this statement.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::VariableDeclaration(d) => d.span,
            Self::Expression(s) => s.span,
            Self::Other(o) => o.span,
        }
    }
}

/// Declaration keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// `var`
    Var,
    /// `let`
    Let,
    /// `const`
    Const,
}

/// A variable declaration statement with one or more declarators.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// Declaration keyword.
    pub kind: DeclarationKind,
    /// Declarators in source order.
    pub declarations: Vec<VariableDeclarator>,
    /// Span of the statement.
    pub span: Span,
}

/// A single `name = init` inside a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    /// Binding target.
    pub id: Binding,
    /// Initializer, if any.
    pub init: Option<Expr>,
    /// Span of the declarator.
    pub span: Span,
}

/// Target of a declarator.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// Plain identifier.
    Identifier(Identifier),
    /// Destructuring pattern; not inspected further.
    Pattern(Span),
}

impl Binding {
    /// Returns the bound name for a plain identifier binding.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Identifier(id) => Some(&id.name),
            Self::Pattern(_) => None,
        }
    }
}

/// An expression statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    /// The expression.
    pub expression: Expr,
    /// Span of the statement.
    pub span: Span,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `name`
    Identifier(Identifier),
    /// `"text"`, `42`, `true`, `null`, `/re/`
    Literal(Literal),
    /// `callee(args...)`
    Call(CallExpr),
    /// `object.property` or `object[property]`
    Member(MemberExpr),
    /// `left = right`, `left += right`, ...
    Assignment(AssignmentExpr),
    /// Any other expression kind.
    Other(OtherNode),
}

impl Expr {
    /// Span of this expression.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Identifier(i) => i.span,
            Self::Literal(l) => l.span,
            Self::Call(c) => c.span,
            Self::Member(m) => m.span,
            Self::Assignment(a) => a.span,
            Self::Other(o) => o.span,
        }
    }

    /// Returns the identifier name if this is a plain identifier.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(id) => Some(&id.name),
            _ => None,
        }
    }

    /// Returns the string value if this is a string literal.
    #[must_use]
    pub fn as_str_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(Literal {
                value: LiteralValue::String(s),
                ..
            }) => Some(s),
            _ => None,
        }
    }
}

/// An identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// Identifier text.
    pub name: String,
    /// Span of the identifier.
    pub span: Span,
}

/// A literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// Decoded value.
    pub value: LiteralValue,
    /// Source text including quotes.
    pub raw: String,
    /// Span of the literal.
    pub span: Span,
}

/// Decoded literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// String with escapes decoded.
    String(String),
    /// Numeric literal.
    Number(f64),
    /// `true` / `false`
    Boolean(bool),
    /// `null`
    Null,
    /// Regular expression, kept as source text.
    Regex(String),
}

/// A call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// Called expression.
    pub callee: Box<Expr>,
    /// Arguments in source order.
    pub arguments: Vec<Expr>,
    /// Span of the call.
    pub span: Span,
}

/// A member access.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    /// Accessed object.
    pub object: Box<Expr>,
    /// Property; an [`Expr::Identifier`] for `a.b`, any expression for `a[b]`.
    pub property: Box<Expr>,
    /// True for `a[b]`.
    pub computed: bool,
    /// Span of the access.
    pub span: Span,
}

impl MemberExpr {
    /// Returns the property name for non-computed access (`a.name`).
    #[must_use]
    pub fn property_name(&self) -> Option<&str> {
        if self.computed {
            return None;
        }
        self.property.as_identifier()
    }
}

/// An assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpr {
    /// Operator text (`=`, `+=`, ...).
    pub operator: String,
    /// Assignment target.
    pub left: Box<Expr>,
    /// Assigned value.
    pub right: Box<Expr>,
    /// Span of the assignment.
    pub span: Span,
}

/// A node of a kind not modelled explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherNode {
    /// Front-end specific kind name (e.g. `if_statement`).
    pub kind: String,
    /// Nested statements and expressions in document order.
    pub children: Vec<Child>,
    /// Span of the node.
    pub span: Span,
}

/// Child of an [`OtherNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    /// Nested statement.
    Stmt(Stmt),
    /// Nested expression.
    Expr(Expr),
}
