//! Pre-order traversal of the syntax tree.
//!
//! Mirrors the shape of `syn::visit`: each node kind has an overridable
//! method on [`Visit`] and a free function of the same name performing the
//! default descent. An override that still wants the children visited calls
//! the free function:
//!
//! ```ignore
//! impl<'ast> Visit<'ast> for MyVisitor {
//!     fn visit_member_expr(&mut self, node: &'ast MemberExpr) {
//!         self.inspect(node);
//!         visit::visit_member_expr(self, node);
//!     }
//! }
//! ```
//!
//! Nodes are visited once each, in document order.

use crate::ast::{
    AssignmentExpr, CallExpr, Child, Expr, ExpressionStatement, Identifier, Literal, MemberExpr,
    OtherNode, Program, Stmt, VariableDeclaration, VariableDeclarator,
};

/// Syntax tree visitor.
pub trait Visit<'ast> {
    /// Visits the file root.
    fn visit_program(&mut self, node: &'ast Program) {
        visit_program(self, node);
    }

    /// Visits any statement.
    fn visit_stmt(&mut self, node: &'ast Stmt) {
        visit_stmt(self, node);
    }

    /// Visits a variable declaration statement.
    fn visit_variable_declaration(&mut self, node: &'ast VariableDeclaration) {
        visit_variable_declaration(self, node);
    }

    /// Visits one declarator of a declaration.
    fn visit_variable_declarator(&mut self, node: &'ast VariableDeclarator) {
        visit_variable_declarator(self, node);
    }

    /// Visits an expression statement.
    fn visit_expression_statement(&mut self, node: &'ast ExpressionStatement) {
        visit_expression_statement(self, node);
    }

    /// Visits any expression.
    fn visit_expr(&mut self, node: &'ast Expr) {
        visit_expr(self, node);
    }

    /// Visits a call expression.
    fn visit_call_expr(&mut self, node: &'ast CallExpr) {
        visit_call_expr(self, node);
    }

    /// Visits a member access.
    fn visit_member_expr(&mut self, node: &'ast MemberExpr) {
        visit_member_expr(self, node);
    }

    /// Visits an assignment.
    fn visit_assignment_expr(&mut self, node: &'ast AssignmentExpr) {
        visit_assignment_expr(self, node);
    }

    /// Visits an identifier.
    fn visit_identifier(&mut self, _node: &'ast Identifier) {}

    /// Visits a literal.
    fn visit_literal(&mut self, _node: &'ast Literal) {}

    /// Visits a node of an unmodelled kind.
    fn visit_other(&mut self, node: &'ast OtherNode) {
        visit_other(self, node);
    }
}

/// Default descent for [`Visit::visit_program`].
pub fn visit_program<'ast, V>(v: &mut V, node: &'ast Program)
where
    V: Visit<'ast> + ?Sized,
{
    for stmt in &node.body {
        v.visit_stmt(stmt);
    }
}

/// Default descent for [`Visit::visit_stmt`].
pub fn visit_stmt<'ast, V>(v: &mut V, node: &'ast Stmt)
where
    V: Visit<'ast> + ?Sized,
{
    match node {
        Stmt::VariableDeclaration(decl) => v.visit_variable_declaration(decl),
        Stmt::Expression(stmt) => v.visit_expression_statement(stmt),
        Stmt::Other(other) => v.visit_other(other),
    }
}

/// Default descent for [`Visit::visit_variable_declaration`].
pub fn visit_variable_declaration<'ast, V>(v: &mut V, node: &'ast VariableDeclaration)
where
    V: Visit<'ast> + ?Sized,
{
    for declarator in &node.declarations {
        v.visit_variable_declarator(declarator);
    }
}

/// Default descent for [`Visit::visit_variable_declarator`].
pub fn visit_variable_declarator<'ast, V>(v: &mut V, node: &'ast VariableDeclarator)
where
    V: Visit<'ast> + ?Sized,
{
    if let crate::ast::Binding::Identifier(id) = &node.id {
        v.visit_identifier(id);
    }
    if let Some(init) = &node.init {
        v.visit_expr(init);
    }
}

/// Default descent for [`Visit::visit_expression_statement`].
pub fn visit_expression_statement<'ast, V>(v: &mut V, node: &'ast ExpressionStatement)
where
    V: Visit<'ast> + ?Sized,
{
    v.visit_expr(&node.expression);
}

/// Default descent for [`Visit::visit_expr`].
pub fn visit_expr<'ast, V>(v: &mut V, node: &'ast Expr)
where
    V: Visit<'ast> + ?Sized,
{
    match node {
        Expr::Identifier(id) => v.visit_identifier(id),
        Expr::Literal(lit) => v.visit_literal(lit),
        Expr::Call(call) => v.visit_call_expr(call),
        Expr::Member(member) => v.visit_member_expr(member),
        Expr::Assignment(assign) => v.visit_assignment_expr(assign),
        Expr::Other(other) => v.visit_other(other),
    }
}

/// Default descent for [`Visit::visit_call_expr`].
pub fn visit_call_expr<'ast, V>(v: &mut V, node: &'ast CallExpr)
where
    V: Visit<'ast> + ?Sized,
{
    v.visit_expr(&node.callee);
    for arg in &node.arguments {
        v.visit_expr(arg);
    }
}

/// Default descent for [`Visit::visit_member_expr`].
pub fn visit_member_expr<'ast, V>(v: &mut V, node: &'ast MemberExpr)
where
    V: Visit<'ast> + ?Sized,
{
    v.visit_expr(&node.object);
    v.visit_expr(&node.property);
}

/// Default descent for [`Visit::visit_assignment_expr`].
pub fn visit_assignment_expr<'ast, V>(v: &mut V, node: &'ast AssignmentExpr)
where
    V: Visit<'ast> + ?Sized,
{
    v.visit_expr(&node.left);
    v.visit_expr(&node.right);
}

/// Default descent for [`Visit::visit_other`].
pub fn visit_other<'ast, V>(v: &mut V, node: &'ast OtherNode)
where
    V: Visit<'ast> + ?Sized,
{
    for child in &node.children {
        match child {
            Child::Stmt(stmt) => v.visit_stmt(stmt),
            Child::Expr(expr) => v.visit_expr(expr),
        }
    }
}
