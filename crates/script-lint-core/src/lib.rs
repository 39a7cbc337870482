//! # script-lint-core
//!
//! Core framework for linting JavaScript-family sources over a small,
//! closed syntax tree.
//!
//! This crate provides the foundational traits and types for building
//! script linters. It includes:
//!
//! - [`ast`] the syntax tree rules inspect
//! - [`visit::Visit`] for pre-order traversal in document order
//! - [`Rule`] trait for per-file rules
//! - [`SourceParser`] trait for pluggable front-ends
//! - [`Analyzer`] for orchestrating lint execution
//! - [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use script_lint_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./cartridges")
//!     .parser(JavaScriptParser::new())
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
pub mod ast;
mod config;
mod context;
mod parser;
mod rule;
mod types;
pub mod visit;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use ast::Program;
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::FileContext;
pub use parser::{ParseError, ParserBox, SourceParser};
pub use rule::{Rule, RuleBox};
pub use types::{LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic};
