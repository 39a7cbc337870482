//! # script-lint-ts
//!
//! Tree-sitter based front-ends for script-lint.
//!
//! Front-ends implement [`script_lint_core::SourceParser`] and lower the
//! concrete syntax tree into the shared [`script_lint_core::ast`] model:
//!
//! - [`JavaScriptParser`] for `.js`, `.mjs`, `.cjs`, `.jsx` and `.ds` files

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod javascript;

pub use javascript::JavaScriptParser;
