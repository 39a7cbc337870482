//! # script-lint-rules
//!
//! Built-in lint rules for script-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | SL001 | `console-namespace` | Restricts `Console.get()` namespaces to an allow-list |
//! | SL002 | `no-chai-assert` | Forbids `require("chai").assert` in favor of `expect` |
//!
//! ## Usage
//!
//! ```ignore
//! use script_lint_core::Analyzer;
//! use script_lint_rules::{ConsoleNamespace, NoChaiAssert};
//! use script_lint_ts::JavaScriptParser;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./cartridges")
//!     .parser(JavaScriptParser::new())
//!     .rule(ConsoleNamespace::new())
//!     .rule(NoChaiAssert::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod console_namespace;
mod configure;
pub mod no_chai_assert;

pub use configure::{all_rules, rules_from_config, RuleSetupError};
pub use console_namespace::{AllowList, ConsoleNamespace};
pub use no_chai_assert::NoChaiAssert;

/// Re-export core types for convenience.
pub use script_lint_core::{Rule, Severity, Violation};
