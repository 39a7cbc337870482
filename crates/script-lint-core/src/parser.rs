//! Front-end extension point.
//!
//! The analyzer does not parse source text itself. A [`SourceParser`]
//! turns text into a [`Program`]; implement it to teach the analyzer a new
//! language or dialect.

use crate::ast::Program;

/// Errors reported by a front-end.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The source contains a syntax error.
    #[error("syntax error at {line}:{column}")]
    Syntax {
        /// Line of the first error node (1-indexed).
        line: usize,
        /// Column of the first error node (1-indexed).
        column: usize,
    },

    /// The underlying parser could not be configured.
    #[error("parser setup failed: {0}")]
    Setup(String),

    /// The underlying parser returned no tree.
    #[error("parser produced no syntax tree")]
    NoTree,
}

/// Turns source text into a [`Program`].
pub trait SourceParser: Send + Sync {
    /// Language identifier (e.g. `"javascript"`).
    fn language_id(&self) -> &'static str;

    /// File extensions handled, including the dot (e.g. `&[".js"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Parses a whole file.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the source cannot be turned into a tree.
    fn parse(&self, source: &str) -> Result<Program, ParseError>;

    /// Returns true if `path` has one of [`Self::extensions`].
    fn handles(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().iter().any(|e| e.strip_prefix('.') == Some(ext)))
    }
}

/// Type alias for boxed parser trait objects.
pub type ParserBox = Box<dyn SourceParser>;
