//! Core analyzer for orchestrating lint execution.

use crate::config::Config;
use crate::context::FileContext;
use crate::parser::{ParseError, ParserBox, SourceParser};
use crate::rule::{Rule, RuleBox};
use crate::types::{LintResult, Location, Severity, Suggestion, Violation};
use crate::utils::allowance::check_allow_with_reason;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error walking the project directory.
    #[error("Directory walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Error parsing a source file.
    #[error("Parse error in {path}: {source}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Front-end error.
        source: ParseError,
    },

    /// No registered parser handles the file.
    #[error("No parser registered for {0}")]
    UnsupportedFile(PathBuf),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    parsers: Vec<ParserBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: Option<bool>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Registers a front-end for the file extensions it handles.
    #[must_use]
    pub fn parser<P: SourceParser + 'static>(mut self, parser: P) -> Self {
        self.parsers.push(Box::new(parser));
        self
    }

    /// Adds an exclude glob pattern, matched against project-relative paths.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on parse errors (default: from config, else false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = Some(fail);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved or an
    /// exclude pattern is not a valid glob.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());

        let excludes = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let fail_on_parse_error = self
            .fail_on_parse_error
            .unwrap_or(config.analyzer.fail_on_parse_error);

        Ok(Analyzer {
            root,
            rules: self.rules,
            parsers: self.parsers,
            excludes,
            fail_on_parse_error,
            config,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    parsers: Vec<ParserBox>,
    excludes: Vec<glob::Pattern>,
    fail_on_parse_error: bool,
    config: Config,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Analyzes all files under the root and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery or reading fails, or if a file
    /// fails to parse while `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let mut result = LintResult::new();
        let files = self.discover_files()?;

        info!("Found {} files to analyze", files.len());

        for file_path in &files {
            match self.analyze_file(file_path) {
                Ok(violations) => {
                    result.violations.extend(violations);
                    result.files_checked += 1;
                }
                Err(AnalyzerError::Parse { path, source }) => {
                    warn!("Failed to parse {}: {}", path.display(), source);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Parse { path, source });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Analyzes a single file from disk.
    fn analyze_file(&self, path: &Path) -> Result<Vec<Violation>, AnalyzerError> {
        debug!("Analyzing: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        self.check_source(path, &content)
    }

    /// Runs every enabled rule over in-memory source text.
    ///
    /// `path` selects the front-end by extension and is reported relative to
    /// the analyzer root.
    ///
    /// # Errors
    ///
    /// Returns an error if no registered parser handles `path` or the source
    /// fails to parse.
    pub fn check_source(&self, path: &Path, content: &str) -> Result<Vec<Violation>, AnalyzerError> {
        let parser = self
            .parser_for(path)
            .ok_or_else(|| AnalyzerError::UnsupportedFile(path.to_path_buf()))?;

        let program = parser.parse(content).map_err(|source| AnalyzerError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let ctx = FileContext::new(path, content, &self.root);
        let mut violations = Vec::new();

        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let rule_violations = rule.check(&ctx, &program);
            let rule_violations = self.apply_severity_override(rule.name(), rule_violations);
            violations.extend(apply_allowances(&**rule, &ctx, rule_violations));
        }

        Ok(violations)
    }

    fn parser_for(&self, path: &Path) -> Option<&dyn SourceParser> {
        self.parsers
            .iter()
            .find(|p| p.handles(path))
            .map(|p| &**p)
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }

    /// Discovers all source files handled by a registered parser.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let respect_gitignore = self.config.analyzer.respect_gitignore;

        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .require_git(false)
            .git_ignore(respect_gitignore)
            .git_exclude(respect_gitignore)
            .ignore(respect_gitignore);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            if self.parser_for(path).is_none() {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative = relative.to_string_lossy();

        self.excludes.iter().any(|pattern| {
            if pattern.matches(&relative) {
                return true;
            }
            // "**/vendor/**" should also match a top-level "vendor/..."
            let normalized = pattern.as_str().replace("**/", "").replace("/**", "");
            !normalized.is_empty()
                && relative
                    .split(['/', '\\'])
                    .any(|component| component == normalized)
        })
    }
}

/// Drops violations covered by an allow directive.
///
/// A directive without a reason on a rule that requires one is replaced by a
/// warning pointing at the directive.
fn apply_allowances(
    rule: &dyn Rule,
    ctx: &FileContext<'_>,
    violations: Vec<Violation>,
) -> Vec<Violation> {
    violations
        .into_iter()
        .filter_map(|v| {
            let allow = check_allow_with_reason(ctx.content, v.location.line, rule.name());
            if !allow.is_allowed() {
                return Some(v);
            }
            if rule.requires_allow_reason() && allow.reason().is_none() {
                let location = Location::new(
                    v.location.file.clone(),
                    v.location.line,
                    v.location.column,
                );
                return Some(
                    Violation::new(
                        rule.code(),
                        rule.name(),
                        Severity::Warning,
                        location,
                        format!("Allow directive for '{}' is missing required reason", rule.name()),
                    )
                    .with_suggestion(Suggestion::new(
                        "Add reason=\"...\" to explain why this exception is necessary",
                    )),
                );
            }
            debug!(
                "Suppressed {} at {}:{}",
                rule.name(),
                v.location.file.display(),
                v.location.line
            );
            None
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Identifier, Program, Span, Stmt};
    use crate::visit::{self, Visit};
    use std::fs;
    use tempfile::TempDir;

    /// Front-end that turns every line `name` into an identifier statement.
    struct LineParser;

    impl SourceParser for LineParser {
        fn language_id(&self) -> &'static str {
            "lines"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &[".lines"]
        }

        fn parse(&self, source: &str) -> Result<Program, ParseError> {
            let mut body = Vec::new();
            let mut offset = 0;
            for (i, line) in source.lines().enumerate() {
                if line == "!" {
                    return Err(ParseError::Syntax {
                        line: i + 1,
                        column: 1,
                    });
                }
                let span = Span::new(i + 1, 1, offset, offset + line.len());
                body.push(Stmt::Expression(crate::ast::ExpressionStatement {
                    expression: crate::ast::Expr::Identifier(Identifier {
                        name: line.to_string(),
                        span,
                    }),
                    span,
                }));
                offset += line.len() + 1;
            }
            Ok(Program {
                body,
                span: Span::new(1, 1, 0, source.len()),
            })
        }
    }

    /// Flags every identifier named `bad`.
    struct NoBad;

    impl Rule for NoBad {
        fn name(&self) -> &'static str {
            "no-bad"
        }

        fn code(&self) -> &'static str {
            "TEST001"
        }

        fn check(&self, ctx: &FileContext, program: &Program) -> Vec<Violation> {
            struct V<'a> {
                ctx: &'a FileContext<'a>,
                out: Vec<Violation>,
            }
            impl<'ast> Visit<'ast> for V<'_> {
                fn visit_identifier(&mut self, node: &'ast Identifier) {
                    if node.name == "bad" {
                        self.out
                            .push(Violation::at(&NoBad, self.ctx, node.span, "bad identifier"));
                    }
                }
            }
            let mut v = V {
                ctx,
                out: Vec::new(),
            };
            visit::visit_program(&mut v, program);
            v.out
        }
    }

    fn analyzer(root: &Path, config: Config) -> Analyzer {
        Analyzer::builder()
            .root(root)
            .config(config)
            .parser(LineParser)
            .rule(NoBad)
            .build()
            .expect("Failed to build analyzer")
    }

    #[test]
    fn test_builder() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/dist/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.root().exists());
        assert_eq!(analyzer.rule_count(), 0);
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let result = Analyzer::builder().root(".").exclude("[").build();
        assert!(matches!(result, Err(AnalyzerError::Glob(_))));
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder()
            .root("/proj")
            .exclude("**/vendor/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.should_exclude(Path::new("/proj/node_modules/chai/index.js")));
        assert!(analyzer.should_exclude(Path::new("/proj/vendor/lib.js")));
        assert!(analyzer.should_exclude(Path::new("/proj/a/vendor/lib.js")));
        assert!(!analyzer.should_exclude(Path::new("/proj/src/vendors.js")));
        assert!(!analyzer.should_exclude(Path::new("/proj/src/app.js")));
    }

    #[test]
    fn test_analyze_discovers_and_sorts() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/b.lines"), "ok\nbad\n").unwrap();
        fs::write(tmp.path().join("src/a.lines"), "bad\n").unwrap();
        fs::write(tmp.path().join("src/ignored.txt"), "bad\n").unwrap();

        let result = analyzer(tmp.path(), Config::default()).analyze().unwrap();
        assert_eq!(result.files_checked, 2);
        assert_eq!(result.violations.len(), 2);
        assert_eq!(result.violations[0].location.file, Path::new("src/a.lines"));
        assert_eq!(result.violations[1].location.file, Path::new("src/b.lines"));
        assert_eq!(result.violations[1].location.line, 2);
    }

    #[test]
    fn test_parse_errors_skip_or_fail() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("broken.lines"), "bad\n!\n").unwrap();
        fs::write(tmp.path().join("fine.lines"), "bad\n").unwrap();

        let result = analyzer(tmp.path(), Config::default()).analyze().unwrap();
        assert_eq!(result.files_checked, 1);

        let mut config = Config::default();
        config.analyzer.fail_on_parse_error = true;
        let err = analyzer(tmp.path(), config).analyze().unwrap_err();
        assert!(matches!(err, AnalyzerError::Parse { .. }));
    }

    #[test]
    fn test_disabled_rule_and_severity_override() {
        let config = Config::parse("[rules.no-bad]\nseverity = \"info\"\n").unwrap();
        let violations = analyzer(Path::new("/proj"), config)
            .check_source(Path::new("/proj/x.lines"), "bad\n")
            .unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Info);

        let config = Config::parse("[rules.no-bad]\nenabled = false\n").unwrap();
        let violations = analyzer(Path::new("/proj"), config)
            .check_source(Path::new("/proj/x.lines"), "bad\n")
            .unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_unsupported_file() {
        let err = analyzer(Path::new("/proj"), Config::default())
            .check_source(Path::new("/proj/x.rb"), "bad\n")
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::UnsupportedFile(_)));
    }

    #[test]
    fn test_allow_directive_with_and_without_reason() {
        let a = analyzer(Path::new("/proj"), Config::default());

        let with_reason = "// script-lint: allow(no-bad) reason=\"fixture\"\nbad\n";
        let violations = a.check_source(Path::new("/proj/x.lines"), with_reason).unwrap();
        assert!(violations.is_empty());

        let without_reason = "// script-lint: allow(no-bad)\nbad\n";
        let violations = a
            .check_source(Path::new("/proj/x.lines"), without_reason)
            .unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Warning);
        assert!(violations[0].message.contains("missing required reason"));
    }
}
