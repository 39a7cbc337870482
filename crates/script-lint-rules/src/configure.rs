//! Building rule instances from configuration.

use crate::console_namespace::{self, AllowList, ConsoleNamespace};
use crate::no_chai_assert::{self, NoChaiAssert};
use script_lint_core::{Config, RuleBox, RuleConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while building rules from configuration.
#[derive(Debug, Error)]
pub enum RuleSetupError {
    /// A file referenced by a rule option could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// An allow-list is not a JSON array of strings.
    #[error("Invalid allow-list in {origin}: {source}")]
    AllowListParse {
        /// File path, or `<inline>`.
        origin: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A rule option has the wrong type or conflicts with another option.
    #[error("Invalid option `{key}` for rule '{rule}': {message}")]
    InvalidOption {
        /// Rule name.
        rule: &'static str,
        /// Option key.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Returns every built-in rule with default settings.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(ConsoleNamespace::new()),
        Box::new(NoChaiAssert::new()),
    ]
}

/// Builds every built-in rule, applying `[rules.<name>]` options.
///
/// Relative file paths in options are resolved against `base_dir`, usually
/// the directory of the configuration file.
///
/// # Errors
///
/// Returns an error if an option has the wrong type or a referenced
/// allow-list file cannot be loaded.
pub fn rules_from_config(config: &Config, base_dir: &Path) -> Result<Vec<RuleBox>, RuleSetupError> {
    Ok(vec![
        Box::new(console_namespace_from(
            config.rule(console_namespace::NAME),
            base_dir,
        )?),
        Box::new(no_chai_assert_from(config.rule(no_chai_assert::NAME))?),
    ])
}

fn console_namespace_from(
    options: Option<&RuleConfig>,
    base_dir: &Path,
) -> Result<ConsoleNamespace, RuleSetupError> {
    const RULE: &str = console_namespace::NAME;

    let mut rule = ConsoleNamespace::new();
    let Some(options) = options else {
        return Ok(rule);
    };

    let inline = string_array(options, RULE, "allowed_namespaces")?;
    let file = string(options, RULE, "allowed_namespaces_file")?;
    match (inline, file) {
        (Some(_), Some(_)) => {
            return Err(RuleSetupError::InvalidOption {
                rule: RULE,
                key: "allowed_namespaces_file",
                message: "cannot be combined with allowed_namespaces".to_string(),
            });
        }
        (Some(names), None) => rule = rule.allowed(AllowList::new(names)),
        (None, Some(file)) => {
            rule = rule.allowed(AllowList::from_json_file(&base_dir.join(file))?);
        }
        (None, None) => {}
    }

    if let Some(name) = string(options, RULE, "import_function")? {
        rule = rule.import_function(name);
    }
    if let Some(path) = string(options, RULE, "factory_path")? {
        rule = rule.factory_path(path);
    }
    if let Some(name) = string(options, RULE, "accessor")? {
        rule = rule.accessor(name);
    }
    if let Some(severity) = options.severity {
        rule = rule.severity(severity);
    }

    Ok(rule)
}

fn no_chai_assert_from(options: Option<&RuleConfig>) -> Result<NoChaiAssert, RuleSetupError> {
    const RULE: &str = no_chai_assert::NAME;

    let mut rule = NoChaiAssert::new();
    let Some(options) = options else {
        return Ok(rule);
    };

    if let Some(module) = string(options, RULE, "module")? {
        rule = rule.module(module);
    }
    if let Some(property) = string(options, RULE, "property")? {
        rule = rule.property(property);
    }
    if let Some(replacement) = string(options, RULE, "replacement")? {
        rule = rule.replacement(replacement);
    }
    if let Some(name) = string(options, RULE, "import_function")? {
        rule = rule.import_function(name);
    }
    if let Some(severity) = options.severity {
        rule = rule.severity(severity);
    }

    Ok(rule)
}

fn string(
    options: &RuleConfig,
    rule: &'static str,
    key: &'static str,
) -> Result<Option<String>, RuleSetupError> {
    if !options.has_option(key) {
        return Ok(None);
    }
    options
        .get_str(key)
        .map(|s| Some(s.to_string()))
        .ok_or_else(|| RuleSetupError::InvalidOption {
            rule,
            key,
            message: "expected a string".to_string(),
        })
}

fn string_array(
    options: &RuleConfig,
    rule: &'static str,
    key: &'static str,
) -> Result<Option<Vec<String>>, RuleSetupError> {
    if !options.has_option(key) {
        return Ok(None);
    }
    options
        .get_str_array(key)
        .map(Some)
        .ok_or_else(|| RuleSetupError::InvalidOption {
            rule,
            key,
            message: "expected an array of strings".to_string(),
        })
}
