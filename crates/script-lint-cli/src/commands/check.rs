//! Check command implementation.

use anyhow::{Context, Result};
use script_lint_core::{Analyzer, Config, RuleBox};
use script_lint_rules::rules_from_config;
use script_lint_ts::JavaScriptParser;
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Flags of the check command.
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule names or codes to run.
    pub rules: Option<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
    /// Whether files with syntax errors are linted anyway.
    pub recover_errors: bool,
}

/// Runs the check command.
pub fn run(path: &Path, options: &CheckOptions, source: &ConfigSource) -> Result<()> {
    let config = load_config(source)?;

    // Relative option paths resolve against the config file's directory.
    let base_dir = source
        .path()
        .and_then(Path::parent)
        .unwrap_or(path)
        .to_path_buf();
    let rules = rules_from_config(&config, &base_dir).context("Invalid rule configuration")?;
    let rules = match &options.rules {
        Some(filter) => {
            let names: Vec<&str> = filter.split(',').map(str::trim).collect();
            filter_rules(rules, &names)
        }
        None => rules,
    };

    let mut builder = Analyzer::builder()
        .root(path)
        .config(config)
        .parser(JavaScriptParser::new().recover_errors(options.recover_errors));

    for pattern in &options.exclude {
        builder = builder.exclude(pattern.clone());
    }

    for rule in rules {
        builder = builder.rule_box(rule);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!("Analyzing {:?} with {} rules", path, analyzer.rule_count());

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, options.format, analyzer.root())?;

    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(source: &ConfigSource) -> Result<Config> {
    match source {
        ConfigSource::Default => Ok(Config::default()),
        other => {
            // Invariant: non-Default variants always have a path
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                tracing::info!("Using global config: {}", p.display());
            }
            Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))
        }
    }
}

/// Keeps the rules whose name or code is listed.
fn filter_rules(rules: Vec<RuleBox>, names: &[&str]) -> Vec<RuleBox> {
    for name in names {
        if !rules.iter().any(|r| r.name() == *name || r.code() == *name) {
            tracing::warn!("Unknown rule: {}", name);
        }
    }

    rules
        .into_iter()
        .filter(|r| names.contains(&r.name()) || names.contains(&r.code()))
        .collect()
}
