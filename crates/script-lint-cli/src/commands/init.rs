//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# script-lint configuration

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./cartridges"

# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/static/**",
]

# Respect .gitignore files
respect_gitignore = true

# Abort on the first file that fails to parse (default: skip it with a warning)
# fail_on_parse_error = false

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.console-namespace]
enabled = true
# severity = "warning"  # Override default severity
# First segments accepted by Console.get(); defaults to the bundled list
# allowed_namespaces = ["account", "checkout", "pdp"]
# Or load them from a JSON array file, relative to this config
# allowed_namespaces_file = "console-namespaces.json"
# import_function = "require"
# factory_path = "monitoring/Console"
# accessor = "get"

[rules.no-chai-assert]
enabled = true
# module = "chai"
# property = "assert"
# replacement = "expect"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("script-lint.toml"), force)?;

    println!("Created script-lint.toml");
    println!("\nNext steps:");
    println!("  1. Edit script-lint.toml to configure rules");
    println!("  2. Run: script-lint check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}
