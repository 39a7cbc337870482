//! List rules command implementation.

use script_lint_rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<10} {:<25} Description", "Code", "Name");
    println!("{}", "-".repeat(80));

    for rule in all_rules() {
        println!(
            "{:<10} {:<25} {}",
            rule.code(),
            rule.name(),
            rule.description()
        );
    }

    println!("\nAll rules run by default. Use --rules to run a subset, e.g.:");
    println!("  script-lint check --rules console-namespace");
    println!("  script-lint check --rules SL001,SL002");
    println!("\nConfigure rules in script-lint.toml (see `script-lint init`).");
}
