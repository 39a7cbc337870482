//! Rules run end to end over parsed JavaScript.

use script_lint_core::{Analyzer, Config, FileContext, Rule, Severity, SourceParser, Violation};
use script_lint_rules::{all_rules, ConsoleNamespace, NoChaiAssert};
use script_lint_ts::JavaScriptParser;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn analyzer(root: &Path) -> Analyzer {
    let mut builder = Analyzer::builder()
        .root(root)
        .parser(JavaScriptParser::new());
    for rule in all_rules() {
        builder = builder.rule_box(rule);
    }
    builder.build().expect("Failed to build analyzer")
}

fn check(source: &str) -> Vec<Violation> {
    analyzer(Path::new("/proj"))
        .check_source(Path::new("/proj/cartridge/scripts/cart.js"), source)
        .expect("Failed to check source")
}

#[test]
fn console_shapes_in_one_file() {
    let violations = check(
        r"
var Console = require('/mod_core/cartridge/scripts/monitoring/Console.ds');
var Logger = Console.get('mailchimp.newsletter.addmember');
var Broken = Console.get('newsletter.addmember');
var widget = require('../monitoring/Console.ds').get('unknown.widget');
var unitTestsSrc = grunt.config.get('unitTestsSrc');

function render() {
    try {
        draw();
    } catch (ex) {
        Console.get('checkout.minicart.rendering', true).error('failed: ' + ex.message);
        Console.get('minicart.rendering', true).error('failed: ' + ex.message);
    }
}

console = require('/scripts/monitoring/Console.ds').get('cart.change-quantity');
other.get('checkout.x');
",
    );

    let lines: Vec<usize> = violations.iter().map(|v| v.location.line).collect();
    assert_eq!(lines, [4, 5, 13, 17]);
    assert!(violations.iter().all(|v| v.rule == "console-namespace"));
    assert!(violations[0].message.contains("\"newsletter\""));
    assert!(violations[1].message.contains("\"unknown\""));
    assert!(violations[2].message.contains("\"minicart\""));
    assert!(violations[3].message.contains("\"cart\""));
}

#[test]
fn multiple_declarators_are_checked_individually() {
    let violations = check(
        "var Console = require('../monitoring/Console.ds'), a = Console.get('pdp.tiles'), b = Console.get('tiles');\n",
    );
    assert_eq!(violations.len(), 1);
    assert!(violations[0].message.contains("\"tiles\""));
}

#[test]
fn chai_assert_is_reported() {
    let violations = check(
        r#"
var expect = require('chai').expect;
var assert = require("chai").assert;
var other = require('other').assert;
var nope = somethingElse('chai').assert;
"#,
    );
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].code, "SL002");
    assert_eq!(violations[0].message, "Use expect instead of assert");
    assert_eq!(violations[0].location.line, 3);
    assert_eq!(violations[0].location.column, 14);
}

#[test]
fn chai_assert_nested_in_call_arguments() {
    let violations = check("describe('cart', function () { use(require('chai').assert); });\n");
    assert_eq!(violations.len(), 1);
}

#[test]
fn allow_directive_suppresses_with_reason() {
    let violations = check(
        "// script-lint: allow(no-chai-assert) reason=\"legacy fixture\"\nvar assert = require('chai').assert;\n",
    );
    assert!(violations.is_empty());
}

#[test]
fn binding_does_not_leak_between_files() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("a.js"),
        "var Console = require('../monitoring/Console.ds');\nConsole.get('invalid.a');\n",
    )
    .unwrap();
    fs::write(tmp.path().join("b.ds"), "Console.get('invalid.b');\n").unwrap();

    let result = analyzer(tmp.path()).analyze().unwrap();
    assert_eq!(result.files_checked, 2);
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].location.file, Path::new("a.js"));
}

#[test]
fn configured_rules_and_severity_override() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("cart_test.js"),
        "var assert = require('chai').assert;\nvar log = require('../monitoring/Console.ds').get('orders.sync');\n",
    )
    .unwrap();

    let config = Config::parse(
        r#"
[rules.console-namespace]
allowed_namespaces = ["orders"]

[rules.no-chai-assert]
severity = "warning"
"#,
    )
    .unwrap();
    let rules = script_lint_rules::rules_from_config(&config, tmp.path()).unwrap();

    let mut builder = Analyzer::builder()
        .root(tmp.path())
        .config(config)
        .parser(JavaScriptParser::new());
    for rule in rules {
        builder = builder.rule_box(rule);
    }
    let result = builder.build().unwrap().analyze().unwrap();

    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].severity, Severity::Warning);
    assert!(!result.has_errors());
}

#[test]
fn rules_are_reusable_across_runs() {
    let rule = ConsoleNamespace::new();
    let program = JavaScriptParser::new()
        .parse("var C = require('../monitoring/Console.ds');\nC.get('invalid');\n")
        .unwrap();
    let ctx = FileContext::new(Path::new("a.js"), "", Path::new("."));

    let first = rule.check(&ctx, &program);
    let second = rule.check(&ctx, &program);
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert!(NoChaiAssert::new().check(&ctx, &program).is_empty());
}

#[test]
fn deeply_nested_file_does_not_stop_the_run() {
    let tmp = TempDir::new().unwrap();
    let terms = vec!["'x'"; 20_000].join(" + ");
    fs::write(
        tmp.path().join("long.js"),
        format!("var s = {terms};\nvar assert = require('chai').assert;\n"),
    )
    .unwrap();
    fs::write(
        tmp.path().join("other.js"),
        "var Console = require('../monitoring/Console.ds');\nConsole.get('invalid');\n",
    )
    .unwrap();

    let result = analyzer(tmp.path()).analyze().unwrap();
    assert_eq!(result.files_checked, 2);
    let found: Vec<(&Path, usize)> = result
        .violations
        .iter()
        .map(|v| (v.location.file.as_path(), v.location.line))
        .collect();
    assert_eq!(found, [(Path::new("long.js"), 2), (Path::new("other.js"), 2)]);
}

#[test]
fn later_import_replaces_tracked_binding() {
    let violations = check(
        r"var A = require('../monitoring/Console.ds');
var B = require('../monitoring/Console.ds');
var x = require('other');
A.get('invalid');
B.get('invalid');
",
    );
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].location.line, 5);
}
