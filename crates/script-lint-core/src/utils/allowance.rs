//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! // script-lint: allow(console-namespace) reason="legacy cartridge"
//! var log = Console.get('legacy.checkout');
//! ```
//!
//! A directive applies to its own line and to the line below it. Block
//! comments (`/* script-lint: allow(...) */`) are accepted as well, which
//! also allows a directive trailing code on the same line.

use std::collections::HashSet;

/// Marker introducing a directive inside a comment.
const DIRECTIVE_PREFIX: &str = "script-lint:";

/// Result of checking for allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone)]
struct AllowDirective {
    rules: HashSet<String>,
    reason: Option<String>,
}

/// Checks source code for an allowance directive covering `line`.
///
/// # Arguments
///
/// * `content` - Source code content
/// * `line` - Line number of the violation (1-indexed)
/// * `rule_name` - Name of the rule to check for
#[must_use]
pub fn check_allow_with_reason(content: &str, line: usize, rule_name: &str) -> AllowCheck {
    let lines: Vec<&str> = content.lines().collect();

    for check_line in [line.saturating_sub(1), line] {
        if check_line == 0 || check_line > lines.len() {
            continue;
        }

        if let Some(directive) = parse_allow_directive(lines[check_line - 1]) {
            if directive.rules.contains(rule_name) || directive.rules.contains("all") {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    AllowCheck::Denied
}

/// Parses an allowance directive from a source line.
fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    let start = line.find(DIRECTIVE_PREFIX)?;
    let before = line[..start].trim_end();
    if !(before.ends_with("//") || before.ends_with("/*")) {
        return None;
    }

    let directive = line[start + DIRECTIVE_PREFIX.len()..].trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()));

    Some(AllowDirective { rules, reason })
}
