//! Stylesheet assembly.
//!
//! Takes the entry file's flattened node stream (imports already inlined in
//! declaration order), the merged theme store, and the full generated-rule
//! sequence, and prints the final output text. The output is a pure
//! function of its inputs: re-running on unchanged inputs reproduces the
//! same bytes.

use crate::resolver::GeneratedRule;
use crate::theme::ThemeStore;
use std::collections::HashSet;
use zephyr_parser::Node;

/// Assemble the final stylesheet text.
///
/// - verbatim nodes pass through unchanged, in position;
/// - theme custom properties are emitted once, as a single `:root` block at
///   the position of the first `@theme` block, no matter how many files
///   declared one;
/// - generated rules are inserted at the first `@utilities` directive,
///   deduplicated on selector+body+conditions (first occurrence wins);
/// - `@source` / `@config` / `@plugin` directives leave no trace in output.
pub fn assemble(nodes: &[Node], theme: &ThemeStore, rules: &[GeneratedRule]) -> String {
    let mut out = String::new();
    let mut theme_emitted = false;
    let mut utilities_emitted = false;

    for node in nodes {
        match node {
            Node::Theme { .. } => {
                if !theme_emitted && !theme.is_empty() {
                    print_theme(&mut out, theme);
                    theme_emitted = true;
                }
            }
            Node::Utilities => {
                if !utilities_emitted {
                    print_rules(&mut out, rules);
                    utilities_emitted = true;
                }
            }
            Node::Verbatim { css } => {
                if !css.is_empty() {
                    out.push_str(css);
                    out.push('\n');
                }
            }
            // Imports are inlined before assembly; the remaining directives
            // configure the build and emit nothing.
            Node::Import { .. } | Node::Source { .. } | Node::Config { .. } | Node::Plugin { .. } => {}
        }
    }

    out
}

fn print_theme(out: &mut String, theme: &ThemeStore) {
    out.push_str(":root {\n");
    for (name, value) in theme.iter() {
        out.push_str("  ");
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(";\n");
    }
    out.push_str("}\n");
}

fn print_rules(out: &mut String, rules: &[GeneratedRule]) {
    let mut seen: HashSet<(&str, &[(String, String)], &[String])> = HashSet::new();

    for rule in rules {
        let key = (
            rule.selector.as_str(),
            rule.body.as_slice(),
            rule.conditions.as_slice(),
        );
        if !seen.insert(key) {
            continue;
        }
        print_rule(out, rule);
    }
}

fn print_rule(out: &mut String, rule: &GeneratedRule) {
    let depth = rule.conditions.len();

    for (level, condition) in rule.conditions.iter().enumerate() {
        indent(out, level);
        out.push_str(condition);
        out.push_str(" {\n");
    }

    indent(out, depth);
    out.push_str(&rule.selector);
    out.push_str(" {\n");
    for (property, value) in &rule.body {
        indent(out, depth + 1);
        out.push_str(property);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(";\n");
    }
    indent(out, depth);
    out.push_str("}\n");

    for level in (0..depth).rev() {
        indent(out, level);
        out.push_str("}\n");
    }
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}
