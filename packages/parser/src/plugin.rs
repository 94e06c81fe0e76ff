//! Plugin file parser.
//!
//! Plugin files are declarative registration lists, one variant per
//! statement:
//!
//! ```text
//! @variant hocus (&:hover, &:focus);
//! @variant dark (@media (prefers-color-scheme: dark));
//! ```
//!
//! A payload starting with `@` registers a media/container/supports
//! condition; anything else is a comma-separated selector list with OR
//! semantics (each selector gets its own copy of the wrapped rule).

use crate::error::{ParseError, ParseResult};

#[derive(Debug, Clone, PartialEq)]
pub enum PluginPayload {
    /// Selector templates containing `&`, OR-combined
    Selectors(Vec<String>),

    /// A full at-rule prelude, e.g. `@media (prefers-color-scheme: dark)`
    Condition(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PluginRegistration {
    pub name: String,
    pub payload: PluginPayload,
}

/// Parse a plugin file into its registration list, in declaration order.
pub fn parse_plugin(source: &str) -> ParseResult<Vec<PluginRegistration>> {
    let mut registrations = Vec::new();
    let mut pos = 0usize;

    loop {
        let rest = skip_trivia(source, &mut pos);
        if rest.is_empty() {
            break;
        }

        let rest = rest.strip_prefix("@variant").ok_or_else(|| {
            ParseError::invalid_directive(pos, "expected `@variant name (payload);`")
        })?;
        pos = source.len() - rest.len();

        let rest = skip_trivia(source, &mut pos);
        let name: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        if name.is_empty() {
            return Err(ParseError::invalid_directive(pos, "expected variant name"));
        }
        pos += name.len();

        let rest = skip_trivia(source, &mut pos);
        if !rest.starts_with('(') {
            return Err(ParseError::invalid_directive(pos, "expected '('"));
        }
        pos += 1;

        let payload_text = read_balanced(source, &mut pos)?;
        let payload = if payload_text.starts_with('@') {
            PluginPayload::Condition(payload_text)
        } else {
            let selectors: Vec<String> = split_selectors(&payload_text);
            if selectors.is_empty() {
                return Err(ParseError::invalid_directive(pos, "empty selector list"));
            }
            PluginPayload::Selectors(selectors)
        };

        let rest = skip_trivia(source, &mut pos);
        if !rest.starts_with(';') {
            return Err(ParseError::invalid_directive(pos, "expected ';'"));
        }
        pos += 1;

        registrations.push(PluginRegistration { name, payload });
    }

    Ok(registrations)
}

/// Skip whitespace and comments, returning the remaining text
fn skip_trivia<'a>(source: &'a str, pos: &mut usize) -> &'a str {
    loop {
        let trimmed = source[*pos..].trim_start();
        *pos = source.len() - trimmed.len();
        if let Some(after) = trimmed.strip_prefix("/*") {
            match after.find("*/") {
                Some(end) => *pos = source.len() - after.len() + end + 2,
                None => *pos = source.len(),
            }
        } else {
            return &source[*pos..];
        }
    }
}

/// Read payload text up to the parenthesis that balances the one already
/// consumed. Nested parentheses (media conditions, functions) stay intact.
fn read_balanced(source: &str, pos: &mut usize) -> ParseResult<String> {
    let start = *pos;
    let mut depth = 1usize;

    for (idx, ch) in source[start..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    *pos = start + idx + 1;
                    return Ok(source[start..start + idx].trim().to_string());
                }
            }
            _ => {}
        }
    }

    Err(ParseError::unbalanced(start, ')'))
}

/// Split a selector list on commas outside parentheses/brackets
fn split_selectors(text: &str) -> Vec<String> {
    let mut selectors = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;

    for (idx, ch) in text.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                let sel = text[start..idx].trim();
                if !sel.is_empty() {
                    selectors.push(sel.to_string());
                }
                start = idx + 1;
            }
            _ => {}
        }
    }
    let sel = text[start..].trim();
    if !sel.is_empty() {
        selectors.push(sel.to_string());
    }

    selectors
}
