//! Entry stylesheet structure reader.
//!
//! Reads the author's CSS entry file into a node stream: directives the
//! engine interprets (`@import`, `@source`, `@config`, `@plugin`, `@theme`,
//! `@utilities`) plus verbatim blocks of everything else. The verbatim text
//! is never re-tokenized; it flows through to the output unchanged.

use crate::error::{ParseError, ParseResult};

/// One top-level node of the entry stylesheet
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `@import "path";` is inlined depth-first at this position
    Import { path: String },

    /// `@source "glob";` adds a content root
    Source { glob: String },

    /// `@config "path";` references a JSON config file
    Config { path: String },

    /// `@plugin "path";` references a plugin registration file
    Plugin { path: String },

    /// `@theme { --name: value; ... }` design token overrides
    Theme { declarations: Vec<(String, String)> },

    /// `@utilities;` marks where generated rules are inserted
    Utilities,

    /// Author-written CSS, passed through verbatim
    Verbatim { css: String },
}

/// Parsed structure of one stylesheet file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylesheetDocument {
    pub nodes: Vec<Node>,
}

/// Parse a stylesheet's directive structure.
///
/// A structurally broken directive is a hard error (the entry file is a
/// required resource); unknown at-rules and plain rules pass through as
/// verbatim nodes.
pub fn parse_stylesheet(source: &str) -> ParseResult<StylesheetDocument> {
    let mut reader = Reader::new(source);
    let mut nodes = Vec::new();

    loop {
        reader.skip_trivia();
        if reader.is_at_end() {
            break;
        }

        if reader.rest().starts_with('@') {
            let directive = reader.peek_ident_after_at();
            match directive.as_str() {
                "import" => nodes.push(reader.parse_path_directive("import", |path| {
                    Node::Import { path }
                })?),
                "source" => nodes.push(reader.parse_path_directive("source", |glob| {
                    Node::Source { glob }
                })?),
                "config" => nodes.push(reader.parse_path_directive("config", |path| {
                    Node::Config { path }
                })?),
                "plugin" => nodes.push(reader.parse_path_directive("plugin", |path| {
                    Node::Plugin { path }
                })?),
                "theme" => nodes.push(reader.parse_theme()?),
                "utilities" => {
                    reader.parse_utilities()?;
                    nodes.push(Node::Utilities);
                }
                _ => nodes.push(reader.parse_verbatim()?),
            }
        } else {
            nodes.push(reader.parse_verbatim()?);
        }
    }

    Ok(StylesheetDocument { nodes })
}

struct Reader<'src> {
    source: &'src str,
    pos: usize,
}

impl<'src> Reader<'src> {
    fn new(source: &'src str) -> Self {
        Self { source, pos: 0 }
    }

    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn advance(&mut self, bytes: usize) {
        self.pos = (self.pos + bytes).min(self.source.len());
    }

    /// Skip whitespace and `/* ... */` comments between nodes
    fn skip_trivia(&mut self) {
        loop {
            let trimmed = self.rest().trim_start();
            self.pos = self.source.len() - trimmed.len();
            if let Some(after) = trimmed.strip_prefix("/*") {
                match after.find("*/") {
                    Some(end) => self.pos = self.source.len() - after.len() + end + 2,
                    None => self.pos = self.source.len(),
                }
            } else {
                break;
            }
        }
    }

    fn peek_ident_after_at(&self) -> String {
        self.rest()
            .strip_prefix('@')
            .unwrap_or("")
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect()
    }

    /// `@name "quoted";`
    fn parse_path_directive(
        &mut self,
        name: &str,
        build: impl FnOnce(String) -> Node,
    ) -> ParseResult<Node> {
        self.advance(1 + name.len()); // '@' + name
        self.skip_trivia();

        let path = self.expect_quoted_string()?;

        self.skip_trivia();
        self.expect_char(';')?;
        Ok(build(path))
    }

    /// `@theme { --name: value; ... }`
    fn parse_theme(&mut self) -> ParseResult<Node> {
        self.advance("@theme".len());
        self.skip_trivia();
        self.expect_char('{')?;

        let mut declarations = Vec::new();
        loop {
            self.skip_trivia();
            if self.rest().starts_with('}') {
                self.advance(1);
                break;
            }
            if self.is_at_end() {
                return Err(ParseError::unbalanced(self.pos, '}'));
            }

            let decl_end = self
                .rest()
                .find([';', '}'])
                .ok_or(ParseError::unbalanced(self.pos, '}'))?;
            let decl_text = &self.rest()[..decl_end];
            let terminator = self.rest().as_bytes()[decl_end];
            let decl_pos = self.pos;
            self.advance(decl_end);
            if terminator == b';' {
                self.advance(1);
            }

            let (name, value) = decl_text.split_once(':').ok_or_else(|| {
                ParseError::invalid_directive(decl_pos, "expected `--name: value` in @theme block")
            })?;
            let name = name.trim();
            let value = value.trim();
            if !name.starts_with("--") || value.is_empty() {
                return Err(ParseError::invalid_directive(
                    decl_pos,
                    "theme declarations must be custom properties (`--name: value`)",
                ));
            }
            declarations.push((name.to_string(), value.to_string()));
        }

        Ok(Node::Theme { declarations })
    }

    fn parse_utilities(&mut self) -> ParseResult<()> {
        self.advance("@utilities".len());
        self.skip_trivia();
        self.expect_char(';')?;
        Ok(())
    }

    /// Read one verbatim block: a plain rule (or unknown at-rule) up to its
    /// balanced closing brace, or up to `;` for block-less at-rules.
    fn parse_verbatim(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut entered_block = false;

        while let Some(ch) = self.rest().chars().next() {
            match ch {
                '{' => {
                    depth += 1;
                    entered_block = true;
                }
                '}' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or(ParseError::unbalanced(self.pos, '{'))?;
                    if depth == 0 {
                        self.advance(1);
                        break;
                    }
                }
                ';' if depth == 0 => {
                    self.advance(1);
                    break;
                }
                _ => {}
            }
            self.advance(ch.len_utf8());
        }

        if entered_block && depth != 0 {
            return Err(ParseError::unbalanced(self.pos, '}'));
        }

        let css = self.source[start..self.pos].trim().to_string();
        Ok(Node::Verbatim { css })
    }

    fn expect_quoted_string(&mut self) -> ParseResult<String> {
        let quote = match self.rest().chars().next() {
            Some(q @ ('"' | '\'')) => q,
            Some(_) => return Err(ParseError::expected_string(self.pos)),
            None => return Err(ParseError::unexpected_eof(self.pos)),
        };
        self.advance(1);

        let end = self
            .rest()
            .find(quote)
            .ok_or(ParseError::unbalanced(self.pos, quote))?;
        let value = self.rest()[..end].to_string();
        self.advance(end + 1);
        Ok(value)
    }

    fn expect_char(&mut self, expected: char) -> ParseResult<()> {
        match self.rest().chars().next() {
            Some(c) if c == expected => {
                self.advance(expected.len_utf8());
                Ok(())
            }
            Some(c) => Err(ParseError::invalid_directive(
                self.pos,
                format!("expected '{}', found '{}'", expected, c),
            )),
            None => Err(ParseError::unexpected_eof(self.pos)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directives() {
        let source = r#"
            @import "./base.css";
            @source "src/**/*.html";
            @config "zephyr.config.json";
            @plugin "./plugins/hocus.css";
            @utilities;
        "#;

        let doc = parse_stylesheet(source).unwrap();
        assert_eq!(
            doc.nodes,
            vec![
                Node::Import {
                    path: "./base.css".to_string()
                },
                Node::Source {
                    glob: "src/**/*.html".to_string()
                },
                Node::Config {
                    path: "zephyr.config.json".to_string()
                },
                Node::Plugin {
                    path: "./plugins/hocus.css".to_string()
                },
                Node::Utilities,
            ]
        );
    }

    #[test]
    fn test_parse_theme_block() {
        let source = r#"
            @theme {
                --color-primary: black;
                --spacing: 0.25rem
            }
        "#;

        let doc = parse_stylesheet(source).unwrap();
        assert_eq!(
            doc.nodes,
            vec![Node::Theme {
                declarations: vec![
                    ("--color-primary".to_string(), "black".to_string()),
                    ("--spacing".to_string(), "0.25rem".to_string()),
                ]
            }]
        );
    }

    #[test]
    fn test_verbatim_rules_pass_through() {
        let source = "body { margin: 0; }\n@utilities;\n.footer a:hover { color: red; }";

        let doc = parse_stylesheet(source).unwrap();
        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(
            doc.nodes[0],
            Node::Verbatim {
                css: "body { margin: 0; }".to_string()
            }
        );
        assert_eq!(doc.nodes[1], Node::Utilities);
        assert_eq!(
            doc.nodes[2],
            Node::Verbatim {
                css: ".footer a:hover { color: red; }".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_at_rules_are_verbatim() {
        let source = "@media print { body { display: none; } }\n@charset \"utf-8\";";

        let doc = parse_stylesheet(source).unwrap();
        assert_eq!(doc.nodes.len(), 2);
        assert!(matches!(&doc.nodes[0], Node::Verbatim { css } if css.starts_with("@media")));
        assert!(matches!(&doc.nodes[1], Node::Verbatim { css } if css.starts_with("@charset")));
    }

    #[test]
    fn test_comments_are_skipped_between_nodes() {
        let source = "/* header */\n@utilities; /* trailing */";
        let doc = parse_stylesheet(source).unwrap();
        assert_eq!(doc.nodes, vec![Node::Utilities]);
    }

    #[test]
    fn test_invalid_directive_is_fatal() {
        assert!(parse_stylesheet("@import base.css;").is_err());
        assert!(parse_stylesheet("@import \"base.css\"").is_err());
        assert!(parse_stylesheet("@theme { color: red; }").is_err());
        assert!(parse_stylesheet("@theme { --x: 1;").is_err());
    }
}
