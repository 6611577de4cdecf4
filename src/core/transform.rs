//! Import stripping for live preview
//!
//! Component source written by sellers starts with `import` statements that
//! cannot be resolved inside the preview sandbox. Before evaluation the
//! source goes through [`transform`], which drops them and trims the result.
//!
//! Two modes exist:
//! - [`TransformMode::LinePattern`] (default): removes every line matching a
//!   line-anchored `import ... ;` pattern. Imports spanning several lines are
//!   left (partially) in place.
//! - [`TransformMode::Lexical`]: tokenizes the source and removes whole static
//!   import declarations, including multi-line ones. Dynamic `import(...)`
//!   and `import.meta` are kept.
//!
//! The only way to obtain a [`TransformedSource`] is through this module, so
//! the preview evaluator can never be handed raw source.

use logos::Logos;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Line-anchored single-line import statement, including its line break
static IMPORT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^import\b[^\n]*;[ \t\r]*(?:\n|$)").unwrap());

/// How import statements are located
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TransformMode {
    #[default]
    LinePattern,
    Lexical,
}

/// Source that has passed the transform step and may be evaluated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransformedSource(String);

impl TransformedSource {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for TransformedSource {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransformedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run the transform step in the given mode
pub fn transform(source: &str, mode: TransformMode) -> TransformedSource {
    match mode {
        TransformMode::LinePattern => strip_imports(source),
        TransformMode::Lexical => strip_imports_lexical(source),
    }
}

/// Remove single-line `import ... ;` statements and trim
pub fn strip_imports(source: &str) -> TransformedSource {
    TransformedSource(IMPORT_LINE.replace_all(source, "").trim().to_string())
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
enum Lexeme {
    #[token("import")]
    Import,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Str,

    #[regex(r"`([^`\\]|\\.)*`")]
    Template,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[token("\n")]
    Newline,

    #[token(";")]
    Semi,

    #[token("(")]
    LParen,

    #[token(".")]
    Dot,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,

    #[token("*")]
    Star,
}

/// Lexeme kind, with anything logos does not recognise folded into `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Known(Lexeme),
    Other,
}

struct Token<'a> {
    kind: Kind,
    text: &'a str,
    span: Range<usize>,
}

impl Token<'_> {
    fn is(&self, lexeme: Lexeme) -> bool {
        self.kind == Kind::Known(lexeme)
    }

    fn is_trivia(&self) -> bool {
        self.is(Lexeme::LineComment) || self.is(Lexeme::BlockComment)
    }
}

fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut lexer = Lexeme::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let kind = match result {
            Ok(lexeme) => Kind::Known(lexeme),
            Err(_) => Kind::Other,
        };
        tokens.push(Token {
            kind,
            text: lexer.slice(),
            span: lexer.span(),
        });
    }
    tokens
}

/// Index of the next token after `from` that is neither a comment nor a newline
fn next_significant(tokens: &[Token<'_>], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&i| !tokens[i].is_trivia() && !tokens[i].is(Lexeme::Newline))
}

/// Index of the next non-comment token on the same line
fn next_on_line(tokens: &[Token<'_>], from: usize) -> Option<usize> {
    for (i, token) in tokens.iter().enumerate().skip(from) {
        if token.is(Lexeme::Newline) {
            return None;
        }
        if !token.is_trivia() {
            return Some(i);
        }
    }
    None
}

fn starts_statement(tokens: &[Token<'_>], index: usize) -> bool {
    let previous = tokens[..index].iter().rev().find(|t| !t.is_trivia());
    match previous {
        None => true,
        Some(t) => {
            t.is(Lexeme::Newline)
                || t.is(Lexeme::Semi)
                || t.is(Lexeme::LBrace)
                || t.is(Lexeme::RBrace)
        }
    }
}

/// True for tokens allowed between `import` and `from`
fn is_clause_token(token: &Token<'_>) -> bool {
    token.is(Lexeme::Ident)
        || token.is(Lexeme::LBrace)
        || token.is(Lexeme::RBrace)
        || token.is(Lexeme::Comma)
        || token.is(Lexeme::Star)
}

/// Index of the module specifier of the declaration starting at `start`
///
/// Accepts `import 'x'` and `import <clause> from 'x'`; anything else in
/// the clause (JSX text, operators, calls) means this is not a declaration.
fn import_specifier(tokens: &[Token<'_>], start: usize) -> Option<usize> {
    let first = next_significant(tokens, start + 1)?;
    if tokens[first].is(Lexeme::Str) {
        return Some(first);
    }

    let mut cursor = first;
    loop {
        let token = &tokens[cursor];
        if !is_clause_token(token) {
            return None;
        }
        let next = next_significant(tokens, cursor + 1)?;
        if token.is(Lexeme::Ident) && token.text == "from" && tokens[next].is(Lexeme::Str) {
            return (cursor != first).then_some(next);
        }
        cursor = next;
    }
}

/// Byte range of the import declaration starting at `start`, if it is one
fn import_declaration(tokens: &[Token<'_>], start: usize) -> Option<Range<usize>> {
    let specifier = import_specifier(tokens, start)?;
    let mut end = tokens[specifier].span.end;
    let mut cursor = specifier + 1;

    // Import attributes: `with { type: 'json' }` / `assert { ... }`
    if let Some(i) = next_on_line(tokens, cursor)
        && tokens[i].is(Lexeme::Ident)
        && matches!(tokens[i].text, "with" | "assert")
    {
        let close = (i..tokens.len()).find(|&j| tokens[j].is(Lexeme::RBrace))?;
        end = tokens[close].span.end;
        cursor = close + 1;
    }

    if let Some(i) = next_on_line(tokens, cursor)
        && tokens[i].is(Lexeme::Semi)
    {
        end = tokens[i].span.end;
    }

    Some(tokens[start].span.start..end)
}

/// Remove complete static import declarations and trim
pub fn strip_imports_lexical(source: &str) -> TransformedSource {
    let tokens = tokenize(source);
    let mut removals: Vec<Range<usize>> = Vec::new();

    let mut index = 0;
    while index < tokens.len() {
        if tokens[index].is(Lexeme::Import)
            && starts_statement(&tokens, index)
            && let Some(range) = import_declaration(&tokens, index)
        {
            let end = range.end;
            removals.push(range);
            index = tokens
                .iter()
                .position(|t| t.span.start >= end)
                .unwrap_or(tokens.len());
            continue;
        }
        index += 1;
    }

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    for range in removals {
        output.push_str(&source[cursor..range.start]);
        cursor = consume_line_break(source, range.end);
    }
    output.push_str(&source[cursor..]);

    TransformedSource(output.trim().to_string())
}

/// Skip trailing blanks and one line break after a removed declaration
fn consume_line_break(source: &str, mut position: usize) -> usize {
    let bytes = source.as_bytes();
    while position < bytes.len() && matches!(bytes[position], b' ' | b'\t') {
        position += 1;
    }
    if position < bytes.len() && bytes[position] == b'\r' {
        position += 1;
    }
    if position < bytes.len() && bytes[position] == b'\n' {
        position += 1;
    }
    position
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_import_line(line: &str) -> bool {
        line.starts_with("import") && line.trim_end().ends_with(';')
    }

    #[test]
    fn test_strips_single_line_imports() {
        let source = "import React from 'react';\nimport { useState } from \"react\";\n\nexport default function App() {\n  return <div>Hi</div>;\n}\n";
        let out = strip_imports(source);
        assert_eq!(
            out.as_str(),
            "export default function App() {\n  return <div>Hi</div>;\n}"
        );
    }

    #[test]
    fn test_non_import_lines_kept_in_order() {
        let source = "const a = 1;\nimport x from 'x';\nconst b = 2;\nimport './side.css';\nconst c = a + b;";
        let out = strip_imports(source);
        assert!(!out.as_str().lines().any(is_import_line));

        let kept: Vec<&str> = source.lines().filter(|l| !is_import_line(l)).collect();
        let result: Vec<&str> = out.as_str().lines().collect();
        assert_eq!(result, kept);
    }

    #[test]
    fn test_empty_source() {
        assert!(strip_imports("").is_empty());
        assert!(strip_imports("   \n\t ").is_empty());
        assert!(strip_imports("import a from 'a';\n").is_empty());
    }

    #[test]
    fn test_multi_line_import_not_fully_removed() {
        let source = "import {\n  Foo\n} from 'bar';\nconst x = 1;";
        let out = strip_imports(source);
        // Current behaviour: nothing on these lines matches the single-line pattern
        assert!(out.as_str().contains("import {"));
        assert!(out.as_str().contains("} from 'bar';"));
        assert!(out.as_str().ends_with("const x = 1;"));
    }

    #[test]
    fn test_import_without_semicolon_is_kept() {
        let out = strip_imports("import x from 'x'\nrender(<X />)");
        assert_eq!(out.as_str(), "import x from 'x'\nrender(<X />)");
    }

    #[test]
    fn test_indented_import_is_kept() {
        let out = strip_imports("  import x from 'x';\nfoo();");
        assert!(out.as_str().starts_with("import x from 'x';"));
    }

    #[test]
    fn test_identifier_starting_with_import_is_kept() {
        let out = strip_imports("importantValue = 1;\nfoo();");
        assert_eq!(out.as_str(), "importantValue = 1;\nfoo();");
    }

    #[test]
    fn test_crlf_line_endings() {
        let out = strip_imports("import a from 'a';\r\nconst b = 1;\r\n");
        assert_eq!(out.as_str(), "const b = 1;");
    }

    #[test]
    fn test_lexical_removes_multi_line_import() {
        let source = "import {\n  Foo,\n  Bar,\n} from 'bar';\nimport Baz from \"baz\"\nconst x = <Foo />;";
        let out = strip_imports_lexical(source);
        assert_eq!(out.as_str(), "const x = <Foo />;");
    }

    #[test]
    fn test_lexical_keeps_dynamic_import_and_meta() {
        let source = "import a from 'a';\nconst m = import('./m');\nconst u = import.meta.url;";
        let out = strip_imports_lexical(source);
        assert_eq!(
            out.as_str(),
            "const m = import('./m');\nconst u = import.meta.url;"
        );
    }

    #[test]
    fn test_lexical_side_effect_and_type_imports() {
        let source = "import './styles.css';\nimport type { Props } from './types';\ntype X = Props;";
        let out = strip_imports_lexical(source);
        assert_eq!(out.as_str(), "type X = Props;");
    }

    #[test]
    fn test_lexical_import_attributes() {
        let source = "import data from './d.json' with { type: 'json' };\nrender(data);";
        assert_eq!(strip_imports_lexical(source).as_str(), "render(data);");
    }

    #[test]
    fn test_lexical_ignores_imports_in_comments_and_strings() {
        let source = "// import a from 'a';\nconst s = \"import b from 'b';\";\n/* import c from 'c'; */";
        let out = strip_imports_lexical(source);
        assert_eq!(out.as_str(), source);
    }

    #[test]
    fn test_lexical_matches_line_mode_on_simple_input() {
        let source = "import X from 'x';\nexport default function App(){return <div>Hi</div>}";
        assert_eq!(strip_imports(source), strip_imports_lexical(source));
    }

    #[test]
    fn test_lexical_keeps_jsx_text_starting_with_import() {
        let source = "export default function App(){\n  return (\n    <p>\n      import the widget\n    </p>\n  );\n}\nconst label = \"x\";";
        assert_eq!(strip_imports_lexical(source).as_str(), source);
    }

    #[test]
    fn test_lexical_namespace_and_mixed_clauses() {
        let source = "import * as React from 'react';\nimport Def, { a as b } from 'm';\nimport from from 'f';\nfoo();";
        assert_eq!(strip_imports_lexical(source).as_str(), "foo();");
    }

    #[test]
    fn test_lexical_clause_without_specifier_is_kept() {
        let source = "import thing\nconst s = 'x';";
        assert_eq!(strip_imports_lexical(source).as_str(), source);
    }

    #[test]
    fn test_transform_dispatches_on_mode() {
        let source = "import {\n A\n} from 'a';\nA();";
        assert_ne!(
            transform(source, TransformMode::LinePattern),
            transform(source, TransformMode::Lexical)
        );
        assert_eq!(transform(source, TransformMode::Lexical).as_str(), "A();");
    }
}
