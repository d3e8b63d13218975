use crate::dto::{Token, TokenType};
use crate::render::palette::{self, ESCAPE_CHARACTERS, INDENT, WRAPPER_STYLE};
use std::io::{self, Write};
use tracing::{debug, trace};

/// Writes a token list as one pre-formatted, colored HTML `<span>`.
///
/// Layout is rebuilt from a single indent counter: opening braces and brackets move it one level
/// right, closing ones move it back. The counter never goes below zero, so unbalanced closers
/// render at the left edge instead of failing.
pub struct HtmlRenderer<W: Write> {
    out: W,
    indent: usize,
}

impl<W: Write> HtmlRenderer<W> {

    pub fn new(out: W) -> HtmlRenderer<W> {
        HtmlRenderer { out, indent: 0 }
    }

    /// Renders `tokens` in order and flushes the writer.
    ///
    /// Every call starts a fresh fragment at indent zero. The fragment has no `<html>` or `<body>` around it and no trailing newline.
    pub fn render(&mut self, tokens: &[Token]) -> io::Result<()> {
        self.indent = 0;
        write!(self.out, "<span style=\"{}\">", WRAPPER_STYLE)?;
        for token in tokens {
            self.render_token(token)?;
        }
        write!(self.out, "</span>")?;
        debug!("rendered {} tokens", tokens.len());
        self.out.flush()
    }

    fn render_token(&mut self, token: &Token) -> io::Result<()> {
        trace!("rendering {:?} from {}", token.token_type, token.pos);
        let color = palette::color_of(token.token_type);
        match token.token_type {
            TokenType::LeftBrace | TokenType::LeftBracket => {
                write!(self.out, "<span style=\"color:{}\">{}\n</span>", color, token.payload)?;
                self.indent += 1;
                self.write_indent()
            }
            TokenType::RightBrace => {
                self.close_level(color)?;
                write!(self.out, "}}\n</span>")
            }
            // no newline after `]`, unlike `}`
            TokenType::RightBracket => {
                self.close_level(color)?;
                write!(self.out, "]</span>")
            }
            TokenType::Colon => write!(self.out, "<span style=\"color:{}\"> : </span>", color),
            TokenType::Comma => {
                write!(self.out, "<span style=\"color:{}\">,\n</span>", color)?;
                self.write_indent()
            }
            TokenType::BoolOrNull | TokenType::Number =>
                write!(self.out, "<span style=\"color:{}\">{}</span>", color, token.payload),
            TokenType::String => self.write_string(&token.payload),
        }
    }

    /// Opens the span of a closing brace or bracket and moves to the outer level.
    fn close_level(&mut self, color: &str) -> io::Result<()> {
        write!(self.out, "<span style=\"color:{}\">\n", color)?;
        self.indent = self.indent.saturating_sub(1);
        self.write_indent()
    }

    fn write_indent(&mut self) -> io::Result<()> {
        for _ in 0..self.indent {
            self.out.write_all(INDENT.as_bytes())?;
        }
        Ok(())
    }

    /// Every escape sequence gets one escape-colored span, every other char a string-colored
    /// span of its own.
    fn write_string(&mut self, payload: &str) -> io::Result<()> {
        let string_color = palette::color_of(TokenType::String);
        let chars: Vec<char> = payload.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] != '\\' {
                write!(self.out, "<span style=\"color:{}\">", string_color)?;
                write_escaped_html(&mut self.out, chars[i])?;
                write!(self.out, "</span>")?;
                i += 1;
                continue;
            }
            write!(self.out, "<span style=\"color:{}\">", ESCAPE_CHARACTERS)?;
            let len = match chars.get(i + 1) {
                // `\uXXXX`, or whatever is left of it
                Some('u') => (chars.len() - i).min(6),
                Some('"') => {
                    write!(self.out, "\\&quot;")?;
                    0
                }
                Some(_) => 2,
                None => 1,
            };
            for symbol in &chars[i..i + len] {
                write!(self.out, "{}", symbol)?;
            }
            write!(self.out, "</span>")?;
            i += len.max(2);
        }
        Ok(())
    }
}

#[inline]
fn write_escaped_html<W: Write>(out: &mut W, symbol: char) -> io::Result<()> {
    match symbol {
        '<' => write!(out, "&lt;"),
        '>' => write!(out, "&gt;"),
        '&' => write!(out, "&amp;"),
        '"' => write!(out, "&quot;"),
        '\'' => write!(out, "&apos;"),
        _ => write!(out, "{}", symbol),
    }
}

#[cfg(test)]
const WRAPPER_OPEN: &'static str = "<span style=\"font-family:monospace; white-space:pre\">";

#[cfg(test)]
fn render_tokens(tokens: &[Token]) -> String {
    let mut out: Vec<u8> = vec!();
    HtmlRenderer::new(&mut out).render(tokens).unwrap();
    String::from_utf8(out).unwrap()
}

#[cfg(test)]
fn render_source(source: &str) -> String {
    let tokens = crate::lexer::TokenReader::new().scan(source.as_bytes()).unwrap();
    render_tokens(&tokens)
}

#[cfg(test)]
fn span(color: &str, text: &str) -> String {
    format!("<span style=\"color:{}\">{}</span>", color, text)
}

#[cfg(test)]
fn wrapped(body: &str) -> String {
    format!("{}{}</span>", WRAPPER_OPEN, body)
}

/// Testing that every minimal JSON value renders with the color of its kind.
#[test]
fn test_minimal_values() {
    let cases = vec!(
        ("\"a\"", "purple"),
        ("42", "LightCoral"),
        ("true", "blue"),
        ("false", "blue"),
        ("null", "blue"),
        ("{}", "red"),
        ("[]", "green"),
    );
    for (source, color) in cases {
        let html = render_source(source);
        assert!(html.starts_with(WRAPPER_OPEN), "{}", html);
        assert!(html.contains(&format!("color:{}", color)), "{} -> {}", source, html);
    }
}

/// Testing the exact layout of empty containers.
///
/// `}` is followed by a newline, `]` is not.
#[test]
fn test_empty_containers() {
    let expected = wrapped(&format!(
        "{}{}{}",
        span("red", "{\n"),
        INDENT,
        span("red", "\n}\n"),
    ));
    assert_eq!(expected, render_source("{}"));

    let expected = wrapped(&format!(
        "{}{}{}",
        span("green", "[\n"),
        INDENT,
        span("green", "\n]"),
    ));
    assert_eq!(expected, render_source("[]"));
}

/// Testing that a comma starts a new line at the current indent.
#[test]
fn test_object_layout() {
    let key = |name: &str| format!("{}{}{}", span("purple", "&quot;"), span("purple", name), span("purple", "&quot;"));
    let expected = wrapped(&[
        span("red", "{\n"),
        INDENT.to_string(),
        key("a"),
        span("DimGray", " : "),
        span("LightCoral", "1"),
        span("Plum", ",\n"),
        INDENT.to_string(),
        key("b"),
        span("DimGray", " : "),
        span("LightCoral", "2"),
        span("red", "\n}\n"),
    ].concat());
    assert_eq!(expected, render_source("{\"a\":1,\"b\":2}"));
}

/// Testing nested indentation.
#[test]
fn test_nested_arrays() {
    let expected = wrapped(&[
        span("green", "[\n"),
        INDENT.to_string(),
        span("green", "[\n"),
        INDENT.repeat(2),
        span("LightCoral", "1"),
        format!("<span style=\"color:green\">\n{}]</span>", INDENT),
        span("green", "\n]"),
    ].concat());
    assert_eq!(expected, render_source("[[1]]"));
}

/// Testing that whitespace between tokens doesn't change the output.
#[test]
fn test_whitespace_ignored() {
    assert_eq!(render_source("{}"), render_source(" {\t\n }  "));
    assert_eq!(render_source("[1,2]"), render_source("[ 1 ,\n\t2 ]"));
}

/// Testing that a closer without an opener stays at the left edge.
#[test]
fn test_unbalanced_closer() {
    let tokens = vec!(
        Token::new(TokenType::RightBracket, "]", 0),
        Token::new(TokenType::Comma, ",", 1),
    );
    let expected = wrapped(&[span("green", "\n]"), span("Plum", ",\n")].concat());
    assert_eq!(expected, render_tokens(&tokens));
}

/// Testing `\uXXXX` escapes: all six chars go into one escape span.
#[test]
fn test_unicode_escape() {
    let expected = wrapped(&[
        span("purple", "&quot;"),
        span("orange", "\\u0041"),
        span("purple", "b"),
        span("purple", "&quot;"),
    ].concat());
    assert_eq!(expected, render_source("\"\\u0041b\""));
}

/// Testing the other escapes.
///
/// `\"` becomes `\&quot;`, anything else is copied as is.
#[test]
fn test_escapes() {
    let expected = wrapped(&[
        span("purple", "&quot;"),
        span("orange", "\\&quot;"),
        span("orange", "\\n"),
        span("orange", "\\\\"),
        span("purple", "&quot;"),
    ].concat());
    assert_eq!(expected, render_source("\"\\\"\\n\\\\\""));
}

/// Testing a `\u` escape cut short by the end of the string.
#[test]
fn test_short_unicode_escape() {
    let tokens = vec!(Token::new(TokenType::String, "\"\\u12\"", 0));
    let expected = wrapped(&[
        span("purple", "&quot;"),
        span("orange", "\\u12\""),
    ].concat());
    assert_eq!(expected, render_tokens(&tokens));
}

/// Testing HTML escaping of string chars.
#[test]
fn test_html_escaping() {
    let expected = wrapped(&[
        span("purple", "&quot;"),
        span("purple", "&lt;"),
        span("purple", "&amp;"),
        span("purple", "&apos;"),
        span("purple", "&gt;"),
        span("purple", "é"),
        span("purple", "&quot;"),
    ].concat());
    assert_eq!(expected, render_source("\"<&'>é\""));
}

/// Testing that the renderer flushes and writes nothing but the wrapper for no tokens.
#[test]
fn test_no_tokens() {
    assert_eq!(wrapped(""), render_tokens(&[]));
}

/// Testing that a renderer used twice starts each fragment at the left edge.
#[test]
fn test_renderer_reuse() {
    let tokens = vec!(Token::new(TokenType::LeftBracket, "[", 0));
    let mut out: Vec<u8> = vec!();
    let mut renderer = HtmlRenderer::new(&mut out);
    renderer.render(&tokens).unwrap();
    renderer.render(&tokens).unwrap();
    let single = wrapped(&format!("{}{}", span("green", "[\n"), INDENT));
    assert_eq!(single.repeat(2), String::from_utf8(out).unwrap());
}
