use crate::dto::{LexError, Token, TokenType};
use std::cell::Cell;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace};
use utf8_chars::BufReadCharsExt;

const NUMBER_SYMBOLS: &'static str = "0123456789eE.-+";
const KEYWORDS: &'static [&'static str] = &[
    "true",
    "false",
    "null",
];

/// Simple JSON text to `Vec<Token>` converter.
///
/// The `TokenReader` reads the input one char at a time and decides what every char means by
/// looking at that char alone. It does not track nesting, so `{]` is scanned without complaint.
/// Whitespace and anything else it doesn't recognize is skipped.
///
/// Call [`scan_file`] for a path or [`scan`] for any buffered reader.
///
/// [`scan_file`]: TokenReader::scan_file
/// [`scan`]: TokenReader::scan
pub struct TokenReader {
    state: Cell<State>,
}

#[derive(Copy, Clone, Debug)]
struct State {
    expected: Expected,
    start_offset: usize,
    is_prev_escape_symbol: bool,
    // position of the current char, 1-based
    line: usize,
    column: usize,
}

#[derive(Copy, Clone, Debug)]
enum Expected {
    Nothing,
    StringConstant,
    Keyword { keyword: &'static str, matched: usize },
}

impl State {

    fn initial() -> State {
        State {
            expected: Expected::Nothing,
            start_offset: 0,
            is_prev_escape_symbol: false,
            line: 1,
            column: 0,
        }
    }
}

impl TokenReader {

    /// Creates an new `TokenReader`.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```ignore
    /// let token_reader = TokenReader::new();
    /// let tokens = token_reader.scan_file("data.json")?;
    /// ```
    pub fn new() -> TokenReader {
        TokenReader {
            state: Cell::from(State::initial()),
        }
    }

    /// Opens `path` and scans it with [`scan`].
    ///
    /// Failing to open the file is reported as [`LexError::Open`].
    ///
    /// [`scan`]: TokenReader::scan
    pub fn scan_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Token>, LexError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LexError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("scanning {}", path.display());
        self.scan(BufReader::new(file))
    }

    /// Creates an `Vec<Token>` from everything `reader` yields.
    ///
    /// Tokens come out in input order. When the input ends in the middle of a string or a
    /// `true`/`false`/`null` literal, the unfinished token is dropped and the tokens read so far
    /// are returned as a normal result. Bytes that are not UTF-8 are read as `U+FFFD`.
    ///
    /// # Errors
    ///
    /// [`LexError::Read`] on any read failure and
    /// [`LexError::UnexpectedLiteral`] when a literal is misspelled (`tru3`, `nul`).
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let tokens = TokenReader::new().scan("[7]".as_bytes()).unwrap();
    ///
    /// assert_eq!(
    ///     vec![
    ///         Token { token_type: TokenType::LeftBracket, payload: String::from("["), pos: 0 },
    ///         Token { token_type: TokenType::Number, payload: String::from("7"), pos: 1 },
    ///         Token { token_type: TokenType::RightBracket, payload: String::from("]"), pos: 2 },
    ///     ],
    ///     tokens,
    /// );
    /// ```
    pub fn scan<R: BufRead>(&self, mut reader: R) -> Result<Vec<Token>, LexError> {
        self.state.set(State::initial());
        let mut tokens: Vec<Token> = vec!();
        let mut buffer = String::new();
        let mut offset = 0usize;
        while let Some(symbol) = read_symbol(&mut reader)? {
            let state = self.state.get();
            let state = State { column: state.column + 1, ..state };
            let mut new_state = reduce_state(symbol, offset, state, &mut buffer, &mut tokens)?;
            if symbol == '\n' {
                new_state = State { line: new_state.line + 1, column: 0, ..new_state };
            }
            self.state.set(new_state);
            offset += 1;
        }
        report_unfinished(self.state.get(), &buffer);
        debug!("scanned {} chars into {} tokens", offset, tokens.len());
        Ok(tokens)
    }
}

fn read_symbol<R: BufRead>(reader: &mut R) -> Result<Option<char>, LexError> {
    match reader.read_char() {
        Ok(symbol) => Ok(symbol),
        Err(ref e) if e.kind() == io::ErrorKind::InvalidData => {
            trace!("replacing undecodable input: {}", e);
            Ok(Some(std::char::REPLACEMENT_CHARACTER))
        }
        Err(e) => Err(LexError::Read(e)),
    }
}

#[inline]
fn reduce_state(
    symbol: char,
    offset: usize,
    state: State,
    buffer: &mut String,
    tokens: &mut Vec<Token>,
) -> Result<State, LexError> {
    match state.expected {
        Expected::Nothing => Ok(reduce_state_nothing(symbol, offset, state, buffer, tokens)),
        Expected::StringConstant => Ok(reduce_state_string_constant(symbol, state, buffer, tokens)),
        Expected::Keyword { keyword, matched } =>
            reduce_state_keyword(symbol, keyword, matched, state, tokens),
    }
}

#[inline]
fn reduce_state_nothing(
    symbol: char,
    offset: usize,
    state: State,
    buffer: &mut String,
    tokens: &mut Vec<Token>,
) -> State {
    if let Some(token_type) = TokenType::structural(symbol) {
        tokens.push(Token::new(token_type, symbol.to_string(), offset));
        return state;
    }
    match symbol {
        '"' => {
            buffer.clear();
            buffer.push(symbol);
            State {
                expected: Expected::StringConstant,
                start_offset: offset,
                is_prev_escape_symbol: false,
                ..state
            }
        }
        // every number char is a token of its own
        val if NUMBER_SYMBOLS.contains(val) => {
            tokens.push(Token::new(TokenType::Number, val.to_string(), offset));
            state
        }
        val => match KEYWORDS.iter().find(|k| k.starts_with(val)) {
            Some(keyword) => State {
                expected: Expected::Keyword { keyword: *keyword, matched: 1 },
                start_offset: offset,
                ..state
            },
            None => {
                trace!("skipping {:?} at {}", val, offset);
                state
            }
        },
    }
}

#[inline]
fn reduce_state_string_constant(
    symbol: char,
    state: State,
    buffer: &mut String,
    tokens: &mut Vec<Token>,
) -> State {
    buffer.push(symbol);
    match state.is_prev_escape_symbol {
        true => State { is_prev_escape_symbol: false, ..state },
        false => match symbol {
            '\\' => State { is_prev_escape_symbol: true, ..state },
            '"' => {
                let payload = std::mem::take(buffer);
                tokens.push(Token::new(TokenType::String, payload, state.start_offset));
                State { expected: Expected::Nothing, ..state }
            }
            _ => state,
        },
    }
}

#[inline]
fn reduce_state_keyword(
    symbol: char,
    keyword: &'static str,
    matched: usize,
    state: State,
    tokens: &mut Vec<Token>,
) -> Result<State, LexError> {
    // keywords are ASCII
    if keyword.as_bytes()[matched] as char != symbol {
        return Err(LexError::UnexpectedLiteral {
            keyword,
            found: symbol,
            line: state.line,
            column: state.column,
        });
    }
    let matched = matched + 1;
    if matched == keyword.len() {
        tokens.push(Token::new(TokenType::BoolOrNull, keyword, state.start_offset));
        Ok(State { expected: Expected::Nothing, ..state })
    } else {
        Ok(State { expected: Expected::Keyword { keyword, matched }, ..state })
    }
}

fn report_unfinished(state: State, buffer: &str) {
    match state.expected {
        Expected::Nothing => { /* no-op */ },
        Expected::StringConstant =>
            debug!("input ended inside a string at {}, dropping {:?}", state.start_offset, buffer),
        Expected::Keyword { keyword, matched } =>
            debug!("input ended inside `{}` at {}, dropping {:?}", keyword, state.start_offset, &keyword[..matched]),
    }
}

#[cfg(test)]
fn scan_str(source: &str) -> Result<Vec<Token>, LexError> {
    TokenReader::new().scan(source.as_bytes())
}

/// Testing that every structural char becomes exactly one token.
#[test]
fn test_structural_tokens() {
    let source = "{\"a\":[1,2]}";
    let expected = vec!(
        Token::new(TokenType::LeftBrace, "{", 0),
        Token::new(TokenType::String, "\"a\"", 1),
        Token::new(TokenType::Colon, ":", 4),
        Token::new(TokenType::LeftBracket, "[", 5),
        Token::new(TokenType::Number, "1", 6),
        Token::new(TokenType::Comma, ",", 7),
        Token::new(TokenType::Number, "2", 8),
        Token::new(TokenType::RightBracket, "]", 9),
        Token::new(TokenType::RightBrace, "}", 10),
    );
    let actual = scan_str(source).unwrap();
    assert_eq!(expected, actual)
}

/// Testing that an escaped quote doesn't close the string.
///
/// `"a\"b"` is one token spanning the whole quoted region.
#[test]
fn test_escaped_quote() {
    let source = "\"a\\\"b\"";
    let expected = vec!(
        Token::new(TokenType::String, "\"a\\\"b\"", 0),
    );
    let actual = scan_str(source).unwrap();
    assert_eq!(expected, actual)
}

/// Testing the escaped backslash cases.
///
/// In `"a\\"` the backslash is escaped, so the last quote closes the string.
/// In `"\\\"x"` the third backslash escapes the quote and the string goes on.
#[test]
fn test_escaped_backslash() {
    let source = "\"a\\\\\" 1 \"\\\\\\\"x\"";
    let expected = vec!(
        Token::new(TokenType::String, "\"a\\\\\"", 0),
        Token::new(TokenType::Number, "1", 6),
        Token::new(TokenType::String, "\"\\\\\\\"x\"", 8),
    );
    let actual = scan_str(source).unwrap();
    assert_eq!(expected, actual)
}

/// Testing that structural chars inside strings are part of the string.
#[test]
fn test_structural_inside_string() {
    let source = "\"{[:,]}\"";
    let expected = vec!(
        Token::new(TokenType::String, "\"{[:,]}\"", 0),
    );
    let actual = scan_str(source).unwrap();
    assert_eq!(expected, actual)
}

/// Testing `true`, `false` and `null` literals.
#[test]
fn test_keywords() {
    let source = "[true, false, null]";
    let expected = vec!(
        Token::new(TokenType::LeftBracket, "[", 0),
        Token::new(TokenType::BoolOrNull, "true", 1),
        Token::new(TokenType::Comma, ",", 5),
        Token::new(TokenType::BoolOrNull, "false", 7),
        Token::new(TokenType::Comma, ",", 12),
        Token::new(TokenType::BoolOrNull, "null", 14),
        Token::new(TokenType::RightBracket, "]", 18),
    );
    let actual = scan_str(source).unwrap();
    assert_eq!(expected, actual)
}

/// Testing that a misspelled literal is an error pointing at the wrong char.
#[test]
fn test_misspelled_keyword() {
    match scan_str("tabc") {
        Err(LexError::UnexpectedLiteral { keyword, found, line, column }) => {
            assert_eq!("true", keyword);
            assert_eq!('a', found);
            assert_eq!((1, 2), (line, column));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    match scan_str("[\n  nul1]") {
        Err(error) => {
            assert_eq!(Some((2, 6)), error.position());
            assert!(matches!(error, LexError::UnexpectedLiteral { found: '1', .. }));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

/// Testing number chars.
///
/// Every char of a number is a token of its own, `0` and `9` included.
#[test]
fn test_numbers() {
    let source = "90 -1.5e+3";
    let expected = vec!(
        Token::new(TokenType::Number, "9", 0),
        Token::new(TokenType::Number, "0", 1),
        Token::new(TokenType::Number, "-", 3),
        Token::new(TokenType::Number, "1", 4),
        Token::new(TokenType::Number, ".", 5),
        Token::new(TokenType::Number, "5", 6),
        Token::new(TokenType::Number, "e", 7),
        Token::new(TokenType::Number, "+", 8),
        Token::new(TokenType::Number, "3", 9),
    );
    let actual = scan_str(source).unwrap();
    assert_eq!(expected, actual)
}

/// Testing that whitespace and unknown chars never make tokens.
#[test]
fn test_skipped_chars() {
    let source = " \t{ \n } x";
    let expected = vec!(
        Token::new(TokenType::LeftBrace, "{", 2),
        Token::new(TokenType::RightBrace, "}", 6),
    );
    let actual = scan_str(source).unwrap();
    assert_eq!(expected, actual)
}

/// Testing truncated input.
///
/// The unfinished string or literal is dropped, everything before it is kept.
#[test]
fn test_truncated_input() {
    let expected = vec!(
        Token::new(TokenType::LeftBracket, "[", 0),
        Token::new(TokenType::String, "\"a\"", 1),
        Token::new(TokenType::Comma, ",", 4),
    );
    assert_eq!(expected, scan_str("[\"a\",\"").unwrap());
    assert_eq!(expected, scan_str("[\"a\",\"bc\\\"").unwrap());
    assert_eq!(expected, scan_str("[\"a\",fals").unwrap());
    assert_eq!(Vec::<Token>::new(), scan_str("").unwrap());
}

/// Testing that a reader starts from scratch on every scan.
#[test]
fn test_reader_reuse() {
    let token_reader = TokenReader::new();
    assert_eq!(Vec::<Token>::new(), token_reader.scan("\"open".as_bytes()).unwrap());
    let expected = vec!(
        Token::new(TokenType::BoolOrNull, "null", 0),
    );
    assert_eq!(expected, token_reader.scan("null".as_bytes()).unwrap());
}

/// Testing that non-ASCII chars pass through strings untouched.
#[test]
fn test_non_ascii_string() {
    let expected = vec!(
        Token::new(TokenType::String, "\"héllo ✓\"", 0),
    );
    assert_eq!(expected, scan_str("\"héllo ✓\"").unwrap());
}

/// Testing that bytes which are not UTF-8 don't stop the scan.
///
/// Between tokens they are skipped like any unknown char.
#[test]
fn test_invalid_utf8_skipped() {
    let source: &[u8] = &[b'[', 0xff, 0xfe, b']'];
    let expected = vec!(TokenType::LeftBracket, TokenType::RightBracket);
    let actual: Vec<TokenType> = TokenReader::new()
        .scan(source)
        .unwrap()
        .iter()
        .map(|token| token.token_type)
        .collect();
    assert_eq!(expected, actual)
}

/// Testing that a byte which is not UTF-8 inside a string becomes `U+FFFD`.
#[test]
fn test_invalid_utf8_in_string() {
    let source: &[u8] = b"\"caf\xff\", 1";
    let expected = vec!(
        Token::new(TokenType::String, "\"caf\u{FFFD}\"", 0),
        Token::new(TokenType::Comma, ",", 6),
        Token::new(TokenType::Number, "1", 8),
    );
    let actual = TokenReader::new().scan(source).unwrap();
    assert_eq!(expected, actual)
}

/// Testing scanning from a file on disk.
#[test]
fn test_scan_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{\"ok\": true}}\n").unwrap();
    let expected = vec!(
        Token::new(TokenType::LeftBrace, "{", 0),
        Token::new(TokenType::String, "\"ok\"", 1),
        Token::new(TokenType::Colon, ":", 5),
        Token::new(TokenType::BoolOrNull, "true", 7),
        Token::new(TokenType::RightBrace, "}", 11),
    );
    let actual = TokenReader::new().scan_file(file.path()).unwrap();
    assert_eq!(expected, actual)
}

/// Testing that a missing file is an open error naming the path.
#[test]
fn test_scan_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    match TokenReader::new().scan_file(&path) {
        Err(LexError::Open { path: reported, .. }) => assert_eq!(path, reported),
        other => panic!("unexpected result: {:?}", other),
    }
}
