/// One lexical unit of a JSON document.
///
/// `payload` is the literal text matched: the whole quoted region for strings (quotes and
/// escapes included), a single character for numbers, the full keyword for literals.
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub payload: String,
    pub pos: usize,
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum TokenType {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    BoolOrNull,
    String,
    Number,
}

impl Token {

    pub fn new(token_type: TokenType, payload: impl Into<String>, pos: usize) -> Token {
        Token { token_type, payload: payload.into(), pos }
    }
}

impl TokenType {

    /// Token type for a single structural character, if it is one.
    pub fn structural(symbol: char) -> Option<TokenType> {
        match symbol {
            '{' => Some(TokenType::LeftBrace),
            '}' => Some(TokenType::RightBrace),
            '[' => Some(TokenType::LeftBracket),
            ']' => Some(TokenType::RightBracket),
            ':' => Some(TokenType::Colon),
            ',' => Some(TokenType::Comma),
            _ => None,
        }
    }
}

#[test]
fn test_structural_symbols() {
    let expected = vec!(
        Some(TokenType::LeftBrace),
        Some(TokenType::RightBrace),
        Some(TokenType::LeftBracket),
        Some(TokenType::RightBracket),
        Some(TokenType::Colon),
        Some(TokenType::Comma),
        None,
        None,
    );
    let actual: Vec<_> = "{}[]:,\" ".chars().map(TokenType::structural).collect();
    assert_eq!(expected, actual)
}
