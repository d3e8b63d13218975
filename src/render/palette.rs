use crate::dto::TokenType;

/// Color for escape sequences inside strings. Escapes are not tokens of their own.
pub const ESCAPE_CHARACTERS: &'static str = "orange";

/// One indent level: four non-breaking spaces.
pub const INDENT: &'static str = "&nbsp;&nbsp;&nbsp;&nbsp;";

pub const WRAPPER_STYLE: &'static str = "font-family:monospace; white-space:pre";

#[inline]
pub fn color_of(token_type: TokenType) -> &'static str {
    match token_type {
        TokenType::LeftBrace | TokenType::RightBrace => "red",
        TokenType::LeftBracket | TokenType::RightBracket => "green",
        TokenType::Colon => "DimGray",
        TokenType::Comma => "Plum",
        TokenType::BoolOrNull => "blue",
        TokenType::String => "purple",
        TokenType::Number => "LightCoral",
    }
}
