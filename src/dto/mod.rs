pub mod token;
pub mod error;
pub use token::Token;
pub use token::TokenType;
pub use error::LexError;
