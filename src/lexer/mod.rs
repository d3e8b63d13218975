pub mod tokenreader;
pub use tokenreader::TokenReader;
