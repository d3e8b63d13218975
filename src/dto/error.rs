use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a scan. End of input is not an error.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("can't open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("can't read input: {0}")]
    Read(#[from] io::Error),
    #[error("invalid literal, expected `{keyword}` but found {found:?}")]
    UnexpectedLiteral {
        keyword: &'static str,
        found: char,
        line: usize,
        column: usize,
    },
}

impl LexError {

    /// Line and column of the offending character, when the error has one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            LexError::UnexpectedLiteral { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}
