use thiserror::Error;

/// Errors raised while reading pbxproj text. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of input at {line}:{column}")]
    UnexpectedEof { line: usize, column: usize },

    #[error("unexpected character {found:?} at {line}:{column}, expected {expected}")]
    Unexpected {
        found: char,
        expected: &'static str,
        line: usize,
        column: usize,
    },

    #[error("unterminated comment starting at {line}:{column}")]
    UnterminatedComment { line: usize, column: usize },

    #[error("invalid escape sequence at {line}:{column}")]
    InvalidEscape { line: usize, column: usize },

    #[error("invalid data literal at {line}:{column}")]
    InvalidData { line: usize, column: usize },

    #[error("trailing content at {line}:{column}")]
    TrailingContent { line: usize, column: usize },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnexpectedEof { line, .. }
            | ParseError::Unexpected { line, .. }
            | ParseError::UnterminatedComment { line, .. }
            | ParseError::InvalidEscape { line, .. }
            | ParseError::InvalidData { line, .. }
            | ParseError::TrailingContent { line, .. } => *line,
        }
    }
}
