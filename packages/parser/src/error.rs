use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Unexpected end of file at {pos}")]
    UnexpectedEof { pos: usize },

    #[error("Invalid directive at {pos}: {message}")]
    InvalidDirective { pos: usize, message: String },

    #[error("Expected quoted string at {pos}")]
    ExpectedString { pos: usize },

    #[error("Unbalanced delimiter at {pos}: expected '{expected}'")]
    UnbalancedDelimiter { pos: usize, expected: char },
}

impl ParseError {
    pub fn unexpected_eof(pos: usize) -> Self {
        Self::UnexpectedEof { pos }
    }

    pub fn invalid_directive(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidDirective {
            pos,
            message: message.into(),
        }
    }

    pub fn expected_string(pos: usize) -> Self {
        Self::ExpectedString { pos }
    }

    pub fn unbalanced(pos: usize, expected: char) -> Self {
        Self::UnbalancedDelimiter { pos, expected }
    }
}
