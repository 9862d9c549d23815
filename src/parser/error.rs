use std::str::Utf8Error;

use crate::{component::ComponentKind, parser::LexerError, property::ValidationError};

/// Coarse classification of a [`ParserError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The text could not be tokenized.
    Lexical,
    /// The tokens do not form a well nested document.
    Structural,
    /// A component closed without satisfying its property rules.
    Validation,
    /// A date or date-time value could not be resolved.
    DateResolution,
    Cancelled,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParserError {
    #[error("empty input")]
    EmptyInput,
    #[error("too many components in input, expected one")]
    TooManyComponents,
    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),
    #[error("parsing was cancelled")]
    Cancelled,
    #[error("line {line}: {source}")]
    Lexer { line: usize, source: LexerError },
    #[error("line {line}: unexpected {found}, expected {expected}")]
    UnexpectedToken {
        line: usize,
        found: String,
        expected: &'static str,
    },
    #[error("line {line}: END:{found} while {expected} is still open")]
    MismatchedEnd {
        line: usize,
        expected: ComponentKind,
        found: ComponentKind,
    },
    #[error("line {line}: {child} is not allowed {}", nesting_context(.parent))]
    InvalidNesting {
        line: usize,
        parent: Option<ComponentKind>,
        child: ComponentKind,
    },
    #[error("line {line}: unexpected end of input")]
    UnexpectedEof { line: usize },
    #[error("line {line}: invalid {component}: {source}")]
    Validation {
        line: usize,
        component: ComponentKind,
        source: ValidationError,
    },
}

fn nesting_context(parent: &Option<ComponentKind>) -> String {
    match parent {
        Some(parent) => format!("inside {parent}"),
        None => "at top level".to_owned(),
    }
}

impl ParserError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Lexer { .. } | Self::InvalidUtf8(_) => ErrorCategory::Lexical,
            Self::EmptyInput
            | Self::TooManyComponents
            | Self::UnexpectedToken { .. }
            | Self::MismatchedEnd { .. }
            | Self::InvalidNesting { .. }
            | Self::UnexpectedEof { .. } => ErrorCategory::Structural,
            Self::Validation {
                source: ValidationError::InvalidDate { .. },
                ..
            } => ErrorCategory::DateResolution,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Logical line the error was detected on, if it is tied to a position.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Lexer { line, .. }
            | Self::UnexpectedToken { line, .. }
            | Self::MismatchedEnd { line, .. }
            | Self::InvalidNesting { line, .. }
            | Self::UnexpectedEof { line }
            | Self::Validation { line, .. } => Some(*line),
            Self::EmptyInput | Self::TooManyComponents | Self::InvalidUtf8(_) | Self::Cancelled => {
                None
            }
        }
    }
}
