use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{component::Calendar, types::Tz};

mod unfold;
pub use unfold::{unfold, unfold_bytes};

mod lexer;
pub use lexer::{Lexer, LexerError, Token, TokenDisplay, TokenKind};

mod content_line;
pub use content_line::{Parameter, Params, Property};

mod error;
pub use error::{ErrorCategory, ParserError};

mod property;
pub(crate) use property::property;
pub use property::{ICalProperty, ParseProp};

mod component;
pub use component::CalendarParser;

#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Zone for date values that carry neither a UTC marker nor a TZID.
    /// `None` means the zone of the host.
    pub default_tz: Option<Tz>,
    /// Polled before every token; once raised the parse fails with [`ParserError::Cancelled`].
    pub cancellation: Option<CancellationFlag>,
}

/// A flag that can be raised from any thread to stop a running parse.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Parse a document containing exactly one VCALENDAR.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &[u8], default_tz: Option<Tz>) -> Result<Calendar, ParserError> {
    CalendarParser::from_slice(input)?
        .with_options(ParserOptions {
            default_tz,
            ..Default::default()
        })
        .expect_one()
}
