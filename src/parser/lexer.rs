//! Tokenize unfolded iCalendar text.
//!
//! The lexer is a small state machine pulled one token at a time by the parser. Every state
//! consumes input from the cursor and either emits a token, moves to another state, or both.
//! After an error token, or after the end-of-input token, the lexer is exhausted.
//!
//! ```text
//! contentline = name *(";" param ) ":" value CRLF
//! param       = param-name "=" param-value *("," param-value)
//! param-value = paramtext / quoted-string
//! ```
//!
//! The twelve component delimiters (`BEGIN:VCALENDAR`, `END:VEVENT`, ...) are recognised as
//! whole keywords and get their own tokens.

use std::borrow::Cow;
use std::fmt;
use std::str::Utf8Error;

use crate::component::ComponentKind;
use crate::{
    LINE_TERMINATOR, PARAM_DELIMITER, PARAM_NAME_DELIMITER, PARAM_QUOTE, PARAM_VALUE_DELIMITER,
    VALUE_DELIMITER,
};

use super::unfold_bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("unexpected character {found:?} {context}")]
    UnexpectedCharacter { found: char, context: &'static str },
    #[error("missing \"=\" after parameter name, found {found:?}")]
    MissingEquals { found: Option<char> },
    #[error("missing closing quote for parameter value")]
    MissingClosingQuote,
    #[error("missing CRLF line terminator, found {found:?}")]
    MissingLineTerminator { found: char },
    #[error("missing property name")]
    MissingName,
    #[error("missing parameter name")]
    MissingParamName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Name,
    ParamName,
    ParamValue,
    Value,
    Colon,
    Semicolon,
    Equals,
    Comma,
    LineEnd,
    Eof,
    Error(LexerError),
    Begin(ComponentKind),
    End(ComponentKind),
}

/// A token, the byte range of the unfolded input it covers and its 1-based logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

static DELIMITERS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "BEGIN:VCALENDAR" => TokenKind::Begin(ComponentKind::Calendar),
    "END:VCALENDAR" => TokenKind::End(ComponentKind::Calendar),
    "BEGIN:VEVENT" => TokenKind::Begin(ComponentKind::Event),
    "END:VEVENT" => TokenKind::End(ComponentKind::Event),
    "BEGIN:VALARM" => TokenKind::Begin(ComponentKind::Alarm),
    "END:VALARM" => TokenKind::End(ComponentKind::Alarm),
    "BEGIN:VTIMEZONE" => TokenKind::Begin(ComponentKind::Timezone),
    "END:VTIMEZONE" => TokenKind::End(ComponentKind::Timezone),
    "BEGIN:STANDARD" => TokenKind::Begin(ComponentKind::Standard),
    "END:STANDARD" => TokenKind::End(ComponentKind::Standard),
    "BEGIN:DAYLIGHT" => TokenKind::Begin(ComponentKind::Daylight),
    "END:DAYLIGHT" => TokenKind::End(ComponentKind::Daylight),
};

// name = 1*(ALPHA / DIGIT / "-")
#[inline]
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-'
}

// SAFE-CHAR: any character except CONTROL, DQUOTE, ";", ":", ","
#[inline]
fn is_safe_char(c: char) -> bool {
    !c.is_control()
        && c != PARAM_QUOTE
        && c != PARAM_DELIMITER
        && c != VALUE_DELIMITER
        && c != PARAM_VALUE_DELIMITER
}

// QSAFE-CHAR: any character except CONTROL and DQUOTE
#[inline]
fn is_qsafe_char(c: char) -> bool {
    !c.is_control() && c != PARAM_QUOTE
}

// VALUE-CHAR: WSP / any textual character
#[inline]
fn is_value_char(c: char) -> bool {
    c == '\t' || !c.is_control()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ScanName,
    DispatchPunctuation,
    ScanParamName,
    ExpectEquals,
    ScanParamValue,
    ScanValue,
    ExpectLineTerminator,
    LineStart,
}

pub struct Lexer<'a> {
    input: Cow<'a, str>,
    /// Start of the pending token.
    start: usize,
    /// Cursor.
    pos: usize,
    /// Logical line of the cursor.
    line: usize,
    /// `None` once the lexer halted.
    state: Option<State>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over text that is already unfolded.
    pub fn new(input: impl Into<Cow<'a, str>>) -> Self {
        Self {
            input: input.into(),
            start: 0,
            pos: 0,
            line: 1,
            state: Some(State::ScanName),
        }
    }

    /// Unfold and decode raw bytes, then create a lexer over the result.
    pub fn from_slice(slice: &'a [u8]) -> Result<Self, Utf8Error> {
        let text = match unfold_bytes(slice) {
            Cow::Borrowed(bytes) => Cow::Borrowed(std::str::from_utf8(bytes)?),
            Cow::Owned(bytes) => {
                Cow::Owned(String::from_utf8(bytes).map_err(|err| err.utf8_error())?)
            }
        };
        Ok(Self::new(text))
    }

    /// The unfolded text being scanned.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The text covered by `token`.
    pub fn slice(&self, token: &Token) -> &str {
        &self.input[token.start..token.end]
    }

    /// 1-based logical line of the cursor.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn is_halted(&self) -> bool {
        self.state.is_none()
    }

    /// Run the state machine until it produces the next token.
    ///
    /// Returns `None` once the lexer has emitted `Eof` or an error.
    pub fn next_token(&mut self) -> Option<Token> {
        while let Some(state) = self.state {
            let (token, next) = match state {
                State::ScanName => self.scan_name(),
                State::DispatchPunctuation => self.dispatch_punctuation(),
                State::ScanParamName => self.scan_param_name(),
                State::ExpectEquals => self.expect_equals(),
                State::ScanParamValue => self.scan_param_value(),
                State::ScanValue => self.scan_value(),
                State::ExpectLineTerminator => self.expect_line_terminator(),
                State::LineStart => self.line_start(),
            };
            self.state = next;
            if token.is_some() {
                return token;
            }
        }
        None
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        let len = self
            .rest()
            .find(|c| !pred(c))
            .unwrap_or_else(|| self.rest().len());
        self.pos += len;
    }

    fn ignore(&mut self) {
        self.start = self.pos;
    }

    fn emit(&mut self, kind: TokenKind) -> Token {
        let token = Token {
            kind,
            start: self.start,
            end: self.pos,
            line: self.line,
        };
        self.start = self.pos;
        token
    }

    fn error(&mut self, err: LexerError) -> (Option<Token>, Option<State>) {
        tracing::trace!(pos = self.pos, line = self.line, error = %err, "Lexer halted");
        let token = Token {
            kind: TokenKind::Error(err),
            start: self.pos,
            end: self.pos,
            line: self.line,
        };
        (Some(token), None)
    }

    fn scan_name(&mut self) -> (Option<Token>, Option<State>) {
        if self.pos >= self.input.len() {
            return (Some(self.emit(TokenKind::Eof)), None);
        }

        let rest = self.rest();
        let keyword = DELIMITERS
            .entries()
            .filter(|(keyword, _)| rest.starts_with(*keyword))
            .max_by_key(|(keyword, _)| keyword.len())
            .map(|(keyword, kind)| (keyword.len(), *kind));
        if let Some((len, kind)) = keyword {
            self.pos += len;
            return (Some(self.emit(kind)), Some(State::ExpectLineTerminator));
        }

        self.eat_while(is_name_char);
        if self.pos == self.start {
            return self.error(LexerError::MissingName);
        }
        (
            Some(self.emit(TokenKind::Name)),
            Some(State::DispatchPunctuation),
        )
    }

    fn dispatch_punctuation(&mut self) -> (Option<Token>, Option<State>) {
        let (kind, next) = match self.peek() {
            Some(PARAM_DELIMITER) => (TokenKind::Semicolon, State::ScanParamName),
            Some(PARAM_VALUE_DELIMITER) => (TokenKind::Comma, State::ScanParamValue),
            Some(VALUE_DELIMITER) => (TokenKind::Colon, State::ScanValue),
            Some(found) => {
                return self.error(LexerError::UnexpectedCharacter {
                    found,
                    context: "in content line, expected \";\", \",\" or \":\"",
                });
            }
            None => return (Some(self.emit(TokenKind::Eof)), None),
        };
        self.pos += 1;
        (Some(self.emit(kind)), Some(next))
    }

    fn scan_param_name(&mut self) -> (Option<Token>, Option<State>) {
        self.eat_while(is_name_char);
        if self.pos == self.start {
            return self.error(LexerError::MissingParamName);
        }
        (
            Some(self.emit(TokenKind::ParamName)),
            Some(State::ExpectEquals),
        )
    }

    fn expect_equals(&mut self) -> (Option<Token>, Option<State>) {
        match self.peek() {
            Some(PARAM_NAME_DELIMITER) => {
                self.pos += 1;
                (
                    Some(self.emit(TokenKind::Equals)),
                    Some(State::ScanParamValue),
                )
            }
            found => self.error(LexerError::MissingEquals { found }),
        }
    }

    fn scan_param_value(&mut self) -> (Option<Token>, Option<State>) {
        if self.peek() == Some(PARAM_QUOTE) {
            self.bump(PARAM_QUOTE);
            self.ignore();
            self.eat_while(is_qsafe_char);
            if self.peek() != Some(PARAM_QUOTE) {
                return self.error(LexerError::MissingClosingQuote);
            }
            let token = self.emit(TokenKind::ParamValue);
            self.bump(PARAM_QUOTE);
            self.ignore();
            return (Some(token), Some(State::DispatchPunctuation));
        }

        self.eat_while(is_safe_char);
        (
            Some(self.emit(TokenKind::ParamValue)),
            Some(State::DispatchPunctuation),
        )
    }

    fn scan_value(&mut self) -> (Option<Token>, Option<State>) {
        self.eat_while(is_value_char);
        (
            Some(self.emit(TokenKind::Value)),
            Some(State::ExpectLineTerminator),
        )
    }

    fn expect_line_terminator(&mut self) -> (Option<Token>, Option<State>) {
        // A missing terminator on the very last line is tolerated.
        if self.pos >= self.input.len() {
            return (Some(self.emit(TokenKind::Eof)), None);
        }
        if !self.rest().starts_with(LINE_TERMINATOR) {
            let found = self.peek().unwrap_or_default();
            return self.error(LexerError::MissingLineTerminator { found });
        }
        self.pos += LINE_TERMINATOR.len();
        let token = self.emit(TokenKind::LineEnd);
        self.line += 1;
        (Some(token), Some(State::LineStart))
    }

    fn line_start(&mut self) -> (Option<Token>, Option<State>) {
        if self.pos >= self.input.len() {
            return (Some(self.emit(TokenKind::Eof)), None);
        }
        (None, Some(State::ScanName))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Renders a token for diagnostics, e.g. `"DTSTART"`, `<BEGIN:VEVENT>`, `EOF`.
pub struct TokenDisplay<'t> {
    pub(crate) token: &'t Token,
    pub(crate) text: &'t str,
}

impl fmt::Display for TokenDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.token.kind {
            TokenKind::Eof => write!(f, "EOF"),
            TokenKind::LineEnd => write!(f, "CRLF"),
            TokenKind::Error(err) => write!(f, "{err}"),
            TokenKind::Begin(kind) => write!(f, "<BEGIN:{kind}>"),
            TokenKind::End(kind) => write!(f, "<END:{kind}>"),
            _ if self.text.chars().count() > 10 => {
                let head: String = self.text.chars().take(10).collect();
                write!(f, "{head:?}...")
            }
            _ => write!(f, "{:?}", self.text),
        }
    }
}

impl Lexer<'_> {
    pub fn display<'t>(&'t self, token: &'t Token) -> TokenDisplay<'t> {
        TokenDisplay {
            token,
            text: self.slice(token),
        }
    }
}
