use crate::{
    component::{
        AlarmBuilder, BuildContext, Calendar, CalendarBuilder, ComponentKind, ComponentMut,
        EventBuilder, TimezoneBuilder, TimezoneTransitionBuilder, TransitionKind,
    },
    parser::{
        CancellationFlag, Lexer, Parameter, ParserError, ParserOptions, Property, Token, TokenKind,
        unfold,
    },
};

/// An open component below the calendar on the parser's stack.
#[derive(Debug)]
enum Scope {
    Event(EventBuilder),
    Alarm(AlarmBuilder),
    Timezone(TimezoneBuilder),
    Standard(TimezoneTransitionBuilder),
    Daylight(TimezoneTransitionBuilder),
}

impl Scope {
    /// Open `child` inside `parent`, `None` if the nesting is not allowed.
    fn open(parent: ComponentKind, child: ComponentKind) -> Option<Self> {
        if !parent.allows_child(child) {
            return None;
        }
        match child {
            ComponentKind::Calendar => None,
            ComponentKind::Event => Some(Self::Event(EventBuilder::new())),
            ComponentKind::Alarm => Some(Self::Alarm(AlarmBuilder::new())),
            ComponentKind::Timezone => Some(Self::Timezone(TimezoneBuilder::new())),
            ComponentKind::Standard => Some(Self::Standard(TimezoneTransitionBuilder::new(
                TransitionKind::Standard,
            ))),
            ComponentKind::Daylight => Some(Self::Daylight(TimezoneTransitionBuilder::new(
                TransitionKind::Daylight,
            ))),
        }
    }

    fn kind(&self) -> ComponentKind {
        match self {
            Self::Event(_) => ComponentKind::Event,
            Self::Alarm(_) => ComponentKind::Alarm,
            Self::Timezone(_) => ComponentKind::Timezone,
            Self::Standard(_) => ComponentKind::Standard,
            Self::Daylight(_) => ComponentKind::Daylight,
        }
    }

    fn add_content_line(&mut self, property: Property) {
        match self {
            Self::Event(comp) => comp.add_content_line(property),
            Self::Alarm(comp) => comp.add_content_line(property),
            Self::Timezone(comp) => comp.add_content_line(property),
            Self::Standard(comp) | Self::Daylight(comp) => comp.add_content_line(property),
        }
    }
}

/// Parses a stream of VCALENDAR objects.
///
/// Every item is one calendar; iteration stops after the first error. Once a calendar has been
/// read, input that does not start another `BEGIN:VCALENDAR` ends the stream.
pub struct CalendarParser<'a> {
    lexer: Lexer<'a>,
    options: ParserOptions,
    parsed: usize,
    done: bool,
}

impl<'a> CalendarParser<'a> {
    /// Return a new `CalendarParser` over folded text.
    pub fn new(input: &'a str) -> Self {
        Self::from_lexer(Lexer::new(unfold(input)))
    }

    /// Return a new `CalendarParser` over raw bytes.
    pub fn from_slice(slice: &'a [u8]) -> Result<Self, ParserError> {
        Ok(Self::from_lexer(Lexer::from_slice(slice)?))
    }

    fn from_lexer(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            options: Default::default(),
            parsed: 0,
            done: false,
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn expect_one(mut self) -> Result<Calendar, ParserError> {
        let item = self.next().ok_or(ParserError::EmptyInput)??;
        match self.next() {
            None => Ok(item),
            Some(Err(err)) => Err(err),
            Some(Ok(_)) => Err(ParserError::TooManyComponents),
        }
    }

    fn next_token(&mut self) -> Result<Token, ParserError> {
        if self
            .options
            .cancellation
            .as_ref()
            .is_some_and(CancellationFlag::is_cancelled)
        {
            return Err(ParserError::Cancelled);
        }

        // A halted lexer keeps reporting the end of input.
        let end = self.lexer.input().len();
        let token = self.lexer.next_token().unwrap_or(Token {
            kind: TokenKind::Eof,
            start: end,
            end,
            line: self.lexer.line(),
        });
        match token.kind {
            TokenKind::Error(source) => Err(ParserError::Lexer {
                line: token.line,
                source,
            }),
            _ => Ok(token),
        }
    }

    fn unexpected(&self, token: &Token, expected: &'static str) -> ParserError {
        let line = token.line;
        match token.kind {
            TokenKind::Eof => ParserError::UnexpectedEof { line },
            _ => ParserError::UnexpectedToken {
                line,
                found: self.lexer.display(token).to_string(),
                expected,
            },
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParserError> {
        let token = self.next_token()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.unexpected(&token, expected))
        }
    }

    fn expect_text(&mut self, kind: TokenKind, expected: &'static str) -> Result<String, ParserError> {
        let token = self.expect(kind, expected)?;
        Ok(self.lexer.slice(&token).to_owned())
    }

    fn build_context(&self, calendar: &CalendarBuilder) -> BuildContext {
        BuildContext {
            default_tz: self.options.default_tz.unwrap_or_default(),
            has_method: calendar.has_method(),
        }
    }

    /// `name *(";" param) ":" value CRLF`, the name token already consumed.
    fn parse_content_line(&mut self, name: Token) -> Result<Property, ParserError> {
        let mut property = Property::new(self.lexer.slice(&name), String::new());

        let mut token = self.next_token()?;
        while token.kind == TokenKind::Semicolon {
            let param_name = self.expect_text(TokenKind::ParamName, "parameter name")?;
            self.expect(TokenKind::Equals, "\"=\"")?;
            let mut values = vec![self.expect_text(TokenKind::ParamValue, "parameter value")?];
            token = self.next_token()?;
            while token.kind == TokenKind::Comma {
                values.push(self.expect_text(TokenKind::ParamValue, "parameter value")?);
                token = self.next_token()?;
            }
            property.params.insert(param_name, Parameter(values));
        }
        if token.kind != TokenKind::Colon {
            return Err(self.unexpected(&token, "\";\" or \":\""));
        }

        property.value = self.expect_text(TokenKind::Value, "property value")?;
        self.expect(TokenKind::LineEnd, "CRLF")?;
        Ok(property)
    }

    fn parse_calendar(&mut self, first: Token) -> Result<Calendar, ParserError> {
        match first.kind {
            TokenKind::Begin(ComponentKind::Calendar) => {}
            TokenKind::Begin(child) => {
                return Err(ParserError::InvalidNesting {
                    line: first.line,
                    parent: None,
                    child,
                });
            }
            _ => return Err(self.unexpected(&first, "BEGIN:VCALENDAR")),
        }
        self.expect(TokenKind::LineEnd, "CRLF")?;
        tracing::debug!(line = first.line, "Parsing calendar");

        let mut calendar = CalendarBuilder::new();
        let mut stack: Vec<Scope> = vec![];
        loop {
            let token = self.next_token()?;
            match token.kind {
                TokenKind::Name => {
                    let property = self.parse_content_line(token)?;
                    match stack.last_mut() {
                        Some(top) => top.add_content_line(property),
                        None => calendar.add_content_line(property),
                    }
                }
                TokenKind::Begin(child) => {
                    let parent = stack.last().map_or(ComponentKind::Calendar, Scope::kind);
                    let Some(scope) = Scope::open(parent, child) else {
                        return Err(ParserError::InvalidNesting {
                            line: token.line,
                            parent: Some(parent),
                            child,
                        });
                    };
                    self.expect(TokenKind::LineEnd, "CRLF")?;
                    tracing::trace!(component = %child, depth = stack.len() + 1, "Open component");
                    stack.push(scope);
                }
                TokenKind::End(kind) => match stack.pop() {
                    Some(scope) => self.close(&mut calendar, &mut stack, scope, kind, &token)?,
                    None => return self.close_calendar(calendar, kind, &token),
                },
                _ => return Err(self.unexpected(&token, "content line or component delimiter")),
            }
        }
    }

    /// Validate `scope` and hand it to its parent, the top of `stack` or the calendar.
    fn close(
        &mut self,
        calendar: &mut CalendarBuilder,
        stack: &mut [Scope],
        scope: Scope,
        kind: ComponentKind,
        token: &Token,
    ) -> Result<(), ParserError> {
        let line = token.line;
        if scope.kind() != kind {
            return Err(ParserError::MismatchedEnd {
                line,
                expected: scope.kind(),
                found: kind,
            });
        }
        tracing::trace!(component = %kind, depth = stack.len() + 1, "Close component");

        let ctx = self.build_context(calendar);
        let invalid = |source| ParserError::Validation {
            line,
            component: kind,
            source,
        };

        match (scope, stack.last_mut()) {
            (Scope::Event(event), None) => {
                calendar.add_event(event.build(&ctx).map_err(invalid)?);
            }
            (Scope::Timezone(timezone), None) => {
                calendar.add_timezone(timezone.build(&ctx).map_err(invalid)?);
            }
            (Scope::Alarm(alarm), Some(Scope::Event(event))) => {
                event.add_alarm(alarm.build(&ctx).map_err(invalid)?);
            }
            (
                Scope::Standard(transition) | Scope::Daylight(transition),
                Some(Scope::Timezone(timezone)),
            ) => {
                timezone.add_transition(transition.build(&ctx).map_err(invalid)?);
            }
            (scope, parent) => {
                return Err(ParserError::InvalidNesting {
                    line,
                    parent: Some(parent.map_or(ComponentKind::Calendar, |parent| parent.kind())),
                    child: scope.kind(),
                });
            }
        }
        self.expect(TokenKind::LineEnd, "CRLF")?;
        Ok(())
    }

    /// Validate the calendar once its `END` arrives with no component left open.
    fn close_calendar(
        &mut self,
        calendar: CalendarBuilder,
        kind: ComponentKind,
        token: &Token,
    ) -> Result<Calendar, ParserError> {
        let line = token.line;
        if kind != ComponentKind::Calendar {
            return Err(ParserError::MismatchedEnd {
                line,
                expected: ComponentKind::Calendar,
                found: kind,
            });
        }

        let ctx = self.build_context(&calendar);
        let calendar = calendar
            .build(&ctx)
            .map_err(|source| ParserError::Validation {
                line,
                component: kind,
                source,
            })?;
        // The terminator of the last line may be missing.
        let end = self.next_token()?;
        if !matches!(end.kind, TokenKind::LineEnd | TokenKind::Eof) {
            return Err(self.unexpected(&end, "CRLF"));
        }
        tracing::debug!(
            events = calendar.events.len(),
            timezones = calendar.timezones.len(),
            "Parsed calendar"
        );
        Ok(calendar)
    }

    fn ignore_trailing(&mut self, line: usize) {
        tracing::debug!(line, "Ignoring trailing input after END:VCALENDAR");
        self.done = true;
    }
}

impl Iterator for CalendarParser<'_> {
    type Item = Result<Calendar, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let token = match self.next_token() {
            Ok(token) => token,
            Err(ParserError::Lexer { line, .. }) if self.parsed > 0 => {
                self.ignore_trailing(line);
                return None;
            }
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };
        let result = match token.kind {
            TokenKind::Eof => {
                self.done = true;
                return None;
            }
            TokenKind::Begin(ComponentKind::Calendar) => self.parse_calendar(token),
            _ if self.parsed > 0 => {
                self.ignore_trailing(token.line);
                return None;
            }
            _ => self.parse_calendar(token),
        };
        match result {
            Ok(_) => self.parsed += 1,
            Err(_) => self.done = true,
        }
        Some(result)
    }
}
