use std::fmt;

pub type ICalParseResult<T> = Result<T, ICalParseError>;

/// A malformed iCalendar document, with the 1-based line it was detected on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ICalParseError {
    pub kind: ICalParseErrorKind,
    pub line: usize,
    pub context: Option<String>,
}

impl ICalParseError {
    #[must_use]
    pub fn new(kind: ICalParseErrorKind, line: usize) -> Self {
        Self {
            kind,
            line,
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ICalParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}", self.kind, self.line)?;
        if let Some(context) = &self.context {
            write!(f, ": {context}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ICalParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ICalParseErrorKind {
    EmptyInput,
    MissingColon,
    InvalidPropertyName,
    InvalidParameter,
    UnterminatedQuote,
    /// First line is not `BEGIN`.
    MissingBegin,
    /// `END` does not close the innermost open component.
    MismatchedComponent,
    /// Input ended with components still open.
    UnexpectedEof,
    /// Content after the root component closed.
    TrailingContent,
}

impl fmt::Display for ICalParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EmptyInput => "empty input",
            Self::MissingColon => "missing ':' after property name",
            Self::InvalidPropertyName => "invalid property name",
            Self::InvalidParameter => "invalid parameter",
            Self::UnterminatedQuote => "unterminated quoted parameter value",
            Self::MissingBegin => "expected BEGIN",
            Self::MismatchedComponent => "mismatched END",
            Self::UnexpectedEof => "unexpected end of input",
            Self::TrailingContent => "content after end of calendar",
        };
        f.write_str(s)
    }
}
