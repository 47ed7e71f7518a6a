//! DAV request parse error types.

use std::fmt;

use thiserror::Error;

use crate::rfc::xml::XmlError;

/// Result type for DAV request parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// A malformed filter body. Reported as 400.
pub type FilterParseError = ParseError;

/// An error that occurred while interpreting a DAV request body.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct ParseError {
    /// Error kind.
    pub kind: ParseErrorKind,
    /// Error message.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a missing element error.
    #[must_use]
    pub fn missing_element(name: &str) -> Self {
        Self::new(
            ParseErrorKind::MissingElement,
            format!("missing required element: {name}"),
        )
    }

    /// Creates an unexpected element error.
    #[must_use]
    pub fn unexpected_element(name: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedElement,
            format!("unexpected element: {name}"),
        )
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::InvalidValue, message)
    }

    /// Creates a missing attribute error.
    #[must_use]
    pub fn missing_attribute(name: &str) -> Self {
        Self::new(
            ParseErrorKind::MissingAttribute,
            format!("missing required attribute: {name}"),
        )
    }

    /// Creates an unsupported collation error.
    #[must_use]
    pub fn unsupported_collation(name: &str) -> Self {
        Self::new(
            ParseErrorKind::UnsupportedCollation,
            format!("unsupported collation: {name}"),
        )
    }

    /// Creates an unsupported report error.
    #[must_use]
    pub fn unsupported_report(name: &str) -> Self {
        Self::new(
            ParseErrorKind::UnsupportedReport,
            format!("unsupported report: {name}"),
        )
    }
}

impl From<XmlError> for ParseError {
    fn from(err: XmlError) -> Self {
        Self::new(ParseErrorKind::XmlError, err.to_string())
    }
}

/// Parse error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The body is not well-formed XML.
    XmlError,
    /// Missing required element.
    MissingElement,
    /// Unexpected element.
    UnexpectedElement,
    /// Invalid value.
    InvalidValue,
    /// Missing required attribute.
    MissingAttribute,
    /// Collation outside the supported set.
    UnsupportedCollation,
    /// Report type this server does not implement.
    UnsupportedReport,
}

impl ParseErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::XmlError => "XML error",
            Self::MissingElement => "missing element",
            Self::UnexpectedElement => "unexpected element",
            Self::InvalidValue => "invalid value",
            Self::MissingAttribute => "missing attribute",
            Self::UnsupportedCollation => "unsupported collation",
            Self::UnsupportedReport => "unsupported report",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
