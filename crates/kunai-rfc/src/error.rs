use thiserror::Error;

use crate::rfc::dav::build::MergeError;
use crate::rfc::dav::parse::ParseError;
use crate::rfc::ical::parse::ICalParseError;
use crate::rfc::xml::XmlError;

/// RFC parsing and serialization errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error(transparent)]
    XmlError(#[from] XmlError),

    #[error(transparent)]
    DavParseError(#[from] ParseError),

    #[error(transparent)]
    ICalParseError(#[from] ICalParseError),

    #[error(transparent)]
    MergeError(#[from] MergeError),

    #[error(transparent)]
    CoreError(#[from] kunai_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
