use thiserror::Error;

use crate::resource::PathError;
use crate::storage::StorageError;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    RfcError(#[from] kunai_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] kunai_core::error::CoreError),

    #[error(transparent)]
    PathError(#[from] PathError),

    #[error(transparent)]
    StorageError(#[from] StorageError),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Resource of {0} bytes exceeds the size limit")]
    ResourceTooLarge(usize),

    #[error("Request cancelled")]
    Cancelled,
}

impl From<kunai_rfc::rfc::dav::parse::ParseError> for ServiceError {
    fn from(err: kunai_rfc::rfc::dav::parse::ParseError) -> Self {
        Self::RfcError(err.into())
    }
}

impl From<kunai_rfc::rfc::ical::parse::ICalParseError> for ServiceError {
    fn from(err: kunai_rfc::rfc::ical::parse::ICalParseError) -> Self {
        Self::RfcError(err.into())
    }
}

impl From<kunai_rfc::rfc::dav::build::MergeError> for ServiceError {
    fn from(err: kunai_rfc::rfc::dav::build::MergeError) -> Self {
        Self::RfcError(err.into())
    }
}

impl From<kunai_rfc::rfc::xml::XmlError> for ServiceError {
    fn from(err: kunai_rfc::rfc::xml::XmlError) -> Self {
        Self::RfcError(err.into())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
