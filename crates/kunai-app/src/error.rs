use salvo::http::StatusCode;
use thiserror::Error;

use kunai_rfc::error::RfcError;
use kunai_service::error::ServiceError;
use kunai_service::storage::StorageError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    RfcError(#[from] RfcError),

    #[error(transparent)]
    CoreError(#[from] kunai_core::error::CoreError),

    #[error("Failed to read request body: {0}")]
    BodyError(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// ## Summary
    /// Maps the error onto the status of a plain error response.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServiceError(e) => service_status(e),
            Self::RfcError(e) => rfc_status(e),
            Self::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BodyError(_) => StatusCode::BAD_REQUEST,
        }
    }
}

fn service_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::RfcError(e) => rfc_status(e),
        ServiceError::PathError(_) => StatusCode::NOT_FOUND,
        ServiceError::StorageError(e) => match e {
            StorageError::NotFound(_) => StatusCode::NOT_FOUND,
            StorageError::AlreadyExists(_) => StatusCode::METHOD_NOT_ALLOWED,
            StorageError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            StorageError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        ServiceError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
        ServiceError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
        ServiceError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        ServiceError::ResourceTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        ServiceError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::CoreError(_) | ServiceError::InvalidConfiguration(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn rfc_status(err: &RfcError) -> StatusCode {
    match err {
        RfcError::XmlError(_) | RfcError::DavParseError(_) | RfcError::ICalParseError(_) => {
            StatusCode::BAD_REQUEST
        }
        RfcError::MergeError(_) | RfcError::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
