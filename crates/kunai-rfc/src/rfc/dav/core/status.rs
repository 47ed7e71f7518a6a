//! Status lines carried in multistatus bodies.

/// HTTP status for a propstat group or a bare response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
    /// 403 Forbidden
    Forbidden,
    /// 500 Internal Server Error
    InternalServerError,
    /// 400 Bad Request
    BadRequest,
}

impl Status {
    /// Returns the status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NotFound => 404,
            Self::Forbidden => 403,
            Self::InternalServerError => 500,
            Self::BadRequest => 400,
        }
    }

    /// Returns the status line, e.g. `HTTP/1.1 200 OK`.
    #[must_use]
    pub fn status_line(self) -> String {
        format!("HTTP/1.1 {} {}", self.code(), self.reason_phrase())
    }

    /// Returns the reason phrase.
    #[must_use]
    pub const fn reason_phrase(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotFound => "Not Found",
            Self::Forbidden => "Forbidden",
            Self::InternalServerError => "Internal Server Error",
            Self::BadRequest => "Bad Request",
        }
    }
}
