use base64::Engine;
use salvo::Depot;
use salvo::http::{HeaderValue, StatusCode, header};
use tracing::error;

use crate::storage_handler::get_storage_from_depot;
use kunai_core::constants::BASIC_AUTH_CHALLENGE;
use kunai_service::storage::StorageError;

/// Depot key holding the authenticated user id.
pub const AUTHENTICATED_USER: &str = "kunai.authenticated_user";

/// ## Summary
/// Returns the user id the auth middleware stored for this request.
#[must_use]
pub fn get_principal_from_depot(depot: &Depot) -> Option<String> {
    depot.get::<String>(AUTHENTICATED_USER).ok().cloned()
}

/// ## Summary
/// Splits an `Authorization: Basic` header value into user and password.
///
/// Padding is optional; a missing colon or non-UTF-8 payload yields `None`.
#[must_use]
pub fn parse_basic_credentials(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(encoded.trim().trim_end_matches('='))
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// ## Summary
/// Authentication middleware that checks Basic credentials against storage
/// and stores the user id in the depot.
///
/// OPTIONS passes through unauthenticated. Missing or wrong credentials
/// get a 401 with a `WWW-Authenticate` challenge.
///
/// ## Side Effects
/// Inserts the authenticated user id under [`AUTHENTICATED_USER`].
#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        tracing::trace!("Authenticating request");

        if req.method() == salvo::http::Method::OPTIONS {
            return;
        }

        let storage = match get_storage_from_depot(depot) {
            Ok(storage) => storage,
            Err(e) => {
                error!(error = ?e, "Failed to get storage from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let credentials = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_basic_credentials);
        let Some((username, password)) = credentials else {
            tracing::debug!("Missing or unsupported Authorization header");
            challenge(res);
            ctrl.skip_rest();
            return;
        };

        match storage.auth_user(&username, &password).await {
            Ok(user_id) => {
                tracing::debug!(user = %user_id, "User authenticated successfully");
                depot.insert(AUTHENTICATED_USER, user_id);
            }
            Err(StorageError::InvalidCredentials | StorageError::NotFound(_)) => {
                tracing::info!(user = %username, "Rejected credentials");
                challenge(res);
                ctrl.skip_rest();
            }
            Err(e) => {
                error!(error = %e, "Authentication failed with error");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                res.body("Internal Server Error");
                ctrl.skip_rest();
            }
        }
    }
}

fn challenge(res: &mut salvo::Response) {
    res.status_code(StatusCode::UNAUTHORIZED);
    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static(BASIC_AUTH_CHALLENGE),
        true,
    );
}

/// ## Summary
/// Middleware handler for authentication.
/// Use this as a handler in routes to protect them with authentication.
pub struct AuthMiddleware;
