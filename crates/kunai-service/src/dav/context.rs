//! Request-scoped state shared by the PROPFIND and REPORT pipelines.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use kunai_core::config::DavConfig;

use crate::error::{ServiceError, ServiceResult};
use crate::resource::{PathCodec, Resource};
use crate::storage::{Storage, StorageError};

/// ## Summary
/// Everything a pipeline needs to answer one request.
///
/// Cloning is cheap; the storage handle is shared.
#[derive(Clone)]
pub struct DavContext {
    pub storage: Arc<dyn Storage>,
    pub codec: PathCodec,
    pub config: DavConfig,
    /// Authenticated user, if any.
    pub principal: Option<String>,
    pub cancel: CancellationToken,
}

impl DavContext {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: DavConfig) -> Self {
        Self {
            storage,
            codec: PathCodec::from_config(&config),
            config,
            principal: None,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_principal(mut self, user_id: impl Into<String>) -> Self {
        self.principal = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// ## Summary
    /// Fails fast once the request has been cancelled.
    ///
    /// ## Errors
    /// Returns [`ServiceError::Cancelled`] if the token has fired.
    pub fn check_cancelled(&self) -> ServiceResult<()> {
        if self.cancel.is_cancelled() {
            tracing::debug!("Request cancelled, stopping pipeline");
            return Err(ServiceError::Cancelled);
        }
        Ok(())
    }

    /// ## Summary
    /// Checks that the authenticated user owns the resource's tree.
    ///
    /// The service root belongs to everyone who is signed in.
    ///
    /// ## Errors
    /// Returns `NotAuthenticated` without a principal and `Forbidden` when the
    /// resource belongs to another user.
    pub fn ensure_owner(&self, resource: &Resource) -> ServiceResult<()> {
        let Some(principal) = self.principal.as_deref() else {
            return Err(ServiceError::NotAuthenticated);
        };
        match resource.user_id() {
            Some(owner) if owner != principal => {
                tracing::debug!(%principal, %owner, "Access to another user's tree denied");
                Err(ServiceError::Forbidden(format!("{resource} belongs to {owner}")))
            }
            _ => Ok(()),
        }
    }

    /// ## Summary
    /// Confirms that the addressed resource exists in storage.
    ///
    /// ## Errors
    /// Returns [`StorageError::NotFound`] if any record along the path is
    /// missing, or the backend error if the lookup fails.
    pub async fn ensure_exists(&self, resource: &Resource) -> ServiceResult<()> {
        let missing = || StorageError::NotFound(resource.to_string());
        match (resource.user_id(), resource.calendar_id(), resource.object_id()) {
            (None, None, None) => Ok(()),
            (Some(user), None, None) => {
                self.storage.get_user(user).await?;
                Ok(())
            }
            (Some(user), Some(calendar), None) => {
                self.storage.get_calendar(user, calendar).await?;
                Ok(())
            }
            (Some(user), Some(calendar), Some(object)) => {
                self.storage.get_object(user, calendar, object).await?;
                Ok(())
            }
            _ => Err(missing().into()),
        }
    }
}

impl std::fmt::Debug for DavContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DavContext")
            .field("prefix", &self.codec.prefix())
            .field("principal", &self.principal)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
