//! Identity provider port.

use crate::board::domain::OwnerId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    id: OwnerId,
    display_name: Option<String>,
    email: Option<String>,
}

impl UserProfile {
    /// Creates a profile with only an identity.
    #[must_use]
    pub const fn new(id: OwnerId) -> Self {
        Self {
            id,
            display_name: None,
            email: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Returns the owner identity.
    #[must_use]
    pub const fn id(&self) -> OwnerId {
        self.id
    }

    /// Returns the best human-readable label: display name, then email.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.display_name.as_deref().or(self.email.as_deref())
    }
}

/// Errors returned by identity provider implementations.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// The identity provider could not complete the request.
    #[error("identity provider unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl IdentityError {
    /// Wraps a provider failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}

/// Hosted identity provider contract.
///
/// The core treats the absence of a current user as "no data to load".
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the signed-in user, if any.
    fn current_user(&self) -> Option<UserProfile>;

    /// Signs the current user out.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Unavailable`] when the provider rejects the
    /// request.
    async fn logout(&self) -> Result<(), IdentityError>;
}
