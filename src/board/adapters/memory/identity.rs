//! In-memory identity provider for tests and simulation.

use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};

use crate::board::ports::{IdentityError, IdentityProvider, UserProfile};

/// Identity provider holding a fixed signed-in user until logout.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityProvider {
    user: Arc<RwLock<Option<UserProfile>>>,
}

impl InMemoryIdentityProvider {
    /// Creates a provider with the given signed-in user.
    #[must_use]
    pub fn signed_in(profile: UserProfile) -> Self {
        Self {
            user: Arc::new(RwLock::new(Some(profile))),
        }
    }

    /// Creates a provider with nobody signed in.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn current_user(&self) -> Option<UserProfile> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn logout(&self) -> Result<(), IdentityError> {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
