//! Authenticated-user lookup.

use async_trait::async_trait;
use std::sync::RwLock;

/// Supplies the id of the signed-in user.
///
/// The session layer refuses to pause or complete without one.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the current user's id, or `None` when signed out.
    async fn current_user_id(&self) -> Option<String>;
}

/// Auth provider whose user is set by the host.
///
/// # Example
///
/// ```
/// use cadence_core::auth::StaticAuthProvider;
///
/// let auth = StaticAuthProvider::signed_in("user-1");
/// auth.sign_out();
/// ```
#[derive(Debug, Default)]
pub struct StaticAuthProvider {
    user_id: RwLock<Option<String>>,
}

impl StaticAuthProvider {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: RwLock::new(Some(user_id.into())),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user_id: impl Into<String>) {
        *self.user_id.write().unwrap_or_else(|e| e.into_inner()) = Some(user_id.into());
    }

    pub fn sign_out(&self) {
        *self.user_id.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn current_user_id(&self) -> Option<String> {
        self.user_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
