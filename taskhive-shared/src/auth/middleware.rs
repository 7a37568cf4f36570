//! Authentication context shared between middleware and handlers.
//!
//! The API server validates the `Authorization: Bearer <token>` header in
//! a middleware layer and stores an [`AuthContext`] in request extensions;
//! handlers read it back with Axum's `Extension` extractor instead of
//! re-validating the token.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;

/// Authentication context added to request extensions
///
/// Present on every request that passed the session middleware.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskhive_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates auth context from validated session claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self { user_id: claims.sub }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_from_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id);

        let context = AuthContext::from_claims(&claims);
        assert_eq!(context.user_id, user_id);
    }
}
