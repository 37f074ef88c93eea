use std::future::Future;

use crate::identity::{AuthUser, IdentityClient};
use crate::types::TokenRecord;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Resolves a caller's bearer credential to an authenticated user.
///
/// Any error — network, malformed credential, backend rejection — is
/// treated by the endpoint as `Unauthenticated`: the request aborts before
/// storage is touched.
pub trait SessionVerifier: Send + Sync + 'static {
    /// Resolve `bearer` to its user, or fail if the credential is invalid.
    fn resolve(&self, bearer: &str) -> impl Future<Output = Result<AuthUser, BoxError>> + Send;
}

/// Consumer-provided token persistence.
///
/// The implementation must perform a storage-level atomic insert-or-replace
/// keyed by `record.id` — never read-then-write — so overlapping requests
/// for the same user cannot lose an update. It runs with service-level
/// privileges distinct from the caller's own.
///
/// # Example
///
/// ```rust,ignore
/// impl TokenStore for MyAppState {
///     async fn upsert(
///         &self,
///         record: &TokenRecord,
///     ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///         sqlx::query(
///             "INSERT INTO user_tokens (id, access_token, refresh_token, expires_at) \
///              VALUES ($1, $2, $3, $4) \
///              ON CONFLICT (id) DO UPDATE SET access_token = $2, refresh_token = $3, expires_at = $4",
///         )
///         .bind(record.id.0)
///         // ...
///         .execute(&self.pool)
///         .await?;
///         Ok(())
///     }
/// }
/// ```
pub trait TokenStore: Send + Sync + 'static {
    /// Insert or wholly replace the record for `record.id`.
    fn upsert(&self, record: &TokenRecord) -> impl Future<Output = Result<(), BoxError>> + Send;
}

impl SessionVerifier for IdentityClient {
    async fn resolve(&self, bearer: &str) -> Result<AuthUser, BoxError> {
        self.get_user(bearer).await.map_err(Into::into)
    }
}
