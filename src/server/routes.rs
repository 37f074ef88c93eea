use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use time::OffsetDateTime;

use super::config::TokenServiceConfig;
use super::cors;
use super::error::StoreError;
use super::state::TokenState;
use super::traits::{SessionVerifier, TokenStore};
use super::types::RawTokenPayload;
use crate::types::TokenRecord;

/// Create the token store router.
pub fn token_routes<V, S>(config: TokenServiceConfig, verifier: V, store: S) -> Router
where
    V: SessionVerifier,
    S: TokenStore,
{
    Router::new()
        .route(
            &config.tokens_path,
            post(store_tokens::<V, S>).options(preflight),
        )
        .with_state(TokenState::new(verifier, store))
}

// ── Store ──────────────────────────────────────────────────────────

async fn store_tokens<V: SessionVerifier, S: TokenStore>(
    State(state): State<TokenState<V, S>>,
    headers: HeaderMap,
    payload: Result<Json<RawTokenPayload>, JsonRejection>,
) -> Result<impl IntoResponse, StoreError> {
    // Identity first: nothing touches storage for an unverified caller.
    let bearer = bearer_credential(&headers).ok_or(StoreError::Unauthenticated)?;
    let user = state.verifier.resolve(bearer).await.map_err(|e| {
        tracing::warn!(error = %e, "bearer credential verification failed");
        StoreError::Unauthenticated
    })?;

    let Json(raw) = payload.map_err(|_| StoreError::InvalidPayload("malformed request body"))?;
    let payload = raw.validate()?;

    // The record key is the verified identity, never client input.
    let record = TokenRecord::from_payload(user.id, payload, OffsetDateTime::now_utc());
    state
        .store
        .upsert(&record)
        .await
        .map_err(StoreError::Storage)?;

    tracing::info!(user_id = %record.id, "provider tokens stored");
    Ok((
        StatusCode::OK,
        cors::cors_headers(),
        Json(json!({ "message": "Tokens stored successfully" })),
    ))
}

// ── Preflight ──────────────────────────────────────────────────────

async fn preflight() -> impl IntoResponse {
    (StatusCode::OK, cors::cors_headers(), "ok")
}

// ── Helpers ────────────────────────────────────────────────────────

fn bearer_credential(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|credential| !credential.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use time::{Duration, OffsetDateTime};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::identity::AuthUser;
    use crate::types::UserId;

    const VALID_BEARER: &str = "valid-session";

    fn user_one() -> UserId {
        UserId("67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap())
    }

    /// Verifier accepting exactly one credential, mapped to a fixed user.
    struct SingleUserVerifier {
        user: AuthUser,
    }

    impl SessionVerifier for SingleUserVerifier {
        async fn resolve(
            &self,
            bearer: &str,
        ) -> Result<AuthUser, Box<dyn std::error::Error + Send + Sync>> {
            if bearer == VALID_BEARER {
                Ok(self.user.clone())
            } else {
                Err("invalid or expired credential".into())
            }
        }
    }

    /// In-memory store with a shared handle for assertions.
    #[derive(Clone, Default)]
    struct MemoryStore {
        records: Arc<Mutex<HashMap<UserId, TokenRecord>>>,
        fail: bool,
    }

    impl TokenStore for MemoryStore {
        async fn upsert(
            &self,
            record: &TokenRecord,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            if self.fail {
                return Err("storage offline".into());
            }
            self.records
                .lock()
                .unwrap()
                .insert(record.id, record.clone());
            Ok(())
        }
    }

    fn app_with(store: MemoryStore) -> Router {
        let verifier = SingleUserVerifier {
            user: AuthUser {
                id: user_one(),
                email: Some("u1@example.com".into()),
            },
        };
        token_routes(TokenServiceConfig::new(), verifier, store)
    }

    fn post_request(bearer: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/tokens/spotify")
            .header(CONTENT_TYPE, "application/json");
        if let Some(bearer) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {bearer}"));
        }
        builder.body(Body::from(body.to_owned())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn store_creates_exactly_one_record() {
        let store = MemoryStore::default();
        let app = app_with(store.clone());
        let before = OffsetDateTime::now_utc();

        let response = app
            .oneshot(post_request(
                Some(VALID_BEARER),
                r#"{"access_token":"AT1","refresh_token":"RT1","expires_in":3600}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Tokens stored successfully");

        let records = store.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[&user_one()];
        assert_eq!(record.access_token, "AT1");
        assert_eq!(record.refresh_token, "RT1");
        let expected = before + Duration::seconds(3600);
        assert!((record.expires_at - expected).abs() < Duration::seconds(5));
    }

    #[tokio::test]
    async fn second_store_overwrites_all_fields() {
        let store = MemoryStore::default();
        let app = app_with(store.clone());

        let first = app
            .clone()
            .oneshot(post_request(
                Some(VALID_BEARER),
                r#"{"access_token":"AT1","refresh_token":"RT1","expires_in":3600}"#,
            ))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let before = OffsetDateTime::now_utc();
        let second = app
            .oneshot(post_request(
                Some(VALID_BEARER),
                r#"{"access_token":"AT2","refresh_token":"RT2","expires_in":7200}"#,
            ))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);

        let records = store.records.lock().unwrap();
        assert_eq!(records.len(), 1, "still exactly one record per user");
        let record = &records[&user_one()];
        assert_eq!(record.access_token, "AT2");
        assert_eq!(record.refresh_token, "RT2");
        let expected = before + Duration::seconds(7200);
        assert!((record.expires_at - expected).abs() < Duration::seconds(5));
    }

    #[tokio::test]
    async fn oversized_expires_in_stores_with_saturated_expiry() {
        let store = MemoryStore::default();
        let app = app_with(store.clone());
        let before = OffsetDateTime::now_utc();

        let response = app
            .oneshot(post_request(
                Some(VALID_BEARER),
                r#"{"access_token":"AT1","refresh_token":"RT1","expires_in":1000000000000}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let records = store.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[&user_one()].expires_at > before);
    }

    #[tokio::test]
    async fn invalid_bearer_never_touches_storage() {
        let store = MemoryStore::default();
        let app = app_with(store.clone());

        let response = app
            .oneshot(post_request(
                Some("forged-credential"),
                r#"{"access_token":"AT1","refresh_token":"RT1","expires_in":3600}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("bearer"));
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_authorization_header_is_rejected() {
        let store = MemoryStore::default();
        let app = app_with(store.clone());

        let response = app
            .oneshot(post_request(
                None,
                r#"{"access_token":"AT1","refresh_token":"RT1","expires_in":3600}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_refresh_token_is_rejected() {
        let store = MemoryStore::default();
        let app = app_with(store.clone());

        let response = app
            .oneshot(post_request(
                Some(VALID_BEARER),
                r#"{"access_token":"AT1","expires_in":3600}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("refresh_token"));
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let store = MemoryStore::default();
        let app = app_with(store.clone());

        let response = app
            .oneshot(post_request(Some(VALID_BEARER), "not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("malformed"));
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn storage_failure_surfaces_without_partial_state() {
        let store = MemoryStore {
            fail: true,
            ..MemoryStore::default()
        };
        let app = app_with(store.clone());

        let response = app
            .oneshot(post_request(
                Some(VALID_BEARER),
                r#"{"access_token":"AT1","refresh_token":"RT1","expires_in":3600}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("Storage error"));
    }

    #[tokio::test]
    async fn preflight_answers_ok_with_cors_headers() {
        let app = app_with(MemoryStore::default());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/tokens/spotify")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
        assert_eq!(
            response.headers()["access-control-allow-headers"],
            "authorization, x-client-info, apikey, content-type"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn responses_carry_cors_headers() {
        let app = app_with(MemoryStore::default());

        let response = app
            .oneshot(post_request(
                Some(VALID_BEARER),
                r#"{"access_token":"AT1","refresh_token":"RT1","expires_in":3600}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn success_response_never_echoes_tokens() {
        let app = app_with(MemoryStore::default());

        let response = app
            .oneshot(post_request(
                Some(VALID_BEARER),
                r#"{"access_token":"AT1","refresh_token":"RT1","expires_in":3600}"#,
            ))
            .await
            .unwrap();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("AT1"));
        assert!(!text.contains("RT1"));
    }

    #[test]
    fn bearer_credential_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_credential(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_credential(&headers), Some("abc123"));

        headers.insert(AUTHORIZATION, "Basic abc123".parse().unwrap());
        assert_eq!(bearer_credential(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(bearer_credential(&headers), None);
    }
}
