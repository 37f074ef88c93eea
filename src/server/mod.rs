//! Token store endpoint for Axum.
//!
//! One POST route that verifies the caller's bearer credential against the
//! identity backend, validates the submitted provider tokens, and upserts
//! the caller's token record with service-level storage privileges. The
//! caller's credential establishes identity only — the record key is always
//! the verified user id, never client input.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tunelink::server::{token_routes, RestTokenStore, TokenServiceConfig};
//! use tunelink::IdentityClient;
//!
//! // 1. Configure from environment
//! let config = TokenServiceConfig::from_env();
//!
//! // 2. Mount the route (bring your own TokenStore or use RestTokenStore)
//! let app = axum::Router::new().merge(token_routes(
//!     config,
//!     IdentityClient::from_env()?,
//!     RestTokenStore::from_env()?,
//! ));
//! ```

mod config;
mod cors;
mod error;
mod rest_store;
mod routes;
mod state;
mod traits;
mod types;

pub use config::TokenServiceConfig;
pub use error::StoreError;
pub use rest_store::RestTokenStore;
pub use routes::token_routes;
pub use traits::{SessionVerifier, TokenStore};
pub use types::RawTokenPayload;
