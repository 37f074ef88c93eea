#![doc = include_str!("../README.md")]

pub mod error;
pub mod identity;
pub mod observer;
pub mod relay;
#[cfg(feature = "server")]
pub mod server;
pub mod session;
pub mod types;

// Re-exports for convenient access
pub use error::Error;
pub use identity::{AuthUser, IdentityClient};
pub use observer::{AuthEventFeed, AuthSubscription};
pub use relay::{RelayOutcome, TokenRelay};
pub use session::{AuthEvent, Session, SessionUser};
pub use types::{TokenPayload, TokenRecord, UserId};
