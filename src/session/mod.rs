//! Session Management Module
//!
//! Stateless sessions carried in a single encrypted cookie, decodable under a
//! rotating set of secrets.
//!
//! # Modules
//!
//! - [`config`] - Normalized configuration and the settings normalizer
//! - [`secrets`] - Secret ring, current secret first
//! - [`cipher`] - Encrypt/decrypt primitive (`SessionCipher`)
//! - [`codec`] - Cookie value encoding and decoding
//! - [`expiry`] - Expiry arithmetic
//! - [`rotation`] - Re-encryption under the current secret
//! - [`rolling`] - Sliding-window refresh decisions
//! - [`handle`] - Per-request session handle
//! - [`cookie`] - Outgoing cookie directives
//! - [`manager`] - Request glue
//! - [`error`] - Error types

pub mod cipher;
pub mod codec;
pub mod config;
pub mod cookie;
pub mod error;
pub mod expiry;
pub mod handle;
pub mod manager;
pub mod rolling;
pub mod rotation;
pub mod secrets;

// Re-export commonly used items for convenience
pub use cipher::{AesGcmCipher, SessionCipher};
pub use codec::{DecodeFailure, DecodeOutcome, SessionCodec, SessionData, DESTROY_SENTINEL};
pub use config::{normalize, CookieAttributes, SessionConfig};
pub use cookie::{CookieDirective, CookieFactory};
pub use error::{CipherError, ConfigurationError, SessionError};
pub use expiry::ExpiresIn;
pub use handle::{CookieSession, SessionFlags, SessionStatus};
pub use manager::{CookieHeader, CookieSource, SessionManager};
pub use rolling::RollingPolicy;
pub use secrets::{SecretEntry, SecretRing, UnknownSecretPolicy};
