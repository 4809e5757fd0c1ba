//! Custom assertion helpers for outgoing session directives

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::session::codec::Decoded;
use crate::session::{CookieDirective, CookieSession, DecodeOutcome, SessionManager};

use super::constants::MAX_AGE_TOLERANCE;

/// Assert that the handle has a pending `Set` directive and return its value
/// and max-age
///
/// # Panics
///
/// Panics if no directive or a destroy directive is pending.
pub fn assert_set_directive<T>(session: &CookieSession<T>) -> (String, i64)
where
    T: Serialize + DeserializeOwned + Clone,
{
    match session.directive() {
        Some(CookieDirective::Set {
            value,
            max_age_seconds,
        }) => (value.clone(), *max_age_seconds),
        other => panic!("Expected a set directive, got {other:?}"),
    }
}

/// Assert that the handle has a pending destroy directive
///
/// # Panics
///
/// Panics if the pending directive is not a destroy directive.
pub fn assert_destroy_directive<T>(session: &CookieSession<T>)
where
    T: Serialize + DeserializeOwned + Clone,
{
    assert_eq!(
        session.directive(),
        Some(&CookieDirective::Destroy),
        "Expected a destroy directive"
    );
}

/// Assert that the handle will not emit any cookie
///
/// # Panics
///
/// Panics if a directive is pending.
pub fn assert_no_directive<T>(session: &CookieSession<T>)
where
    T: Serialize + DeserializeOwned + Clone,
{
    assert!(
        session.directive().is_none(),
        "Expected no directive, got {:?}",
        session.directive()
    );
}

/// Assert that a max-age is within tolerance of the expected seconds
///
/// # Panics
///
/// Panics if the difference exceeds the tolerance.
pub fn assert_max_age_close(actual: i64, expected: i64) {
    assert!(
        (actual - expected).abs() <= MAX_AGE_TOLERANCE,
        "Expected max-age close to {expected}, got {actual}"
    );
}

/// Decode an outgoing cookie value with the manager's ring
///
/// # Panics
///
/// Panics if the value does not decode.
pub async fn decode_value<T: DeserializeOwned>(manager: &SessionManager, value: &str) -> Decoded<T> {
    match manager
        .codec()
        .decode::<T>(value, manager.config().secrets(), manager.config().unknown_secret())
        .await
    {
        DecodeOutcome::Decoded(decoded) => decoded,
        DecodeOutcome::NoSession => panic!("Expected a session, value decoded to no session"),
        DecodeOutcome::Failed(reason) => panic!("Expected a session, decode failed: {reason}"),
    }
}
