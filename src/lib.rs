#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the kit-session crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod session;
pub mod settings;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use session::{
    normalize, CookieSession, SessionConfig, SessionData, SessionError, SessionManager,
};
pub use settings::SessionSettings;
