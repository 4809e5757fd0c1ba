//! Unified testing utilities for kit-session
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built settings, configs, managers and cookie values
//! - [`builders`] - Fluent builder for custom configurations
//! - [`assertions`] - Custom assertion helpers for outgoing directives
//! - [`mock`] - Cipher fakes for failure and async-backend paths
//!
//! ## Usage
//!
//! ```rust
//! use kit_session::testing::{TestConfigBuilder, TestFixtures};
//!
//! let manager = TestFixtures::rotated_manager();
//! let rolling = TestConfigBuilder::new().expires_seconds(100).rolling_percentage(10.0).manager();
//! # let _ = (manager, rolling);
//! ```

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod mock;

// Re-export commonly used items for convenience
pub use assertions::*;
pub use builders::*;
pub use fixtures::TestFixtures;
pub use mock::{FailingCipher, YieldingCipher};

/// Common test constants
pub mod constants {
    /// Default single test secret
    pub const TEST_SECRET: &str = "test_key_32_bytes_long_for_test_";

    /// Current secret of the rotated test ring (id 2)
    pub const NEW_SECRET: &str = "new";

    /// Retired secret of the rotated test ring (id 1)
    pub const OLD_SECRET: &str = "old";

    /// Tolerance for max-age comparisons, in seconds
    pub const MAX_AGE_TOLERANCE: i64 = 2;
}
