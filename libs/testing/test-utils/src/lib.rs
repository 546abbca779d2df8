//! Shared test utilities for domain testing
//!
//! - `TestDatabase`: PostgreSQL container with migrations applied and automatic cleanup (feature: "postgres")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let name = builder.name("product", "main");
//!     let stock = builder.quantity(1, 50);
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Builder for test data with deterministic randomization
///
/// Every value is derived from the seed, so a test sees the same data on
/// every run.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_checkout");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique name for testing
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let name = TestDataBuilder::new(7).name("product", "main");
    /// assert_eq!(name, "test-product-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// A number in `min..=max`, fixed for this seed
    pub fn quantity(&self, min: i32, max: i32) -> i32 {
        assert!(min <= max, "empty range {min}..={max}");
        let span = (max as i64 - min as i64 + 1) as u64;
        min + (self.seed % span) as i32
    }

    /// A price in cents between 1.00 and 999.99, fixed for this seed
    pub fn price_cents(&self) -> i64 {
        100 + (self.seed % 99_900) as i64
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that a JSON error body carries the expected code and message
    pub fn assert_error_body(body: &[u8], expected_error: &str, expected_message: &str) {
        let text = String::from_utf8_lossy(body);
        assert!(
            text.contains(&format!("\"error\":\"{}\"", expected_error)),
            "expected error {expected_error} in {text}"
        );
        assert!(
            text.contains(expected_message),
            "expected message {expected_message:?} in {text}"
        );
    }
}
