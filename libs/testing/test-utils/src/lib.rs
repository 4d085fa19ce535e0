//! Test support shared by the domain crates.
//!
//! - `TestDatabase`: throwaway PostgreSQL with the workspace migrations applied (feature: "postgres")
//! - `TestDataBuilder`: unique but reproducible serial numbers and usernames
//! - `assertions`: listing and option helpers
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn registers_a_product() {
//!     let db = TestDatabase::new().await;
//!     let data = TestDataBuilder::from_test_name("registers_a_product");
//!
//!     let serial = data.serial_number("main");
//!     let username = data.username("owner");
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Seeded generator for values that must be unique per test.
///
/// Serial numbers and usernames carry unique constraints, so tests sharing a
/// database derive them from their own name.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test name, so reruns produce the same values.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let data = TestDataBuilder::from_test_name("test_register_product");
    /// assert!(data.serial_number("a").starts_with("SN-"));
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// `SN-<seed>-<suffix>`, well within the 50 character serial limit.
    pub fn serial_number(&self, suffix: &str) -> String {
        format!("SN-{}-{}", self.seed, suffix)
    }

    /// Only uses characters accepted by username validation.
    pub fn username(&self, suffix: &str) -> String {
        format!("test_{}.{}", self.seed, suffix)
    }
}

pub mod assertions {
    /// Assert that a listing holds exactly the expected serial numbers, in order
    pub fn assert_serials<'a>(actual: impl IntoIterator<Item = &'a str>, expected: &[&str]) {
        let actual: Vec<&str> = actual.into_iter().collect();
        assert_eq!(actual, expected, "unexpected serial numbers in listing");
    }

    /// Unwrap an `Option`, naming what was missing on failure
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
