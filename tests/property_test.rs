// tests/property_test.rs

//! Property-based tests for OpalCache
//!
//! These tests verify invariants that must hold for any seeded cluster
//! state, regardless of input values.

// Import TestCluster from integration tests
#[path = "integration/test_helpers.rs"]
mod test_helpers;

mod property {
    pub mod invariants_test;
}
