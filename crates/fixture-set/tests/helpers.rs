//! Test helpers for fixture-set integration tests.
//!
//! This module provides utility functions for locating test fixture data.

#[path = "helpers/test_data.rs"]
pub mod test_data;
