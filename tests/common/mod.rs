//! Common test utilities for hadley.
//!
//! This module provides shared assertions and synthetic data builders.

pub mod assertions;
pub mod test_data;
