//! Storage tests on real database files
//!
//! Every test gets its own TestEnvironment so databases never leak between
//! tests.

pub mod session_store;
