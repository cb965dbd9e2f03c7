//! Test organization for gamehall
//!
//! - `common`: Shared test utilities and helpers
//! - `engine`: Board, evaluation and terminal-state properties
//! - `storage`: SQLite session store on real database files
//! - `coordinator`: Session lifecycle through the coordinator

pub mod common;
pub mod coordinator;
pub mod engine;
pub mod storage;
