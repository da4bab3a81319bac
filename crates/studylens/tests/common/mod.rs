//! Shared test utilities for studylens integration tests.
//!
//! This module provides:
//! - `TestHarness` running the real pipeline against an in-memory store and
//!   temporary upload/audio directories
//! - Scripted backends standing in for the vision, summary, quiz and speech services
//! - Builders for small PDF and DOCX fixtures

pub mod backends;
pub mod builders;
pub mod harness;

pub use backends::*;
pub use builders::*;
pub use harness::TestHarness;
