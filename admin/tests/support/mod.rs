//! Shared helpers for user admin integration tests.

pub mod doubles;
