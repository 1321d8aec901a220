//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest client for the DummyJSON-compatible user service
//!
//! Adapters are thin translators between domain types and wire
//! representations. They contain no business logic.

pub mod http;
