//! HTTP outbound adapters.
//!
//! This module provides a thin reqwest implementation of the
//! `UserDirectory` port.

mod dto;
mod user_directory;

pub use user_directory::HttpUserDirectory;
