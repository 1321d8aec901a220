//! Inbound adapters: the command line and the text views it prints.
//!
//! Inbound code drives the domain through its public handles and never
//! reaches outbound adapters directly; the binary wires those in.

pub mod cli;
pub mod views;
