//! Lead Gateway: contact form fan-out and booking proxy.

pub mod config;
pub mod error;
pub mod gateway;
pub mod integrations;
pub mod lead;
pub mod wizard;
