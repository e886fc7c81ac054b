//! Core domain types
//!
//! Records owned by the platform's storage layer. The build worker only reads
//! them, with the single exception of the payload's `built` flag.
//! All of them use the platform's PascalCase JSON field names.

pub mod agent;
pub mod build;
pub mod payload;
pub mod transport;
