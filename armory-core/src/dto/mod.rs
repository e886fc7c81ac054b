//! Data Transfer Objects for communication with the platform
//!
//! Requests consumed by the build worker and the events it emits back.

pub mod build;
pub mod event;
pub mod payload;
