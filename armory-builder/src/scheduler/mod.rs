//! Scheduler layer for the worker
//!
//! This layer polls the platform for build requests and runs each one it is
//! responsible for through the build pipeline.

pub mod poller;

pub use poller::BuildPoller;
