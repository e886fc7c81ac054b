//! Service layer
//!
//! Services contain the worker's business logic: the build pipeline, the
//! per-agent-type locks that keep builds from trampling each other, and the
//! notifier that reports outcomes back to the platform.

mod locks;
mod notifier;
mod pipeline;

pub use notifier::ResultNotifier;
pub use pipeline::{BuildPipeline, PipelineSettings};
