//! Repository layer
//!
//! Repositories are thin adapters over the platform API. They give the build
//! pipeline small, focused interfaces without any business logic, so the
//! pipeline can run against in-memory implementations in tests.

mod artifacts;
mod events;
mod payloads;

// Re-export traits
pub use artifacts::ArtifactRepository;
pub use events::EventRepository;
pub use payloads::PayloadRepository;

// Re-export implementations
pub use artifacts::HttpArtifactRepository;
pub use events::HttpEventRepository;
pub use payloads::HttpPayloadRepository;
