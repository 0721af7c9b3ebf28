//! Data models of the console backend.
//!
//! These types are the typed projection of what the emulator returns. They
//! serialize to the camelCase JSON the browser UI consumes, and the SDK
//! adapters in `services::aws` map service responses into them with explicit
//! defaults.

pub mod bucket;
pub mod connection;
pub mod envelope;
pub mod identity;
pub mod multipart;
pub mod object;
pub mod queue;
pub mod tag;
pub mod topic;
pub mod tree;
