//! Staging module
//!
//! Abstract contract between the writer and the staging storage engine.
//!
//! # Overview
//!
//! The stage module provides:
//! - `StagedResource` - A stateful, append-capable sink for one batch
//! - `StagingManager` - Finds and allocates resources by identity
//! - `MemoryStagingManager` - In-process implementation
//! - `FileStagingManager` - One file per resource, state encoded in the suffix

mod file;
mod memory;
mod resource;

pub use file::{FileResource, FileStagingManager};
pub use memory::{MemoryResource, MemoryStagingManager};
pub use resource::{ResourceId, ResourceState, StagedResource, StagingManager};
