//! Writer module
//!
//! Batch-scoped staging writer and its collaborators.
//!
//! # Overview
//!
//! The writer module provides:
//! - `StagingWriter` - Resolves, appends to and finalizes one resource per batch
//! - `ResourceCache` - Batch to active resource mapping for one writer session
//! - `WriterListener` - End-of-batch callback receiving the `READY` resource
//! - `Preview` - Bounded log preview of staged content

mod cache;
mod listener;
mod preview;
mod session;
mod staging;

pub use cache::{BatchStats, CachedResource, ResourceCache};
pub use listener::{ChannelListener, FinishedBatch, WriterContext, WriterListener};
pub use preview::{Preview, DEFAULT_PREVIEW_CHARS};
pub use session::{SessionState, TableChange};
pub use staging::StagingWriter;
