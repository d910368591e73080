// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]

//! # Stage Writer
//!
//! Batch-scoped staging for change-data replication.
//!
//! Upstream produces row changes grouped into batches. The writer persists
//! each batch's serialized content to exactly one staged resource, finalizes
//! it at end of batch and hands the `READY` resource to listeners.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stage_writer::config::WriterConfig;
//! use stage_writer::writer::{ChannelListener, StagingWriter, WriterListener};
//! use stage_writer::{Batch, Result};
//! use std::sync::{mpsc, Arc};
//!
//! fn main() -> Result<()> {
//!     let config = WriterConfig::from_file("writer.yaml")?;
//!     let (tx, rx) = mpsc::channel();
//!     let listener: Arc<dyn WriterListener> = Arc::new(ChannelListener::new(tx));
//!     let mut writer = StagingWriter::from_config(&config, vec![listener])?;
//!
//!     let batch = Batch::new("corp-000", "1042");
//!     writer.write(&batch, "insert,orders,\"1\",\"pending\"\n")?;
//!     writer.end_batch(&batch)?;
//!
//!     let finished = rx.recv().expect("finished batch");
//!     println!("{}", finished.resource.read_to_string()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     StagingWriter                        │
//! │  resolve(batch)   write(batch, data)   end_batch(batch)  │
//! └──────────────────────────────────────────────────────────┘
//!          │                  │                    │
//! ┌────────┴───────┬──────────┴─────────┬──────────┴────────┐
//! │ ResourceCache  │   StagingManager   │  WriterListener   │
//! ├────────────────┼────────────────────┼───────────────────┤
//! │ batch → active │ Memory             │ Channel           │
//! │ resource       │ File (.create/     │ Closures          │
//! │                │  .ready/.done)     │                   │
//! └────────────────┴────────────────────┴───────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Batch identity types
pub mod types;

/// Staged resource and staging manager contracts and implementations
pub mod stage;

/// Batch-scoped staging writer
pub mod writer;

/// Writer configuration
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::WriterConfig;
pub use stage::{ResourceId, ResourceState, StagedResource, StagingManager};
pub use writer::{StagingWriter, WriterContext, WriterListener};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
