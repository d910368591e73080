//! Staged resource and staging manager contracts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

/// Lifecycle state of a staged resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceState {
    /// Open for writing
    Create,
    /// Closed and readable
    Ready,
    /// Consumed downstream and retired
    Done,
}

impl ResourceState {
    /// All states, in lifecycle order
    pub const ALL: [ResourceState; 3] = [Self::Create, Self::Ready, Self::Done];

    /// File extension used by file-backed resources
    pub fn extension(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Ready => "ready",
            Self::Done => "done",
        }
    }

    /// Whether content may still be appended
    pub fn is_writable(self) -> bool {
        self == Self::Create
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "CREATE",
            Self::Ready => "READY",
            Self::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Identity of a staged resource: (category, location, batch id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub category: String,
    pub location: String,
    pub batch_id: String,
}

impl ResourceId {
    pub fn new(
        category: impl Into<String>,
        location: impl Into<String>,
        batch_id: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            location: location.into(),
            batch_id: batch_id.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.category, self.location, self.batch_id)
    }
}

/// A named, stateful output sink for one batch's serialized content
///
/// Resources are shared as `Arc<dyn StagedResource>` between the writer and
/// its listeners, so every method takes `&self`; implementations own their
/// interior locking.
pub trait StagedResource: Send + Sync + fmt::Debug {
    /// Identity triple this resource was found or created with
    fn id(&self) -> &ResourceId;

    /// Current lifecycle state
    fn state(&self) -> ResourceState;

    /// Move the resource to a new lifecycle state
    fn set_state(&self, state: ResourceState) -> io::Result<()>;

    /// Append serialized text to the write side
    fn append(&self, text: &str) -> io::Result<()>;

    /// Flush and release the write-side handle. Closing twice is a no-op.
    fn close(&self) -> io::Result<()>;

    /// Open a reader over everything written so far
    fn reader(&self) -> io::Result<Box<dyn Read + Send>>;

    /// Read the whole content as UTF-8
    fn read_to_string(&self) -> io::Result<String> {
        let mut content = String::new();
        self.reader()?.read_to_string(&mut content)?;
        Ok(content)
    }
}

/// Locates and allocates staged resources by identity
pub trait StagingManager: Send + Sync {
    /// Look up an existing resource
    fn find(
        &self,
        category: &str,
        location: &str,
        batch_id: &str,
    ) -> io::Result<Option<Arc<dyn StagedResource>>>;

    /// Allocate a fresh resource in state `CREATE`, replacing any previous
    /// resource with the same identity
    fn create(
        &self,
        category: &str,
        location: &str,
        batch_id: &str,
    ) -> io::Result<Arc<dyn StagedResource>>;
}
