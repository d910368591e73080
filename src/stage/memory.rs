//! In-memory staging manager
//!
//! Keeps resources in process memory. Useful for tests and for pipelines
//! that hand staged batches straight to an in-process consumer.

use super::resource::{ResourceId, ResourceState, StagedResource, StagingManager};
use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct Inner {
    state: ResourceState,
    chunks: Vec<String>,
    open: bool,
    closes: usize,
}

/// Resource whose content lives in memory
#[derive(Debug)]
pub struct MemoryResource {
    id: ResourceId,
    inner: Mutex<Inner>,
}

impl MemoryResource {
    /// Create a resource in state `CREATE`
    pub fn new(id: ResourceId) -> Self {
        Self::with_state(id, ResourceState::Create)
    }

    /// Create a resource already in the given state
    pub fn with_state(id: ResourceId, state: ResourceState) -> Self {
        Self {
            id,
            inner: Mutex::new(Inner {
                state,
                chunks: Vec::new(),
                open: true,
                closes: 0,
            }),
        }
    }

    /// Every appended chunk, in order
    pub fn chunks(&self) -> Vec<String> {
        lock(&self.inner).chunks.clone()
    }

    /// Number of times `close` was called
    pub fn close_count(&self) -> usize {
        lock(&self.inner).closes
    }

    /// Whether the write side is still open
    pub fn is_open(&self) -> bool {
        lock(&self.inner).open
    }
}

impl StagedResource for MemoryResource {
    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn state(&self) -> ResourceState {
        lock(&self.inner).state
    }

    fn set_state(&self, state: ResourceState) -> io::Result<()> {
        lock(&self.inner).state = state;
        Ok(())
    }

    fn append(&self, text: &str) -> io::Result<()> {
        let mut inner = lock(&self.inner);
        // a closed sink reopens on append, like a file reopened in append mode
        inner.open = true;
        inner.chunks.push(text.to_string());
        Ok(())
    }

    fn close(&self) -> io::Result<()> {
        let mut inner = lock(&self.inner);
        inner.open = false;
        inner.closes += 1;
        Ok(())
    }

    fn reader(&self) -> io::Result<Box<dyn Read + Send>> {
        let content = lock(&self.inner).chunks.concat();
        Ok(Box::new(Cursor::new(content.into_bytes())))
    }
}

/// Staging manager backed by a map of in-memory resources
#[derive(Debug, Default)]
pub struct MemoryStagingManager {
    resources: Mutex<HashMap<ResourceId, Arc<MemoryResource>>>,
    finds: AtomicUsize,
    creates: AtomicUsize,
}

impl MemoryStagingManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing resource, as if left over from a previous run
    pub fn insert(&self, resource: Arc<MemoryResource>) {
        lock(&self.resources).insert(resource.id().clone(), resource);
    }

    /// Concrete handle to a stored resource
    pub fn get(&self, id: &ResourceId) -> Option<Arc<MemoryResource>> {
        lock(&self.resources).get(id).cloned()
    }

    /// Number of `find` calls served
    pub fn find_calls(&self) -> usize {
        self.finds.load(Ordering::Relaxed)
    }

    /// Number of `create` calls served
    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::Relaxed)
    }

    /// Number of stored resources
    pub fn len(&self) -> usize {
        lock(&self.resources).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StagingManager for MemoryStagingManager {
    fn find(
        &self,
        category: &str,
        location: &str,
        batch_id: &str,
    ) -> io::Result<Option<Arc<dyn StagedResource>>> {
        self.finds.fetch_add(1, Ordering::Relaxed);
        let id = ResourceId::new(category, location, batch_id);
        Ok(lock(&self.resources)
            .get(&id)
            .map(|r| Arc::clone(r) as Arc<dyn StagedResource>))
    }

    fn create(
        &self,
        category: &str,
        location: &str,
        batch_id: &str,
    ) -> io::Result<Arc<dyn StagedResource>> {
        self.creates.fetch_add(1, Ordering::Relaxed);
        let id = ResourceId::new(category, location, batch_id);
        let resource = Arc::new(MemoryResource::new(id.clone()));
        lock(&self.resources).insert(id, Arc::clone(&resource));
        Ok(resource)
    }
}
