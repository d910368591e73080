//! Batch-scoped staging writer
//!
//! Maps every batch to exactly one staged resource for the lifetime of a
//! writer session, appends serialized content to it and hands the finalized
//! resource to listeners.

use super::cache::{CachedResource, ResourceCache};
use super::listener::{WriterContext, WriterListener};
use super::preview::Preview;
use super::session::{SessionState, TableChange};
use crate::config::WriterConfig;
use crate::error::{Error, Result};
use crate::stage::{ResourceState, StagedResource, StagingManager};
use crate::types::{Batch, BatchKey};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, Span};

/// Stages batch content through a [`StagingManager`]
///
/// Not safe for concurrent use; one writer serves one producer.
pub struct StagingWriter {
    /// Staging category (namespace)
    category: String,
    /// Node the batches are written on behalf of
    source_node_id: String,
    /// Allocator for staged resources
    manager: Arc<dyn StagingManager>,
    /// Notified in order at every end of batch
    listeners: Vec<Arc<dyn WriterListener>>,
    /// Active resource per batch
    cache: ResourceCache,
    /// Per-batch write optimization context
    session: SessionState,
    /// Abbreviates logged content
    preview: Preview,
    span: Span,
}

impl StagingWriter {
    /// Create a new writer
    pub fn new(
        source_node_id: impl Into<String>,
        category: impl Into<String>,
        manager: Arc<dyn StagingManager>,
        listeners: Vec<Arc<dyn WriterListener>>,
    ) -> Self {
        let source_node_id = source_node_id.into();
        let category = category.into();
        let span = tracing::debug_span!(
            "staging_writer",
            category = %category,
            source_node = %source_node_id
        );
        Self {
            category,
            source_node_id,
            manager,
            listeners,
            cache: ResourceCache::new(),
            session: SessionState::new(),
            preview: Preview::default(),
            span,
        }
    }

    /// Create a writer from configuration, building its staging manager
    pub fn from_config(
        config: &WriterConfig,
        listeners: Vec<Arc<dyn WriterListener>>,
    ) -> Result<Self> {
        config.validate()?;
        let manager = config.build_manager();
        Ok(Self::new(
            config.source_node_id.clone(),
            config.category.clone(),
            manager,
            listeners,
        )
        .with_preview(Preview::new(config.preview_chars)))
    }

    /// Set the preview used for debug logging of content
    #[must_use]
    pub fn with_preview(mut self, preview: Preview) -> Self {
        self.preview = preview;
        self
    }

    /// Resolve the resource that receives writes for `batch`
    ///
    /// Repeated calls return the same instance until the batch is finalized.
    /// On a cache miss the manager is consulted; a missing or `DONE` resource
    /// is replaced by a freshly created one, anything else is reused.
    pub fn resolve(&mut self, batch: &Batch) -> Result<Arc<dyn StagedResource>> {
        let span = self.span.clone();
        let _guard = span.enter();

        let entry = self.entry(batch)?;
        Ok(Arc::clone(&entry.resource))
    }

    /// Append a chunk of serialized content to the batch's resource
    ///
    /// Empty chunks are ignored. Writing to a resource that is no longer in
    /// state `CREATE` fails with [`Error::ResourceNotWritable`].
    pub fn write(&mut self, batch: &Batch, data: &str) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let span = self.span.clone();
        let _guard = span.enter();

        debug!("Writing staging data: {}", self.preview.abbreviate(data));

        let entry = self.entry(batch)?;
        let state = entry.resource.state();
        if !state.is_writable() {
            return Err(Error::ResourceNotWritable {
                batch: batch.source_node_batch_id(),
                state,
            });
        }
        entry
            .resource
            .append(data)
            .map_err(|e| Error::storage("append", batch.source_node_batch_id(), e))?;
        entry.stats.record_append(data);
        Ok(())
    }

    /// Finalize a batch: close its resource, mark it `READY` and notify
    /// every listener
    ///
    /// The cache entry is dropped only after all listeners succeed, so a
    /// failed finalization can be retried.
    pub fn end_batch(&mut self, batch: &Batch) -> Result<()> {
        let span = self.span.clone();
        let _guard = span.enter();
        let display_id = batch.source_node_batch_id();

        let (resource, stats) = {
            let entry = self.entry(batch)?;
            entry
                .resource
                .close()
                .map_err(|e| Error::storage("close", display_id.clone(), e))?;
            entry
                .resource
                .set_state(ResourceState::Ready)
                .map_err(|e| Error::storage("set_state", display_id.clone(), e))?;
            entry.stats.finished_at = Some(Utc::now());
            (Arc::clone(&entry.resource), entry.stats.clone())
        };

        let context = WriterContext {
            category: self.category.clone(),
            source_node_id: self.source_node_id.clone(),
            stats,
        };

        self.session.reset();

        for listener in &self.listeners {
            listener
                .end(&context, batch, &resource)
                .map_err(|e| Error::listener(listener.name(), display_id.clone(), e))?;
        }

        self.cache.remove(&batch.key());
        info!(
            "Staged batch {} ready at {} ({} appends, {} bytes)",
            display_id,
            resource.id(),
            context.stats.appends,
            context.stats.bytes
        );
        Ok(())
    }

    /// Switch the table context used for header optimization
    pub fn begin_table(&mut self, table: &str) -> TableChange {
        self.session.begin_table(table)
    }

    /// Whether the node-id header still has to be written for the current batch
    pub fn needs_node_id(&self) -> bool {
        self.session.needs_node_id()
    }

    pub fn mark_node_id_flushed(&mut self) {
        self.session.mark_node_id_flushed();
    }

    /// Whether `batch` currently has an active resource
    pub fn is_cached(&self, batch: &Batch) -> bool {
        self.cache.contains(&batch.key())
    }

    /// Batches with an active resource
    pub fn cached_batches(&self) -> Vec<BatchKey> {
        self.cache.keys()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn source_node_id(&self) -> &str {
        &self.source_node_id
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn entry(&mut self, batch: &Batch) -> Result<&mut CachedResource> {
        let manager = self.manager.as_ref();
        let category = self.category.as_str();
        self.cache
            .get_or_try_insert_with(batch.key(), || find_or_create(manager, category, batch))
    }
}

/// Cache-miss path of resolution
fn find_or_create(
    manager: &dyn StagingManager,
    category: &str,
    batch: &Batch,
) -> Result<Arc<dyn StagedResource>> {
    let location = batch.staged_location();
    let batch_id = batch.batch_id();

    let found = manager
        .find(category, location, batch_id)
        .map_err(|e| Error::storage("find", batch.source_node_batch_id(), e))?;

    match found {
        Some(resource) if resource.state() != ResourceState::Done => {
            debug!(
                "Reusing staged resource for batch {} in state {}",
                batch.source_node_batch_id(),
                resource.state()
            );
            Ok(resource)
        }
        _ => {
            debug!(
                "Creating staged resource for batch {}",
                batch.source_node_batch_id()
            );
            manager
                .create(category, location, batch_id)
                .map_err(|e| Error::storage("create", batch.source_node_batch_id(), e))
        }
    }
}
