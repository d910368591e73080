//! End-of-batch listeners

use super::cache::BatchStats;
use crate::stage::StagedResource;
use crate::types::Batch;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Context handed to listeners alongside a finished batch
#[derive(Debug, Clone)]
pub struct WriterContext {
    /// Staging category the writer writes under
    pub category: String,
    /// Node the writer runs on behalf of
    pub source_node_id: String,
    /// Counters for the batch being finished
    pub stats: BatchStats,
}

/// Receives every finalized batch, synchronously, in registration order
///
/// The resource is `READY` when `end` is called and must be treated as
/// read-only.
pub trait WriterListener: Send + Sync {
    /// Name used in error reports
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn end(
        &self,
        context: &WriterContext,
        batch: &Batch,
        resource: &Arc<dyn StagedResource>,
    ) -> anyhow::Result<()>;
}

impl<F> WriterListener for F
where
    F: Fn(&WriterContext, &Batch, &Arc<dyn StagedResource>) -> anyhow::Result<()> + Send + Sync,
{
    fn end(
        &self,
        context: &WriterContext,
        batch: &Batch,
        resource: &Arc<dyn StagedResource>,
    ) -> anyhow::Result<()> {
        self(context, batch, resource)
    }
}

/// A finalized batch ready for transport
#[derive(Debug, Clone)]
pub struct FinishedBatch {
    pub batch: Batch,
    pub resource: Arc<dyn StagedResource>,
    pub stats: BatchStats,
}

/// Forwards finished batches to a channel consumed by a transport thread
#[derive(Debug)]
pub struct ChannelListener {
    tx: Sender<FinishedBatch>,
}

impl ChannelListener {
    pub fn new(tx: Sender<FinishedBatch>) -> Self {
        Self { tx }
    }
}

impl WriterListener for ChannelListener {
    fn name(&self) -> &str {
        "channel"
    }

    fn end(
        &self,
        context: &WriterContext,
        batch: &Batch,
        resource: &Arc<dyn StagedResource>,
    ) -> anyhow::Result<()> {
        self.tx
            .send(FinishedBatch {
                batch: batch.clone(),
                resource: Arc::clone(resource),
                stats: context.stats.clone(),
            })
            .map_err(|_| anyhow::anyhow!("receiver for finished batches was dropped"))
    }
}
