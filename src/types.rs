//! Common types used throughout the staging writer
//!
//! This module contains the batch identity types shared by the staging
//! layer and the writer.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Categories
// ============================================================================

/// Well-known staging categories
pub mod category {
    /// Batches staged on their way out to another node
    pub const OUTGOING: &str = "outgoing";
}

// ============================================================================
// Batch
// ============================================================================

/// Identity key of a batch: source node id plus batch id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchKey {
    /// Node that produced the batch
    pub source_node_id: String,
    /// Batch id, unique per source node
    pub batch_id: String,
}

impl fmt::Display for BatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source_node_id, self.batch_id)
    }
}

/// A logical unit of change data staged as one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    source_node_id: String,
    batch_id: String,
    staged_location: String,
}

impl Batch {
    /// Create a batch staged under its source node's location
    pub fn new(source_node_id: impl Into<String>, batch_id: impl Into<String>) -> Self {
        let source_node_id = source_node_id.into();
        Self {
            staged_location: source_node_id.clone(),
            source_node_id,
            batch_id: batch_id.into(),
        }
    }

    /// Override the staged location
    #[must_use]
    pub fn with_staged_location(mut self, location: impl Into<String>) -> Self {
        self.staged_location = location.into();
        self
    }

    pub fn source_node_id(&self) -> &str {
        &self.source_node_id
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    /// Opaque location used for addressing inside the staging area
    pub fn staged_location(&self) -> &str {
        &self.staged_location
    }

    /// Identity key used by the resource cache
    pub fn key(&self) -> BatchKey {
        BatchKey {
            source_node_id: self.source_node_id.clone(),
            batch_id: self.batch_id.clone(),
        }
    }

    /// Display id qualified by source node, e.g. `n1-b1`
    pub fn source_node_batch_id(&self) -> String {
        format!("{}-{}", self.source_node_id, self.batch_id)
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source_node_id, self.batch_id)
    }
}
