//! Write-optimization context that lives for one batch at a time

use std::collections::HashSet;

/// Result of switching the writer to a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableChange {
    /// First time the table appears in this batch; a full header is needed
    New,
    /// Seen earlier in this batch; a short table reference is enough
    Switched,
    /// Already the current table
    Unchanged,
}

/// Table and header bookkeeping reset at every batch boundary
#[derive(Debug, Clone)]
pub struct SessionState {
    flush_node_id: bool,
    table: Option<String>,
    processed_tables: HashSet<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            flush_node_id: true,
            table: None,
            processed_tables: HashSet::new(),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `table` the current table
    pub fn begin_table(&mut self, table: &str) -> TableChange {
        if self.table.as_deref() == Some(table) {
            return TableChange::Unchanged;
        }
        self.table = Some(table.to_string());
        if self.processed_tables.insert(table.to_string()) {
            TableChange::New
        } else {
            TableChange::Switched
        }
    }

    pub fn current_table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Whether the node-id header still has to be written for this batch
    pub fn needs_node_id(&self) -> bool {
        self.flush_node_id
    }

    pub fn mark_node_id_flushed(&mut self) {
        self.flush_node_id = false;
    }

    /// Forget everything learned during the previous batch
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
