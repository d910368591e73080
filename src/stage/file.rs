//! File-backed staging manager
//!
//! Each resource is one file at `<dir>/<category>/<location>/<batch_id>.<state>`.
//! The suffix carries the lifecycle state, so a restarted process can tell a
//! half-written batch (`.create`) from a finalized one (`.ready`) or a retired
//! one (`.done`) without any extra metadata. Identity components are
//! percent-encoded into single path segments.

use super::resource::{ResourceId, ResourceState, StagedResource, StagingManager};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug)]
struct Inner {
    state: ResourceState,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

/// Resource stored as a single file
#[derive(Debug)]
pub struct FileResource {
    id: ResourceId,
    base: PathBuf,
    inner: Mutex<Inner>,
}

impl FileResource {
    fn new(id: ResourceId, base: PathBuf, state: ResourceState) -> Self {
        let path = state_path(&base, state);
        Self {
            id,
            base,
            inner: Mutex::new(Inner {
                state,
                path,
                writer: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StagedResource for FileResource {
    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn state(&self) -> ResourceState {
        self.lock().state
    }

    fn set_state(&self, state: ResourceState) -> io::Result<()> {
        let mut inner = self.lock();
        if inner.state == state {
            return Ok(());
        }
        if let Some(mut writer) = inner.writer.take() {
            writer.flush()?;
        }
        let target = state_path(&self.base, state);
        fs::rename(&inner.path, &target)?;
        debug!(
            "Staged resource {} moved {} -> {}",
            self.id, inner.state, state
        );
        inner.path = target;
        inner.state = state;
        Ok(())
    }

    fn append(&self, text: &str) -> io::Result<()> {
        let mut inner = self.lock();
        let writer = match inner.writer.take() {
            Some(writer) => writer,
            None => BufWriter::new(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&inner.path)?,
            ),
        };
        inner.writer.insert(writer).write_all(text.as_bytes())
    }

    fn close(&self) -> io::Result<()> {
        let mut inner = self.lock();
        if let Some(mut writer) = inner.writer.take() {
            writer.flush()?;
            writer.get_ref().sync_data()?;
        }
        Ok(())
    }

    fn reader(&self) -> io::Result<Box<dyn Read + Send>> {
        let mut inner = self.lock();
        if let Some(writer) = inner.writer.as_mut() {
            writer.flush()?;
        }
        let file = File::open(&inner.path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Staging manager that keeps one file per resource under a root directory
#[derive(Debug, Clone)]
pub struct FileStagingManager {
    root: PathBuf,
}

impl FileStagingManager {
    /// Create a manager rooted at `root`. The directory is created lazily.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Path of a resource without its state suffix
    fn base_path(&self, category: &str, location: &str, batch_id: &str) -> io::Result<PathBuf> {
        Ok(self
            .root
            .join(encode_component(category)?)
            .join(encode_component(location)?)
            .join(encode_component(batch_id)?))
    }
}

impl StagingManager for FileStagingManager {
    fn find(
        &self,
        category: &str,
        location: &str,
        batch_id: &str,
    ) -> io::Result<Option<Arc<dyn StagedResource>>> {
        let base = self.base_path(category, location, batch_id)?;
        for state in ResourceState::ALL {
            if state_path(&base, state).is_file() {
                let id = ResourceId::new(category, location, batch_id);
                return Ok(Some(Arc::new(FileResource::new(id, base, state))));
            }
        }
        Ok(None)
    }

    fn create(
        &self,
        category: &str,
        location: &str,
        batch_id: &str,
    ) -> io::Result<Arc<dyn StagedResource>> {
        let base = self.base_path(category, location, batch_id)?;
        if let Some(parent) = base.parent() {
            fs::create_dir_all(parent)?;
        }
        for state in ResourceState::ALL {
            let stale = state_path(&base, state);
            match fs::remove_file(&stale) {
                Ok(()) => debug!("Removed stale staged file {}", stale.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        File::create(state_path(&base, ResourceState::Create))?;

        let id = ResourceId::new(category, location, batch_id);
        Ok(Arc::new(FileResource::new(id, base, ResourceState::Create)))
    }
}

fn state_path(base: &Path, state: ResourceState) -> PathBuf {
    base.with_extension(state.extension())
}

/// Encode one identity component as a single path segment
///
/// Percent-encodes `%`, `.`, `/` and `\`. The encoding is reversible, so
/// distinct components always map to distinct files.
fn encode_component(component: &str) -> io::Result<String> {
    if component.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "staged resource identity component must not be empty",
        ));
    }
    let mut encoded = String::with_capacity(component.len());
    for c in component.chars() {
        match c {
            '%' => encoded.push_str("%25"),
            '.' => encoded.push_str("%2E"),
            '/' => encoded.push_str("%2F"),
            '\\' => encoded.push_str("%5C"),
            c => encoded.push(c),
        }
    }
    Ok(encoded)
}
