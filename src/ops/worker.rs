// src/ops/worker.rs
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use super::{copy_path, make_directory_recursive, remove_path_recursive, rename_path, touch_file};
use super::{CopyOptions, TransferStats};
use crate::error::{FsError, FsResult};
use crate::filesystem::FileSystem;

pub type JobId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Copy { src: PathBuf, dest: PathBuf, options: CopyOptions },
    Remove { path: PathBuf },
    Rename { from: PathBuf, to: PathBuf },
    Touch { path: PathBuf },
    MakeDir { path: PathBuf },
}

impl Operation {
    /// Subtrees this operation reads or writes.
    pub fn targets(&self) -> Vec<&Path> {
        match self {
            Operation::Copy { src, dest, .. } => vec![src.as_path(), dest.as_path()],
            Operation::Remove { path } | Operation::Touch { path } | Operation::MakeDir { path } => {
                vec![path.as_path()]
            }
            Operation::Rename { from, to } => vec![from.as_path(), to.as_path()],
        }
    }

    pub fn describe(&self) -> String {
        let name = |p: &Path| p.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        match self {
            Operation::Copy { src, .. } => format!("Pasted: {}", name(src)),
            Operation::Remove { path } => format!("Deleted: {}", name(path)),
            Operation::Rename { to, .. } => format!("Renamed to: {}", name(to)),
            Operation::Touch { path } => format!("Created file: {}", name(path)),
            Operation::MakeDir { path } => format!("Created folder: {}", name(path)),
        }
    }

    pub fn run<F: FileSystem + ?Sized>(&self, fs: &F) -> FsResult<OperationOutput> {
        match self {
            Operation::Copy { src, dest, options } => copy_path(fs, src, dest, *options).map(OperationOutput::Copied),
            Operation::Remove { path } => remove_path_recursive(fs, path).map(OperationOutput::Removed),
            Operation::Rename { from, to } => rename_path(fs, from, to).map(|_| OperationOutput::Done),
            Operation::Touch { path } => touch_file(fs, path).map(|_| OperationOutput::Done),
            Operation::MakeDir { path } => make_directory_recursive(fs, path).map(|_| OperationOutput::Done),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutput {
    Copied(TransferStats),
    Removed(usize),
    Done,
}

#[derive(Debug)]
pub struct Completion {
    pub id: JobId,
    pub operation: Operation,
    pub result: FsResult<OperationOutput>,
}

fn overlaps(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

#[derive(Debug, Default)]
struct SubtreeLocks {
    held: Mutex<HashMap<JobId, Vec<PathBuf>>>,
}

impl SubtreeLocks {
    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, Vec<PathBuf>>> {
        self.held.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn try_acquire(&self, id: JobId, targets: &[&Path]) -> FsResult<()> {
        let mut held = self.lock();
        for target in targets {
            if held.values().flatten().any(|locked| overlaps(locked, target)) {
                return Err(FsError::Busy(target.to_path_buf()));
            }
        }
        held.insert(id, targets.iter().map(|t| t.to_path_buf()).collect());
        Ok(())
    }

    fn release(&self, id: JobId) {
        self.lock().remove(&id);
    }

    fn contains(&self, path: &Path) -> bool {
        self.lock().values().flatten().any(|locked| path.starts_with(locked))
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Runs file operations on tokio's blocking pool so the UI stays responsive.
///
/// At most one operation may touch a given subtree at a time; overlapping
/// submissions are refused with `FsError::Busy`. Operations cannot be
/// cancelled once started.
pub struct OperationWorker {
    fs: Arc<dyn FileSystem>,
    runtime: Handle,
    locks: Arc<SubtreeLocks>,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    next_id: JobId,
}

impl OperationWorker {
    pub fn new(fs: Arc<dyn FileSystem>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        OperationWorker { fs, runtime, locks: Arc::new(SubtreeLocks::default()), tx, rx, next_id: 1 }
    }

    pub fn submit(&mut self, operation: Operation) -> FsResult<JobId> {
        let id = self.next_id;
        self.locks.try_acquire(id, &operation.targets())?;
        self.next_id += 1;

        let fs = Arc::clone(&self.fs);
        let locks = Arc::clone(&self.locks);
        let tx = self.tx.clone();
        tracing::debug!("job {} started: {:?}", id, operation);
        self.runtime.spawn_blocking(move || {
            let result = operation.run(fs.as_ref());
            locks.release(id);
            // receiver gone means the UI has shut down
            let _ = tx.send(Completion { id, operation, result });
        });
        Ok(id)
    }

    /// True while `path` lies inside a subtree an outstanding job is mutating.
    /// The UI must not list or enter such a path.
    pub fn is_busy(&self, path: &Path) -> bool {
        self.locks.contains(path)
    }

    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }

    /// Completions that have arrived since the last poll, without blocking.
    pub fn poll(&mut self) -> Vec<Completion> {
        let mut done = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(completion) => done.push(completion),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        done
    }

    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }
}
