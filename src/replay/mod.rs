//! Replay
//!
//! Per-tick scheduling of access units, command dispatch against the host graph,
//! and object descriptor remapping.

pub mod dispatch;
pub mod remap;
pub mod scheduler;

pub use dispatch::{dispatch, DispatchEnv, DispatchReport};
pub use remap::{RemapOutcome, Remapper};
pub use scheduler::PlaybackState;

use crate::host::Presentation;
use crate::timeline::SceneSize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Files produced by redirection that must be removed on teardown.
#[derive(Debug, Default)]
pub struct PendingDeletions {
    paths: BTreeSet<PathBuf>,
}

impl PendingDeletions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the path was already recorded.
    pub fn insert(&mut self, path: impl Into<PathBuf>) -> bool {
        self.paths.insert(path.into())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// Delete every recorded file and forget them. Returns how many were removed.
    pub fn drain_and_delete(&mut self) -> usize {
        let mut removed = 0;
        for path in std::mem::take(&mut self.paths) {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "Removed redirected file");
                    removed += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove redirected file");
                }
            }
        }
        removed
    }
}

/// Fires attach-to-presentation at most once per context.
#[derive(Debug, Default)]
pub struct AttachGuard {
    attached: bool,
}

impl AttachGuard {
    pub fn attach<P: Presentation + ?Sized>(&mut self, host: &mut P, size: SceneSize) -> bool {
        if self.attached {
            return false;
        }
        self.attached = true;
        info!(
            width = size.width,
            height = size.height,
            pixel_metrics = size.pixel_metrics,
            "Attaching scene to presentation"
        );
        host.attach_to_presentation(size);
        true
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn reset(&mut self) {
        self.attached = false;
    }
}
