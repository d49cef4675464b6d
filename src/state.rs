//! Hand-off points between the configuration writer, the scene reloader and
//! the render loop. Readers always get a whole value: a snapshot or a scene
//! handle may be stale, but it is never half-written.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::field::DistanceField;
use crate::render::FrameParams;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    pub version: u64,
    pub params: FrameParams,
}

/// Single-writer, many-reader store for per-frame parameters.
pub struct ParamStore {
    current: RwLock<Arc<Snapshot>>,
}

impl ParamStore {
    pub fn new(params: FrameParams) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot {
                version: 0,
                params: params.sanitized(),
            })),
        }
    }

    /// Sanitizes `params` and makes them the current snapshot, returning its version.
    pub fn publish(&self, params: FrameParams) -> u64 {
        let params = params.sanitized();
        let mut current = self.current.write();
        let version = current.version + 1;
        *current = Arc::new(Snapshot { version, params });
        version
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }
}

/// Holder for the active distance field, replaced wholesale between frames.
pub struct SceneSlot {
    current: RwLock<Arc<dyn DistanceField>>,
    generation: AtomicU64,
}

impl SceneSlot {
    pub fn new(field: Arc<dyn DistanceField>) -> Self {
        Self {
            current: RwLock::new(field),
            generation: AtomicU64::new(0),
        }
    }

    pub fn current(&self) -> Arc<dyn DistanceField> {
        Arc::clone(&self.current.read())
    }

    /// Installs `field` and hands back the one it replaced.
    pub fn swap(&self, field: Arc<dyn DistanceField>) -> Arc<dyn DistanceField> {
        let previous = std::mem::replace(&mut *self.current.write(), field);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::info!(
            previous = previous.name(),
            current = self.current.read().name(),
            generation,
            "scene swapped"
        );
        previous
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
