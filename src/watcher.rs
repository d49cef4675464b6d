use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use thiserror::Error;
use tracing::info;

use crate::field::presets::{SceneError, SceneSource};
use crate::state::SceneSlot;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("scene file {0} has no parent directory")]
    NoParent(PathBuf),
    #[error(transparent)]
    Notify(#[from] notify::Error),
}

/// Watches a scene file and queues reloads for the render loop to apply.
pub struct SceneWatcher {
    scene_file: PathBuf,
    model_directory: PathBuf,
    changes: Receiver<()>,
    _watcher: RecommendedWatcher,
}

impl SceneWatcher {
    pub fn start(scene_file: &Path, model_directory: &Path) -> Result<Self, WatchError> {
        info!("Initializing scene watcher...");
        let directory = match scene_file.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            Some(parent) => parent,
            None => return Err(WatchError::NoParent(scene_file.to_path_buf())),
        };
        let file_name = scene_file.file_name().map(|name| name.to_os_string());

        let (sender, changes) = mpsc::channel();
        // Editors often replace files instead of writing in place, so watch the directory.
        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let touches_scene = event
                        .paths
                        .iter()
                        .any(|path| path.file_name() == file_name.as_deref());
                    if touches_scene {
                        queue_reload(&sender);
                    }
                }
                Err(e) => tracing::error!("Error watching scene file: {e:?}"),
            })?;

        watcher.watch(directory, RecursiveMode::NonRecursive)?;
        info!("Scene watcher started for {:?}.", scene_file);
        Ok(Self {
            scene_file: scene_file.to_path_buf(),
            model_directory: model_directory.to_path_buf(),
            changes,
            _watcher: watcher,
        })
    }

    /// Applies a pending reload, if any. Call between frames.
    pub fn apply_pending(&self, slot: &SceneSlot) -> bool {
        if self.changes.try_recv().is_err() {
            return false;
        }
        // Bursts of events from one save collapse into a single reload.
        while self.changes.try_recv().is_ok() {}

        match reload_scene(&self.scene_file, &self.model_directory, slot) {
            Ok(()) => true,
            Err(error) => {
                tracing::error!("Scene reload failed, keeping previous scene: {error}");
                false
            }
        }
    }
}

/// Returns false once the render loop has dropped its end of the channel.
fn queue_reload(sender: &Sender<()>) -> bool {
    match sender.send(()) {
        Ok(()) => true,
        Err(_) => {
            tracing::debug!("Scene watcher receiver is gone, dropping change event");
            false
        }
    }
}

/// Reads `scene_file`, builds its field and swaps it into `slot`.
pub fn reload_scene(
    scene_file: &Path,
    model_directory: &Path,
    slot: &SceneSlot,
) -> Result<(), SceneError> {
    info!("Scene changed: {:?}. Reloading...", scene_file);
    let source = SceneSource::read(scene_file)?;
    let field = source.build(model_directory)?;
    slot.swap(field);
    Ok(())
}
