// Watch mode - rebuild on source changes, one build at a time

use crate::build::Builder;
use crate::config::WatchConfig;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct SlotState {
    running: bool,
    requested: bool,
}

/// Single build slot plus a "rebuild requested" flag
///
/// Changes that arrive while a build is in flight are coalesced into one
/// follow-up build instead of starting a second concurrent one.
#[derive(Debug, Default)]
pub struct RebuildScheduler {
    state: Mutex<SlotState>,
}

impl RebuildScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change
    ///
    /// Returns `true` if the slot was free and the caller must start a build
    /// task; `false` if a running task will pick the change up.
    pub fn request(&self) -> bool {
        let mut state = self.state.lock();
        if state.running {
            state.requested = true;
            false
        } else {
            state.running = true;
            state.requested = false;
            true
        }
    }

    /// Called right before a build starts; absorbs changes seen so far
    pub fn begin(&self) {
        self.state.lock().requested = false;
    }

    /// Called when a build ends
    ///
    /// Returns `true` if changes arrived during the build and the task should
    /// build again. Otherwise the slot is released.
    pub fn finish(&self) -> bool {
        let mut state = self.state.lock();
        if state.requested {
            state.requested = false;
            true
        } else {
            state.running = false;
            false
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }
}

/// Whether a filesystem event should trigger a rebuild
pub fn is_relevant(event: &Event) -> bool {
    let kind_matches = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );

    kind_matches && event.paths.iter().any(|path| !is_editor_artifact(path))
}

/// Swap, backup and other dot files editors leave next to sources
fn is_editor_artifact(path: &Path) -> bool {
    path.file_name()
        .map(|name| {
            let name = name.to_string_lossy();
            name.starts_with('.') || name.ends_with('~')
        })
        .unwrap_or(false)
}

/// Watch the configured paths and rebuild after each burst of changes
///
/// Runs until the watcher shuts down. Failed builds are logged and leave the
/// previous artifact in place.
pub async fn watch(builder: Arc<Builder>, config: WatchConfig) -> anyhow::Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(e) => tracing::warn!(error = %e, "Watch error"),
        }
    })?;

    // Files are watched through their parent so replace-on-save keeps working
    let mut watched: Vec<PathBuf> = Vec::new();
    for path in &config.paths {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Not watching missing path");
            continue;
        }
        let canonical = std::fs::canonicalize(path)?;
        if canonical.is_dir() {
            watcher.watch(&canonical, RecursiveMode::Recursive)?;
        } else if let Some(parent) = canonical.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }
        watched.push(canonical);
    }

    tracing::info!(
        paths = ?watched,
        debounce_ms = config.debounce.as_millis() as u64,
        "Watching for changes"
    );

    let scope = WatchConfig {
        debounce: config.debounce,
        paths: watched,
    };
    let scheduler = Arc::new(RebuildScheduler::new());

    while let Some(event) = rx.recv().await {
        if !is_relevant(&event) || !event.paths.iter().any(|p| scope.covers(p)) {
            continue;
        }

        for path in &event.paths {
            tracing::info!(path = %path.display(), "File changed");
        }

        if scheduler.request() {
            tokio::spawn(run_builds(
                builder.clone(),
                scheduler.clone(),
                scope.debounce,
            ));
        } else {
            tracing::debug!("Build in progress, rebuild queued");
        }
    }

    anyhow::bail!("File watcher disconnected")
}

/// Build until no further change is pending, then release the slot
async fn run_builds(builder: Arc<Builder>, scheduler: Arc<RebuildScheduler>, debounce: Duration) {
    loop {
        tokio::time::sleep(debounce).await;
        scheduler.begin();

        let task_builder = builder.clone();
        match tokio::task::spawn_blocking(move || task_builder.build()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Build failed, keeping previous artifact"),
            Err(e) => tracing::error!(error = %e, "Build task aborted"),
        }

        if !scheduler.finish() {
            break;
        }
    }
}
