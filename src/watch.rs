use std::path::Path;
use std::sync::mpsc::{self, Receiver};

use notify::{RecursiveMode, Watcher};

use crate::content::Portfolio;

/// Watch a content file and send every successfully reparsed version.
///
/// The parent directory is watched rather than the file itself so editors
/// that save by rename keep triggering reloads. Parse failures are logged
/// and skipped; the page keeps showing the last good content.
pub fn spawn_content_watcher(path: &Path) -> Receiver<Portfolio> {
    let (tx, rx) = mpsc::channel::<Portfolio>();
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    std::thread::spawn(move || {
        let Some(dir) = path.parent().map(Path::to_path_buf) else {
            tracing::warn!(path = %path.display(), "content file has no parent directory, not watching");
            return;
        };

        let (file_tx, file_rx) = mpsc::channel();
        let mut watcher = match notify::recommended_watcher(move |res| {
            let _ = file_tx.send(res);
        }) {
            Ok(w) => w,
            Err(e) => {
                tracing::warn!(error = %e, "failed to create file watcher");
                return;
            }
        };
        if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
            tracing::warn!(error = %e, dir = %dir.display(), "failed to watch content directory");
            return;
        }
        tracing::info!(path = %path.display(), "watching content file");

        while let Ok(res) = file_rx.recv() {
            let event: notify::Event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, "file watcher error");
                    continue;
                }
            };
            if !should_reload(&event, &path) {
                continue;
            }
            match Portfolio::load(&path) {
                Ok(portfolio) => {
                    tracing::info!(path = %path.display(), "content reloaded");
                    if tx.send(portfolio).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "content reload failed, keeping previous"),
            }
        }
    });

    rx
}

/// Reads of the file and changes to its neighbours don't warrant a reparse.
fn should_reload(event: &notify::Event, path: &Path) -> bool {
    !event.kind.is_access() && event.paths.iter().any(|p| p.as_path() == path)
}
