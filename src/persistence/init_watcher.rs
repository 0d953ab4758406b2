//! Initialization-file watcher: content-hash polling with rollback on
//! parse/validation failure (spec §4.4 "Initialization-file watcher",
//! §9 "content-hash polling with clear invariants").

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::store::Store;

use super::init_file;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll the file's content hash at a bounded interval; on change, attempt
/// a full reload. Suppresses reload attempts while the store is mid-save
/// of its own persistence file (spec §5 "Cross-file locking").
pub async fn watch_initialization_file(
    store: Arc<Store>,
    path: PathBuf,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut last_hash = content_hash(&path);
    let mut interval = tokio::time::interval(POLL_INTERVAL);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if store.is_saving() {
                    continue;
                }

                let current_hash = content_hash(&path);
                if current_hash == last_hash {
                    continue;
                }

                match init_file::parse_and_validate_strict(&path) {
                    Ok(expectations) => {
                        tracing::info!(path = %path.display(), count = expectations.len(), "reloading initialization file");
                        store.replace_all(expectations).await;
                        last_hash = current_hash;
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "initialization file reload failed, keeping last-known-good set");
                        last_hash = current_hash;
                    }
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("initialization file watcher shutting down");
                break;
            }
        }
    }
}

fn content_hash(path: &PathBuf) -> Option<u64> {
    let contents = std::fs::read(path).ok()?;
    let mut hasher = DefaultHasher::new();
    contents.hash(&mut hasher);
    Some(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_changes_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("init.json");
        std::fs::write(&path, "[]").unwrap();
        let first = content_hash(&path);

        std::fs::write(&path, "[{}]").unwrap();
        let second = content_hash(&path);

        assert_ne!(first, second);
    }
}
