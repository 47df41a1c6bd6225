//=========================================================================
// Asset Fetching
//=========================================================================
//
// Byte-level asset access plus a small worker-thread loader.
//
// Architecture:
//   spawn(id, job) → worker thread → Sender<Loaded<T>>
//                                          ↓
//   drain() / wait_all() on the main thread ← Receiver<Loaded<T>>
//
// Sources: `http://` / `https://` go through ureq, everything else is a
// filesystem path (an optional `file://` prefix is stripped).
//
// cancel() swaps the channel, so results from jobs still in flight land
// in a receiver nobody reads and are dropped.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io::Read;
use std::path::PathBuf;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};
use thiserror::Error;

//=== AssetError ==========================================================

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch asset {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("failed to decode asset {id}: {reason}")]
    Decode { id: String, reason: String },

    #[error("failed to spawn loader thread for {id}: {source}")]
    Spawn {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

//=== Fetching ============================================================

/// True for sources fetched over the network.
pub fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// Reads the raw bytes of an asset from a URL or a local path.
pub fn fetch_bytes(src: &str) -> Result<Vec<u8>, AssetError> {
    if is_remote(src) {
        let response = ureq::get(src).call().map_err(|source| AssetError::Http {
            url: src.to_string(),
            source: Box::new(source),
        })?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|source| AssetError::Io {
                path: PathBuf::from(src),
                source,
            })?;
        return Ok(bytes);
    }

    let path = PathBuf::from(src.strip_prefix("file://").unwrap_or(src));
    std::fs::read(&path).map_err(|source| AssetError::Io { path, source })
}

//=== Loaded ==============================================================

/// Result of one background job, tagged with the id it was spawned under.
#[derive(Debug)]
pub struct Loaded<T> {
    pub id: String,
    pub result: Result<T, AssetError>,
}

//=== AssetLoader =========================================================

/// Runs fetch/decode jobs on worker threads and hands results back in
/// completion order.
pub struct AssetLoader<T> {
    tx: Sender<Loaded<T>>,
    rx: Receiver<Loaded<T>>,
    pending: usize,
}

impl<T: Send + 'static> AssetLoader<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx, pending: 0 }
    }

    //--- Submission -------------------------------------------------------

    /// Runs `job` on its own thread. A spawn failure is reported through
    /// the channel like any other failed load.
    pub fn spawn<F>(&mut self, id: impl Into<String>, job: F)
    where
        F: FnOnce() -> Result<T, AssetError> + Send + 'static,
    {
        let id = id.into();
        let tx = self.tx.clone();
        let job_id = id.clone();

        let spawned = thread::Builder::new()
            .name(format!("asset:{id}"))
            .spawn(move || {
                let result = job();
                // Receiver gone means the owner was cancelled or dropped.
                let _ = tx.send(Loaded { id: job_id, result });
            });

        self.pending += 1;
        if let Err(source) = spawned {
            warn!(target: "assets", "Could not spawn loader for '{}': {}", id, source);
            let _ = self.tx.send(Loaded {
                id: id.clone(),
                result: Err(AssetError::Spawn { id, source }),
            });
        }
    }

    //--- Collection -------------------------------------------------------

    /// Returns every result that has arrived so far without blocking.
    pub fn drain(&mut self) -> Vec<Loaded<T>> {
        let done: Vec<_> = self.rx.try_iter().collect();
        self.pending = self.pending.saturating_sub(done.len());
        done
    }

    /// Blocks until every spawned job has reported.
    pub fn wait_all(&mut self) -> Vec<Loaded<T>> {
        let mut done = Vec::with_capacity(self.pending);
        while self.pending > 0 {
            match self.rx.recv() {
                Ok(loaded) => {
                    self.pending -= 1;
                    done.push(loaded);
                }
                Err(_) => break,
            }
        }
        done
    }

    /// Jobs spawned but not yet collected.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Forgets every in-flight job. Their results are discarded on arrival.
    pub fn cancel(&mut self) {
        if self.pending > 0 {
            debug!(target: "assets", "Discarding {} in-flight load(s)", self.pending);
        }
        let (tx, rx) = unbounded();
        self.tx = tx;
        self.rx = rx;
        self.pending = 0;
    }
}

impl<T: Send + 'static> Default for AssetLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
