//! One-shot, coalesced artifact loading.
//!
//! The ingredient index and the substitution rules are build-time
//! artifacts fetched exactly once per session. [`ArtifactCell`] is the
//! explicit state machine behind that guarantee: the first request spawns
//! a single named fetch thread; callers arriving while the load is in
//! flight subscribe to the same completion instead of triggering a second
//! fetch; the terminal `Loaded`/`Failed` state is sticky for the session.
//! No cancellation or timeout exists at this layer.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ArtifactError;

/// Result fanned out to every caller of a load.
pub type LoadOutcome<T> = Result<Arc<T>, ArtifactError>;

/// Produces raw artifact blobs. The fetch may block; the cell always runs
/// it on a background thread.
pub trait ArtifactSource: Send + Sync {
    /// Fetches the named artifact's bytes.
    fn fetch(&self, name: &str) -> Result<Vec<u8>, ArtifactError>;
}

/// Reads artifacts from files under a root directory.
#[derive(Debug, Clone)]
pub struct FileArtifactSource {
    root: PathBuf,
}

impl FileArtifactSource {
    /// Creates a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactSource for FileArtifactSource {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, ArtifactError> {
        std::fs::read(self.root.join(name)).map_err(|err| ArtifactError::Fetch {
            name: name.to_string(),
            message: err.to_string(),
        })
    }
}

/// Serves artifacts from memory. Intended for tests and embedded use.
#[derive(Debug, Clone, Default)]
pub struct StaticArtifactSource {
    blobs: HashMap<String, Vec<u8>>,
}

impl StaticArtifactSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a blob under a name.
    pub fn insert(&mut self, name: impl Into<String>, blob: impl Into<Vec<u8>>) {
        self.blobs.insert(name.into(), blob.into());
    }
}

impl ArtifactSource for StaticArtifactSource {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, ArtifactError> {
        self.blobs
            .get(name)
            .cloned()
            .ok_or_else(|| ArtifactError::Fetch {
                name: name.to_string(),
                message: "no such artifact".to_string(),
            })
    }
}

/// Versioned envelope every artifact blob is wrapped in.
#[derive(Debug, Deserialize)]
pub struct ArtifactEnvelope {
    /// Generator-assigned artifact version.
    pub version: u32,

    /// When the artifact was generated.
    pub generated_at: DateTime<Utc>,

    /// Optional blake3 hex digest of the serialized payload.
    #[serde(default)]
    pub checksum: Option<String>,

    /// The artifact body.
    pub payload: serde_json::Value,
}

/// Decodes an envelope blob into the payload type, verifying the checksum
/// when the envelope carries one.
pub fn decode_artifact<T: DeserializeOwned>(name: &str, blob: &[u8]) -> Result<T, ArtifactError> {
    let envelope: ArtifactEnvelope =
        serde_json::from_slice(blob).map_err(|err| ArtifactError::Decode {
            name: name.to_string(),
            message: err.to_string(),
        })?;

    if let Some(expected) = &envelope.checksum {
        let computed = blake3::hash(envelope.payload.to_string().as_bytes())
            .to_hex()
            .to_string();
        if !computed.eq_ignore_ascii_case(expected) {
            return Err(ArtifactError::ChecksumMismatch {
                name: name.to_string(),
                expected: expected.clone(),
                computed,
            });
        }
    }

    tracing::info!(
        artifact = name,
        version = envelope.version,
        generated_at = %envelope.generated_at,
        "artifact decoded"
    );

    serde_json::from_value(envelope.payload).map_err(|err| ArtifactError::Decode {
        name: name.to_string(),
        message: err.to_string(),
    })
}

/// Load lifecycle of one artifact, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No caller has asked for the artifact yet.
    NotRequested,
    /// A fetch thread is running.
    InFlight,
    /// The artifact is decoded and available.
    Loaded,
    /// The load failed; the failure is sticky for the session.
    Failed,
}

enum CellState<T> {
    NotRequested,
    InFlight {
        waiters: Vec<Sender<LoadOutcome<T>>>,
    },
    Loaded(Arc<T>),
    Failed(ArtifactError),
}

/// Coalescing load cell for one artifact.
pub struct ArtifactCell<T> {
    name: String,
    state: Mutex<CellState<T>>,
}

impl<T> ArtifactCell<T> {
    /// Creates a cell for the named artifact.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(CellState::NotRequested),
        }
    }

    /// The artifact name this cell loads.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        match &*self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner) {
            CellState::NotRequested => LoadState::NotRequested,
            CellState::InFlight { .. } => LoadState::InFlight,
            CellState::Loaded(_) => LoadState::Loaded,
            CellState::Failed(_) => LoadState::Failed,
        }
    }

    /// The loaded artifact, if the cell has reached `Loaded`.
    #[must_use]
    pub fn get(&self) -> Option<Arc<T>> {
        match &*self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner) {
            CellState::Loaded(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }
}

impl<T: DeserializeOwned + Send + Sync + 'static> ArtifactCell<T> {
    /// Requests the artifact, returning a receiver for the outcome.
    ///
    /// The first request transitions the cell to `InFlight` and spawns the
    /// fetch thread. Requests arriving while the load is in flight receive
    /// the same pending result; requests after completion receive the
    /// sticky outcome immediately. The fetch runs at most once per
    /// session.
    pub fn request(self: &Arc<Self>, source: &Arc<dyn ArtifactSource>) -> Receiver<LoadOutcome<T>> {
        let (tx, rx) = bounded::<LoadOutcome<T>>(1);

        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match &mut *state {
            CellState::Loaded(value) => {
                let _ = tx.send(Ok(Arc::clone(value)));
            }
            CellState::Failed(err) => {
                let _ = tx.send(Err(err.clone()));
            }
            CellState::InFlight { waiters } => {
                waiters.push(tx);
            }
            CellState::NotRequested => {
                *state = CellState::InFlight { waiters: vec![tx] };
                drop(state);
                self.spawn_fetch(Arc::clone(source));
            }
        }
        rx
    }

    fn spawn_fetch(self: &Arc<Self>, source: Arc<dyn ArtifactSource>) {
        let cell = Arc::clone(self);
        let thread_name = format!("larder-load-{}", self.name);
        let spawned = thread::Builder::new().name(thread_name).spawn(move || {
            let outcome = source
                .fetch(&cell.name)
                .and_then(|blob| decode_artifact::<T>(&cell.name, &blob))
                .map(Arc::new);
            cell.complete(outcome);
        });

        if let Err(err) = spawned {
            self.complete(Err(ArtifactError::Fetch {
                name: self.name.clone(),
                message: format!("failed to spawn loader thread: {err}"),
            }));
        }
    }

    fn complete(&self, outcome: Result<Arc<T>, ArtifactError>) {
        let waiters = {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let waiters = match &mut *state {
                CellState::InFlight { waiters } => std::mem::take(waiters),
                // Completion races only against itself; any other state
                // means the cell already settled.
                _ => Vec::new(),
            };
            *state = match &outcome {
                Ok(value) => CellState::Loaded(Arc::clone(value)),
                Err(err) => {
                    tracing::warn!(artifact = self.name.as_str(), error = %err, "artifact load failed");
                    CellState::Failed(err.clone())
                }
            };
            waiters
        };

        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}
