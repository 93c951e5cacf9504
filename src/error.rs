//! Error taxonomy for a synchronization run.
//!
//! Remote failures are always transient from the retry policy's point of view.
//! Whether an exhausted retry aborts the run or only skips one artist is
//! decided by the call site, never by the error itself.

use reqwest::StatusCode;

use crate::sync::RunPhase;

/// A single failed call against the remote catalog or the token endpoint.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("rate limited, retry after {retry_after:?} seconds")]
    RateLimited { retry_after: Option<u64> },
    #[error("cannot decode response: {0}")]
    Decode(String),
    #[error("authorization failed: {0}")]
    Auth(String),
}

/// Every attempt for one request failed.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed after {attempts} attempts: {last_error}")]
pub struct ExhaustedRetries {
    pub operation: String,
    pub attempts: u32,
    #[source]
    pub last_error: RemoteError,
}

/// Failures of the state storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot decode response: {0}")]
    Decode(String),
    #[error("authorization failed: {0}")]
    Auth(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Exhausted(#[from] ExhaustedRetries),
    #[error("playlist '{0}' does not exist or is not accessible")]
    PlaylistUnavailable(String),
    #[error("cannot load sync state: {0}")]
    StateLoad(#[source] StorageError),
    #[error("stored file '{file}' is corrupt: {reason}")]
    CorruptState { file: String, reason: String },
    #[error("cannot commit '{file}': {source}")]
    StorageCommit {
        file: String,
        #[source]
        source: StorageError,
    },
    #[error("no followed artists, nothing to check")]
    NoFollowedArtists,
}

/// A run that stopped before committing any state.
///
/// `phase` is the last phase the run completed, which is also the phase the
/// `ABORTED` transition leaves from:
///
/// | Failure | `phase` |
/// |---|---|
/// | playlist validation exhausted or playlist unavailable | `START` |
/// | playlist snapshot exhausted | `PLAYLIST_VALIDATED` |
/// | state unreadable or corrupt | `PLAYLIST_SNAPSHOT_TAKEN` |
/// | followed-artist listing exhausted, or no followed artists | `STATE_LOADED` |
/// | append exhausted while processing artists | `ARTISTS_FETCHED` |
#[derive(Debug, thiserror::Error)]
#[error("run aborted after {phase}: {error}")]
pub struct RunAborted {
    pub phase: RunPhase,
    #[source]
    pub error: SyncError,
}
