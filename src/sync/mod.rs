//! # Sync Module
//!
//! The incremental synchronization engine.
//!
//! - [`fetcher`] - Bounded retry and pagination over remote listings
//! - [`filter`] - Classification of candidate tracks against the playlist
//!   snapshot, the previously synced ids and this run's additions
//! - [`phase`] - The run state machine
//! - [`orchestrator`] - [`Synchronizer`], which sequences one run
//!
//! Nothing in here talks to Spotify or Google Drive directly: the engine only
//! sees [`crate::catalog::CatalogClient`] and [`crate::storage::RemoteStorage`].

pub mod fetcher;
pub mod filter;
pub mod orchestrator;
pub mod phase;

pub use fetcher::{FetchOutcome, Fetcher, PageStyle, RetryPolicy, Sleeper, TokioSleeper, Verdict};
pub use filter::{Classification, ReleaseFilter};
pub use orchestrator::{RunReport, Synchronizer};
pub use phase::{RunPhase, RunTracker};
