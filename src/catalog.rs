//! The remote catalog as seen by the synchronization engine.
//!
//! [`crate::spotify::SpotifyCatalog`] is the production implementation; the
//! integration tests drive the engine through in-memory fakes.

use async_trait::async_trait;

use crate::{
    error::RemoteError,
    types::{Artist, Release, ReleaseKind, Track},
};

pub const PLAYLIST_PAGE_LIMIT: u32 = 100;
pub const ARTIST_PAGE_LIMIT: u32 = 50;
pub const RELEASE_PAGE_LIMIT: u32 = 50;
pub const RELEASE_TRACK_PAGE_LIMIT: u32 = 50;
/// Largest number of tracks one append call accepts.
pub const APPEND_BATCH_LIMIT: usize = 100;

/// Where the next page of a listing starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
    pub after: Option<String>,
}

impl PageRequest {
    pub fn first(limit: u32) -> Self {
        Self {
            offset: 0,
            limit,
            after: None,
        }
    }
}

/// One page of a listing, items in the order the catalog returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the next page. Only meaningful for cursor paginated listings.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    pub fn with_cursor(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// `Ok(false)` when the playlist does not exist or is not accessible.
    async fn validate_playlist(&self, playlist_id: &str) -> Result<bool, RemoteError>;

    /// Track ids of a playlist page. Entries without an id (local files,
    /// unavailable tracks) are `None` but still occupy a slot of the page.
    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Option<String>>, RemoteError>;

    async fn list_followed_artists(
        &self,
        limit: u32,
        after: Option<String>,
    ) -> Result<Page<Artist>, RemoteError>;

    /// Releases of one kind, newest first.
    async fn list_artist_releases(
        &self,
        artist_id: &str,
        kind: ReleaseKind,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Release>, RemoteError>;

    async fn list_release_tracks(
        &self,
        release_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Track>, RemoteError>;

    /// Appends at most [`APPEND_BATCH_LIMIT`] tracks to the end of the playlist.
    async fn append_playlist_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), RemoteError>;
}
