#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;

use radarcli::{
    catalog::{CatalogClient, Page},
    error::{RemoteError, StorageError},
    management::StateStore,
    storage::RemoteStorage,
    sync::{Fetcher, RetryPolicy, Sleeper, Synchronizer},
    types::{Artist, Release, ReleaseKind, Track},
};

pub const PLAYLIST: &str = "playlist1";
pub const FOLDER: &str = "ReleaseRadar";

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn artist(id: &str, name: &str) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn release(id: &str, release_date: &str, kind: ReleaseKind) -> Release {
    Release {
        id: id.to_string(),
        name: format!("Release {id}"),
        release_date: Some(date(release_date)),
        kind,
    }
}

pub fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        display_name: format!("Track {id}"),
        artist_names: vec!["Artist".to_string()],
    }
}

pub fn unavailable() -> RemoteError {
    RemoteError::Status {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "try again".to_string(),
    }
}

/// Records requested sleeps without waiting.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    pub sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

pub fn fetcher(sleeper: &RecordingSleeper) -> Fetcher {
    Fetcher::new(RetryPolicy::default(), Arc::new(sleeper.clone()))
}

#[derive(Default)]
pub struct CatalogData {
    pub playlist_missing: bool,
    pub playlist: Vec<Option<String>>,
    pub artists: Vec<Artist>,
    pub releases: HashMap<(String, ReleaseKind), Vec<Release>>,
    pub tracks: HashMap<String, Vec<Track>>,
    /// Every append call, in order.
    pub appended: Vec<Vec<String>>,
    pub calls: HashMap<String, usize>,
    /// Remaining failures per operation; `usize::MAX` fails forever.
    pub failures: HashMap<String, usize>,
}

/// In-memory catalog. Clones share the same data.
#[derive(Clone, Default)]
pub struct FakeCatalog {
    pub data: Arc<Mutex<CatalogData>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_playlist(self, ids: &[&str]) -> Self {
        self.data.lock().unwrap().playlist = ids.iter().map(|id| Some(id.to_string())).collect();
        self
    }

    pub fn with_artist(self, artist: Artist) -> Self {
        self.data.lock().unwrap().artists.push(artist);
        self
    }

    pub fn with_release(self, artist_id: &str, release: Release, tracks: Vec<Track>) -> Self {
        {
            let mut data = self.data.lock().unwrap();
            data.tracks.insert(release.id.clone(), tracks);
            data.releases
                .entry((artist_id.to_string(), release.kind))
                .or_default()
                .push(release);
        }
        self
    }

    pub fn fail(&self, operation: &str, times: usize) {
        self.data
            .lock()
            .unwrap()
            .failures
            .insert(operation.to_string(), times);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.data
            .lock()
            .unwrap()
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn appended(&self) -> Vec<Vec<String>> {
        self.data.lock().unwrap().appended.clone()
    }

    pub fn appended_ids(&self) -> Vec<String> {
        self.appended().into_iter().flatten().collect()
    }

    fn tick(&self, data: &mut CatalogData, operation: &str) -> Result<(), RemoteError> {
        *data.calls.entry(operation.to_string()).or_default() += 1;
        if let Some(remaining) = data.failures.get_mut(operation) {
            if *remaining > 0 {
                if *remaining != usize::MAX {
                    *remaining -= 1;
                }
                return Err(unavailable());
            }
        }
        Ok(())
    }
}

fn page_of<T: Clone>(items: &[T], offset: u32, limit: u32) -> Vec<T> {
    items
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn validate_playlist(&self, playlist_id: &str) -> Result<bool, RemoteError> {
        let mut data = self.data.lock().unwrap();
        self.tick(&mut data, "validate_playlist")?;
        Ok(playlist_id == PLAYLIST && !data.playlist_missing)
    }

    async fn list_playlist_tracks(
        &self,
        _playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Option<String>>, RemoteError> {
        let mut data = self.data.lock().unwrap();
        self.tick(&mut data, "list_playlist_tracks")?;
        Ok(Page::new(page_of(&data.playlist, offset, limit)))
    }

    async fn list_followed_artists(
        &self,
        limit: u32,
        after: Option<String>,
    ) -> Result<Page<Artist>, RemoteError> {
        let mut data = self.data.lock().unwrap();
        self.tick(&mut data, "list_followed_artists")?;
        let start = after.and_then(|a| a.parse::<u32>().ok()).unwrap_or(0);
        let items = page_of(&data.artists, start, limit);
        let end = start as usize + items.len();
        let next = (end < data.artists.len()).then(|| end.to_string());
        Ok(Page::with_cursor(items, next))
    }

    async fn list_artist_releases(
        &self,
        artist_id: &str,
        kind: ReleaseKind,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Release>, RemoteError> {
        let mut data = self.data.lock().unwrap();
        self.tick(&mut data, &format!("list_artist_releases:{kind}"))?;
        let releases = data
            .releases
            .get(&(artist_id.to_string(), kind))
            .cloned()
            .unwrap_or_default();
        Ok(Page::new(page_of(&releases, offset, limit)))
    }

    async fn list_release_tracks(
        &self,
        release_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Track>, RemoteError> {
        let mut data = self.data.lock().unwrap();
        self.tick(&mut data, &format!("list_release_tracks:{release_id}"))?;
        let tracks = data.tracks.get(release_id).cloned().unwrap_or_default();
        Ok(Page::new(page_of(&tracks, offset, limit)))
    }

    async fn append_playlist_tracks(
        &self,
        _playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), RemoteError> {
        let mut data = self.data.lock().unwrap();
        self.tick(&mut data, "append_playlist_tracks")?;
        data.appended.push(track_ids.to_vec());
        data.playlist
            .extend(track_ids.iter().map(|id| Some(id.clone())));
        Ok(())
    }
}

#[derive(Default)]
pub struct StorageData {
    /// folder name -> file name -> content
    pub folders: HashMap<String, HashMap<String, Vec<u8>>>,
    pub fail_uploads: bool,
    pub fail_reads: bool,
    pub uploads: usize,
}

/// In-memory folder storage. Folder ids are the folder names, file ids are
/// `folder/name`. Clones share the same data.
#[derive(Clone, Default)]
pub struct FakeStorage {
    pub data: Arc<Mutex<StorageData>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, name: &str, content: &str) -> Self {
        self.data
            .lock()
            .unwrap()
            .folders
            .entry(FOLDER.to_string())
            .or_default()
            .insert(name.to_string(), content.as_bytes().to_vec());
        self
    }

    pub fn failing_uploads(self) -> Self {
        self.data.lock().unwrap().fail_uploads = true;
        self
    }

    pub fn failing_reads(self) -> Self {
        self.data.lock().unwrap().fail_reads = true;
        self
    }

    pub fn file(&self, name: &str) -> Option<String> {
        self.data
            .lock()
            .unwrap()
            .folders
            .get(FOLDER)
            .and_then(|files| files.get(name))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn uploads(&self) -> usize {
        self.data.lock().unwrap().uploads
    }
}

fn offline() -> StorageError {
    StorageError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "storage offline",
    ))
}

#[async_trait]
impl RemoteStorage for FakeStorage {
    fn backend_name(&self) -> &str {
        "fake"
    }

    async fn find_or_create_folder(&self, name: &str) -> Result<String, StorageError> {
        let mut data = self.data.lock().unwrap();
        if data.fail_reads {
            return Err(offline());
        }
        data.folders.entry(name.to_string()).or_default();
        Ok(name.to_string())
    }

    async fn find_file(&self, folder_id: &str, name: &str) -> Result<Option<String>, StorageError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .folders
            .get(folder_id)
            .filter(|files| files.contains_key(name))
            .map(|_| format!("{folder_id}/{name}")))
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StorageError> {
        let data = self.data.lock().unwrap();
        let (folder, name) = file_id
            .split_once('/')
            .ok_or_else(|| StorageError::Decode(file_id.to_string()))?;
        data.folders
            .get(folder)
            .and_then(|files| files.get(name))
            .cloned()
            .ok_or_else(|| StorageError::Decode(format!("no such file {file_id}")))
    }

    async fn upload_or_update(
        &self,
        folder_id: &str,
        name: &str,
        content: &[u8],
    ) -> Result<(), StorageError> {
        let mut data = self.data.lock().unwrap();
        if data.fail_uploads {
            return Err(offline());
        }
        data.uploads += 1;
        data.folders
            .entry(folder_id.to_string())
            .or_default()
            .insert(name.to_string(), content.to_vec());
        Ok(())
    }
}

pub fn store(storage: &FakeStorage, backup_dir: &Path) -> StateStore<FakeStorage> {
    StateStore::new(storage.clone(), FOLDER, backup_dir)
}

pub fn synchronizer(
    catalog: &FakeCatalog,
    storage: &FakeStorage,
    backup_dir: &Path,
    sleeper: &RecordingSleeper,
    today: &str,
) -> Synchronizer<FakeCatalog, FakeStorage> {
    Synchronizer::new(
        catalog.clone(),
        store(storage, backup_dir),
        fetcher(sleeper),
        PLAYLIST,
    )
    .with_today(date(today))
}

/// Serves `app` on an ephemeral loopback port and returns its base URL.
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
