use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;

use crate::{
    error::{StorageError, SyncError},
    info,
    storage::RemoteStorage,
    success,
    types::SyncState,
    utils, warning,
};

pub const DATE_FILENAME: &str = "LastRun.txt";
pub const PREVIOUS_TRACKS_FILENAME: &str = "PreviousTracks.txt";
pub const STATE_FILENAMES: [&str; 2] = [DATE_FILENAME, PREVIOUS_TRACKS_FILENAME];

/// What was found in storage at the start of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredState {
    pub run_date_cutoff: Option<NaiveDate>,
    pub previous_track_ids: Option<BTreeSet<String>>,
}

impl StoredState {
    /// Fills in the cold start defaults: cutoff today, no previous tracks.
    pub fn to_sync_state(&self, today: NaiveDate) -> SyncState {
        SyncState {
            run_date_cutoff: self.run_date_cutoff.unwrap_or(today),
            previous_track_ids: self.previous_track_ids.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug)]
pub enum CommitOutcome {
    Remote,
    /// Remote commit failed; the content waits in the backup directory.
    Backup(PathBuf),
    /// Remote commit and backup both failed.
    Lost(StorageError),
}

#[derive(Debug)]
pub struct CommitRecord {
    pub file: String,
    pub outcome: CommitOutcome,
}

impl CommitRecord {
    pub fn is_remote(&self) -> bool {
        matches!(self.outcome, CommitOutcome::Remote)
    }
}

/// Reads and writes the two state files through a storage backend, with a
/// local backup directory as fallback for failed writes.
pub struct StateStore<S> {
    storage: S,
    folder_name: String,
    backup_dir: PathBuf,
}

impl<S: RemoteStorage> StateStore<S> {
    pub fn new(storage: S, folder_name: impl Into<String>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            folder_name: folder_name.into(),
            backup_dir: backup_dir.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    /// Missing files are not an error; an unreachable backend or content that
    /// cannot be parsed is.
    pub async fn load(&self) -> Result<StoredState, SyncError> {
        let folder = self
            .storage
            .find_or_create_folder(&self.folder_name)
            .await
            .map_err(SyncError::StateLoad)?;

        let run_date_cutoff = match self.read_file(&folder, DATE_FILENAME).await? {
            Some(content) => {
                Some(
                    utils::parse_date_file(&content).map_err(|reason| SyncError::CorruptState {
                        file: DATE_FILENAME.to_string(),
                        reason,
                    })?,
                )
            }
            None => None,
        };

        let previous_track_ids = self
            .read_file(&folder, PREVIOUS_TRACKS_FILENAME)
            .await?
            .map(|content| utils::parse_track_ids(&content));

        Ok(StoredState {
            run_date_cutoff,
            previous_track_ids,
        })
    }

    async fn read_file(&self, folder_id: &str, name: &str) -> Result<Option<String>, SyncError> {
        let Some(file_id) = self
            .storage
            .find_file(folder_id, name)
            .await
            .map_err(SyncError::StateLoad)?
        else {
            info!("'{}' not found.", name);
            return Ok(None);
        };

        info!("'{}' found.", name);
        let bytes = self
            .storage
            .download(&file_id)
            .await
            .map_err(SyncError::StateLoad)?;

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| SyncError::CorruptState {
                file: name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Writes one state file, falling back to the backup directory.
    pub async fn commit(&self, filename: &str, content: &str) -> CommitRecord {
        let outcome = match self.commit_remote(filename, content.as_bytes()).await {
            Ok(()) => {
                success!("'{}' updated.", filename);
                CommitOutcome::Remote
            }
            Err(source) => {
                warning!(
                    "{}",
                    SyncError::StorageCommit {
                        file: filename.to_string(),
                        source,
                    }
                );
                match self.write_backup(filename, content).await {
                    Ok(path) => {
                        warning!(
                            "Saved '{}' to {} instead. Upload it manually (radarcli upload-backup), otherwise the next run will not see it.",
                            filename,
                            path.display()
                        );
                        CommitOutcome::Backup(path)
                    }
                    Err(e) => {
                        warning!(
                            "Cannot write local backup of '{}' either: {}. This run's state is lost.",
                            filename,
                            e
                        );
                        CommitOutcome::Lost(e)
                    }
                }
            }
        };

        CommitRecord {
            file: filename.to_string(),
            outcome,
        }
    }

    /// Persists the end-of-run state, skipping writes that change nothing.
    ///
    /// The date file is written when `cutoff` differs from what was loaded
    /// (or nothing was loaded); the track file only when `track_ids` is not
    /// empty.
    pub async fn commit_state(
        &self,
        loaded: &StoredState,
        cutoff: NaiveDate,
        track_ids: &BTreeSet<String>,
    ) -> Vec<CommitRecord> {
        let mut records = Vec::new();

        if loaded.run_date_cutoff != Some(cutoff) {
            records.push(self.commit(DATE_FILENAME, &utils::format_date(cutoff)).await);
        } else {
            info!(
                "'{}' already at {}, not rewritten.",
                DATE_FILENAME,
                utils::format_date(cutoff)
            );
        }

        if !track_ids.is_empty() {
            records.push(
                self.commit(PREVIOUS_TRACKS_FILENAME, &utils::encode_track_ids(track_ids))
                    .await,
            );
        }

        records
    }

    async fn commit_remote(&self, filename: &str, content: &[u8]) -> Result<(), StorageError> {
        let folder = self.storage.find_or_create_folder(&self.folder_name).await?;
        self.storage
            .upload_or_update(&folder, filename, content)
            .await
    }

    async fn write_backup(&self, filename: &str, content: &str) -> Result<PathBuf, StorageError> {
        async_fs::create_dir_all(&self.backup_dir).await?;
        let path = self.backup_dir.join(filename);
        async_fs::write(&path, content).await?;
        Ok(path)
    }

    /// State files waiting in the backup directory.
    pub async fn pending_backups(&self) -> Vec<PathBuf> {
        let mut pending = Vec::new();
        for name in STATE_FILENAMES {
            let path = self.backup_dir.join(name);
            if async_fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false)
            {
                pending.push(path);
            }
        }
        pending
    }

    /// Uploads every pending backup file and removes it once stored.
    ///
    /// Backups are merged with what the backend already holds: a backed up
    /// date older than the stored one is dropped, backed up track ids are
    /// unioned with the stored ones. Stops at the first file that cannot be
    /// uploaded, leaving it in place.
    pub async fn upload_backups(&self) -> Result<Vec<String>, SyncError> {
        let mut uploaded = Vec::new();
        let pending = self.pending_backups().await;
        if pending.is_empty() {
            return Ok(uploaded);
        }

        let stored = self.load().await?;

        for path in pending {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let commit_error = |source: StorageError| SyncError::StorageCommit {
                file: name.clone(),
                source,
            };

            let content = async_fs::read_to_string(&path)
                .await
                .map_err(|e| commit_error(StorageError::Io(e)))?;

            match merge_backup(&name, &content, &stored)? {
                Some(merged) => {
                    self.commit_remote(&name, merged.as_bytes())
                        .await
                        .map_err(commit_error)?;
                    success!("'{}' uploaded from backup.", name);
                    uploaded.push(name.clone());
                }
                None => info!("'{}' in storage is newer than the backup, skipped.", name),
            }

            async_fs::remove_file(&path)
                .await
                .map_err(|e| commit_error(StorageError::Io(e)))?;
        }

        Ok(uploaded)
    }
}

/// Content to upload for a backup file, or `None` when storage already holds
/// something at least as recent.
fn merge_backup(
    name: &str,
    content: &str,
    stored: &StoredState,
) -> Result<Option<String>, SyncError> {
    if name == DATE_FILENAME {
        let backup = utils::parse_date_file(content).map_err(|reason| SyncError::CorruptState {
            file: name.to_string(),
            reason,
        })?;
        return Ok(match stored.run_date_cutoff {
            Some(current) if current >= backup => None,
            _ => Some(utils::format_date(backup)),
        });
    }

    let mut ids = utils::parse_track_ids(content);
    if let Some(current) = &stored.previous_track_ids {
        ids.extend(current.iter().cloned());
    }
    Ok(Some(utils::encode_track_ids(&ids)))
}
