//! # CLI Module
//!
//! One function per `radarcli` subcommand. Each one loads its configuration
//! from the environment, prints progress through the crate's output macros
//! and terminates the process with `error!` on a fatal failure.
//!
//! - [`auth`] - Spotify authorization (PKCE) and token caching
//! - [`sync`] - A full synchronization run
//! - [`state`] - Shows the stored sync state and pending backups
//! - [`upload_backup`] - Pushes locally saved state files to the storage
//!
//! ## Usage
//!
//! ```bash
//! radarcli auth             # once, opens the browser
//! radarcli sync             # daily, e.g. from cron
//! radarcli state            # what will the next run look for?
//! radarcli upload-backup    # after a run warned about a local backup
//! ```

mod auth;
mod state;
mod sync;
mod upload_backup;

pub use auth::auth;
pub use state::{state, state_rows};
pub use sync::sync;
pub use upload_backup::upload_backup;

use crate::{
    config::StorageConfig,
    info,
    management::StateStore,
    storage::{DriveStorage, LocalStorage, RemoteStorage},
};

/// State store over the configured primary backend.
pub fn open_store(config: &StorageConfig) -> StateStore<Box<dyn RemoteStorage>> {
    let storage: Box<dyn RemoteStorage> = match &config.drive {
        Some(drive) => Box::new(DriveStorage::new(drive.clone())),
        None => Box::new(LocalStorage::new(config.local_root.clone())),
    };
    info!("Using {} storage.", storage.backend_name());

    StateStore::new(
        storage,
        config.state_folder.clone(),
        config.backup_dir.clone(),
    )
}
