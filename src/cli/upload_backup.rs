use crate::{config::StorageConfig, error, info, success};

use super::open_store;

pub async fn upload_backup() {
    let config = match StorageConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    };

    let store = open_store(&config);
    if store.pending_backups().await.is_empty() {
        info!("Nothing to upload in {}.", store.backup_dir().display());
        return;
    }

    match store.upload_backups().await {
        Ok(uploaded) => success!("Backup uploaded ({} file(s) changed).", uploaded.len()),
        Err(e) => error!("Cannot upload backup: {}", e),
    }
}
