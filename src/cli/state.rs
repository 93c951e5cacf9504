use tabled::Table;

use crate::{
    config::StorageConfig,
    error,
    management::{STATE_FILENAMES, StoredState},
    storage::RemoteStorage,
    types::StateTableRow,
    utils, warning,
};

use super::open_store;

pub async fn state() {
    let config = match StorageConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    };

    let store = open_store(&config);
    let stored = match store.load().await {
        Ok(stored) => stored,
        Err(e) => error!("Cannot read state: {}", e),
    };

    let rows = state_rows(store.storage().backend_name(), store.folder_name(), &stored);
    println!("{}", Table::new(rows));

    for path in store.pending_backups().await {
        warning!(
            "Pending backup {} (upload with radarcli upload-backup)",
            path.display()
        );
    }
}

pub fn state_rows(backend: &str, folder: &str, stored: &StoredState) -> Vec<StateTableRow> {
    let row = |item: &str, value: String| StateTableRow {
        item: item.to_string(),
        value,
    };

    vec![
        row("Storage", backend.to_string()),
        row("Folder", folder.to_string()),
        row(
            "Releases since",
            stored
                .run_date_cutoff
                .map(utils::format_date)
                .unwrap_or_else(|| format!("today ({} missing)", STATE_FILENAMES[0])),
        ),
        row(
            "Previous tracks",
            stored
                .previous_track_ids
                .as_ref()
                .map(|ids| ids.len().to_string())
                .unwrap_or_else(|| format!("0 ({} missing)", STATE_FILENAMES[1])),
        ),
    ]
}
