use std::collections::HashMap;

use radarcli::{
    cli::state_rows,
    config::{
        DEFAULT_DRIVE_API_URL, DEFAULT_DRIVE_UPLOAD_URL, DEFAULT_SPOTIFY_API_URL,
        DEFAULT_STATE_FOLDER, StorageConfig, SyncConfig,
    },
    error::SyncError,
    management::StoredState,
};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

const BASE: [(&str, &str); 3] = [
    ("SPOTIFY_API_AUTH_CLIENT_ID", "client"),
    ("SPOTIFY_API_REDIRECT_URI", "http://127.0.0.1:8888/callback"),
    ("SPOTIFY_PLAYLIST_ID", "spotify:playlist:abc123"),
];

#[test]
fn test_sync_config_defaults() {
    let config = SyncConfig::from_lookup(lookup(&BASE)).unwrap();

    assert_eq!(config.playlist_id, "abc123");
    assert_eq!(config.spotify.client_id, "client");
    assert_eq!(config.spotify.api_url, DEFAULT_SPOTIFY_API_URL);
    assert!(config.storage.drive.is_none());
    assert_eq!(config.storage.state_folder, DEFAULT_STATE_FOLDER);
}

#[test]
fn test_missing_playlist_is_configuration_error() {
    let err = SyncConfig::from_lookup(lookup(&BASE[..2])).unwrap_err();
    assert!(matches!(err, SyncError::Configuration(ref msg) if msg.contains("SPOTIFY_PLAYLIST_ID")));
}

#[test]
fn test_blank_value_counts_as_missing() {
    let mut vars = BASE.to_vec();
    vars[0] = ("SPOTIFY_API_AUTH_CLIENT_ID", "   ");

    let err = SyncConfig::from_lookup(lookup(&vars)).unwrap_err();
    assert!(matches!(err, SyncError::Configuration(_)));
}

#[test]
fn test_invalid_playlist_id() {
    let mut vars = BASE.to_vec();
    vars[2] = ("SPOTIFY_PLAYLIST_ID", "my playlist");

    assert!(matches!(
        SyncConfig::from_lookup(lookup(&vars)),
        Err(SyncError::Configuration(_))
    ));
}

#[test]
fn test_drive_storage_needs_all_credentials() {
    let complete = lookup(&[
        ("GOOGLE_DRIVE_CLIENT_ID", "id"),
        ("GOOGLE_DRIVE_CLIENT_SECRET", "secret"),
        ("GOOGLE_DRIVE_REFRESH_TOKEN", "refresh"),
        ("RADAR_STATE_FOLDER", "Radar"),
    ]);
    let config = StorageConfig::from_lookup(complete).unwrap();
    let drive = config.drive.unwrap();
    assert_eq!(drive.refresh_token, "refresh");
    assert_eq!(drive.api_url, DEFAULT_DRIVE_API_URL);
    assert_eq!(drive.upload_url, DEFAULT_DRIVE_UPLOAD_URL);
    assert_eq!(config.state_folder, "Radar");

    let partial = lookup(&[("GOOGLE_DRIVE_CLIENT_ID", "id")]);
    assert!(matches!(
        StorageConfig::from_lookup(partial),
        Err(SyncError::Configuration(_))
    ));
}

#[test]
fn test_state_rows() {
    let stored = StoredState::default();
    let rows = state_rows("local", "ReleaseRadar", &stored);

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].value, "local");
    assert!(rows[2].value.starts_with("today"));
    assert!(rows[3].value.starts_with('0'));
}
