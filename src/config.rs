//! Configuration management for radarcli.
//!
//! Values come from environment variables, optionally loaded from a `.env`
//! file in the local data directory (`<data_local_dir>/radarcli/.env`).
//! Everything is validated once into [`SyncConfig`]; the rest of the crate
//! never reads the environment itself.

use std::{env, path::PathBuf};

use crate::{error::SyncError, utils};

pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SPOTIFY_SCOPE: &str =
    "user-follow-read playlist-read-private playlist-modify-public playlist-modify-private";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3";
pub const DEFAULT_DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3";
pub const DEFAULT_STATE_FOLDER: &str = "ReleaseRadar";

/// Root of everything radarcli keeps on disk.
///
/// - Linux: `~/.local/share/radarcli`
/// - macOS: `~/Library/Application Support/radarcli`
/// - Windows: `%LOCALAPPDATA%/radarcli`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("radarcli");
    path
}

/// Loads environment variables from `<data_dir>/.env`.
///
/// Creates the data directory if needed. A missing `.env` file is fine,
/// the variables may be set in the environment directly. Variables that are
/// already set win over the file.
///
/// # Errors
///
/// Returns an error string if:
/// - The data directory cannot be created
/// - The `.env` file exists but cannot be read or parsed
///
/// # Example
///
/// ```ignore
/// if let Err(e) = config::load_env().await {
///     error!("Configuration error: {}", e);
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, SyncError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or_else(|| SyncError::Configuration(format!("{key} must be set")))
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Spotify Web API and OAuth settings.
///
/// # Environment
///
/// | Variable | Default |
/// |---|---|
/// | `SPOTIFY_API_AUTH_CLIENT_ID` | required |
/// | `SPOTIFY_API_REDIRECT_URI` | required |
/// | `SPOTIFY_API_URL` | [`DEFAULT_SPOTIFY_API_URL`] |
/// | `SPOTIFY_API_AUTH_URL` | [`DEFAULT_SPOTIFY_AUTH_URL`] |
/// | `SPOTIFY_API_TOKEN_URL` | [`DEFAULT_SPOTIFY_TOKEN_URL`] |
/// | `SPOTIFY_API_AUTH_SCOPE` | [`DEFAULT_SPOTIFY_SCOPE`] |
/// | `SERVER_ADDRESS` | [`DEFAULT_SERVER_ADDRESS`] |
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub scope: String,
    pub server_address: String,
}

impl SpotifyConfig {
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(env_lookup)
    }

    /// Builds the settings from an arbitrary variable source.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the value of a variable, or `None` when unset.
    ///   Values are trimmed and blank values count as unset.
    ///
    /// # Errors
    ///
    /// [`SyncError::Configuration`] naming the first required variable that
    /// is missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            client_id: required(&lookup, "SPOTIFY_API_AUTH_CLIENT_ID")?,
            redirect_uri: required(&lookup, "SPOTIFY_API_REDIRECT_URI")?,
            api_url: optional(&lookup, "SPOTIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.to_string()),
            auth_url: optional(&lookup, "SPOTIFY_API_AUTH_URL")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_AUTH_URL.to_string()),
            token_url: optional(&lookup, "SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_TOKEN_URL.to_string()),
            scope: optional(&lookup, "SPOTIFY_API_AUTH_SCOPE")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_SCOPE.to_string()),
            server_address: optional(&lookup, "SERVER_ADDRESS")
                .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
        })
    }
}

/// Credentials for the Google Drive state backend.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub token_url: String,
    /// Drive v3 metadata endpoint, e.g. `https://www.googleapis.com/drive/v3`.
    pub api_url: String,
    /// Drive v3 media upload endpoint.
    pub upload_url: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// `None` keeps the state in a local folder.
    pub drive: Option<DriveConfig>,
    pub state_folder: String,
    pub local_root: PathBuf,
    pub backup_dir: PathBuf,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(env_lookup)
    }

    /// Picks the state backend from the `GOOGLE_DRIVE_*` variables.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Variable source, as for [`SpotifyConfig::from_lookup`]
    ///
    /// # Errors
    ///
    /// [`SyncError::Configuration`] when only some of the Drive variables are
    /// set. None of them selects the local folder backend.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let keys = [
            "GOOGLE_DRIVE_CLIENT_ID",
            "GOOGLE_DRIVE_CLIENT_SECRET",
            "GOOGLE_DRIVE_REFRESH_TOKEN",
        ];
        let present = keys
            .iter()
            .filter(|k| optional(&lookup, k).is_some())
            .count();

        let drive = match present {
            0 => None,
            n if n == keys.len() => Some(DriveConfig {
                client_id: required(&lookup, keys[0])?,
                client_secret: required(&lookup, keys[1])?,
                refresh_token: required(&lookup, keys[2])?,
                token_url: DEFAULT_GOOGLE_TOKEN_URL.to_string(),
                api_url: DEFAULT_DRIVE_API_URL.to_string(),
                upload_url: DEFAULT_DRIVE_UPLOAD_URL.to_string(),
            }),
            _ => {
                return Err(SyncError::Configuration(format!(
                    "Google Drive storage needs all of {}",
                    keys.join(", ")
                )));
            }
        };

        Ok(Self {
            drive,
            state_folder: optional(&lookup, "RADAR_STATE_FOLDER")
                .unwrap_or_else(|| DEFAULT_STATE_FOLDER.to_string()),
            local_root: data_dir().join("state"),
            backup_dir: data_dir().join("backup"),
        })
    }
}

/// Everything a sync run needs, validated up front.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub spotify: SpotifyConfig,
    pub storage: StorageConfig,
    pub playlist_id: String,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(env_lookup)
    }

    /// Validates everything a run needs in one pass.
    ///
    /// `SPOTIFY_PLAYLIST_ID` may be a bare id, a `spotify:playlist:` URI or an
    /// `open.spotify.com` URL.
    ///
    /// # Errors
    ///
    /// [`SyncError::Configuration`] for a missing or malformed playlist id,
    /// and anything [`SpotifyConfig::from_lookup`] or
    /// [`StorageConfig::from_lookup`] rejects.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_playlist = required(&lookup, "SPOTIFY_PLAYLIST_ID")?;
        let playlist_id = utils::normalize_playlist_id(&raw_playlist).ok_or_else(|| {
            SyncError::Configuration(format!(
                "SPOTIFY_PLAYLIST_ID '{raw_playlist}' is not a playlist id, URI or URL"
            ))
        })?;

        Ok(Self {
            spotify: SpotifyConfig::from_lookup(&lookup)?,
            storage: StorageConfig::from_lookup(&lookup)?,
            playlist_id,
        })
    }
}
