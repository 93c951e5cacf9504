use std::path::PathBuf;

use chrono::Utc;

use crate::{config::SpotifyConfig, config::data_dir, error::RemoteError, spotify, types::Token};

/// Cached Spotify token, refreshed shortly before it expires.
pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    pub async fn load() -> Result<Self, String> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { token })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(&path, json)
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn get_valid_token(&mut self, config: &SpotifyConfig) -> Result<String, RemoteError> {
        if self.is_expired() {
            let mut fresh = spotify::auth::refresh_token(config, &self.token.refresh_token)
                .await
                .map_err(RemoteError::Auth)?;
            // Spotify may omit the refresh token when it does not rotate it
            if fresh.refresh_token.is_empty() {
                fresh.refresh_token = self.token.refresh_token.clone();
            }
            self.token = fresh;
            // a failed write only costs another refresh next time
            let _ = self.persist().await;
        }

        Ok(self.token.access_token.clone())
    }

    fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + 240 >= self.token.obtained_at + self.token.expires_in
    }

    fn token_path() -> PathBuf {
        data_dir().join("cache/token.json")
    }
}
