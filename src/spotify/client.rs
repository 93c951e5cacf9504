use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::{
    catalog::{CatalogClient, Page},
    config::SpotifyConfig,
    error::RemoteError,
    management::TokenManager,
    types::{
        AddTrackToPlaylistRequest, AlbumResponse, AlbumTracksResponse, Artist,
        FollowedArtistsResponse, PlaylistTracksResponse, Release, ReleaseKind, SpotifyUser,
        Track,
    },
    utils,
};

/// [`CatalogClient`] backed by the Spotify Web API.
///
/// Each method issues exactly one request and reports failures as
/// [`RemoteError`]; retrying is left to the caller's fetcher.
///
/// # Authentication
///
/// Every request carries a bearer token from the wrapped [`TokenManager`].
/// The token is refreshed before the request when it is about to expire, so
/// a long run never fails halfway on an expired token.
///
/// # Base URL
///
/// Requests go to [`SpotifyConfig::api_url`] (`SPOTIFY_API_URL`), which
/// defaults to `https://api.spotify.com/v1`.
///
/// # Example
///
/// ```ignore
/// let tokens = TokenManager::load().await?;
/// let catalog = SpotifyCatalog::new(config.spotify.clone(), tokens);
/// let user = catalog.current_user().await?;
/// ```
pub struct SpotifyCatalog {
    client: Client,
    config: SpotifyConfig,
    tokens: Mutex<TokenManager>,
}

impl SpotifyCatalog {
    /// Creates a client for the given settings and cached token.
    ///
    /// # Arguments
    ///
    /// * `config` - Spotify settings; only `api_url` and the token endpoint
    ///   settings are used here
    /// * `tokens` - Token cache, usually from [`TokenManager::load`]
    pub fn new(config: SpotifyConfig, tokens: TokenManager) -> Self {
        Self {
            client: Client::new(),
            config,
            tokens: Mutex::new(tokens),
        }
    }

    /// The account the cached token belongs to.
    ///
    /// A cheap call that confirms the token works before a run starts.
    ///
    /// # Errors
    ///
    /// [`RemoteError::Auth`] when the token cannot be refreshed, otherwise
    /// the status or network error of `GET /me`.
    pub async fn current_user(&self) -> Result<SpotifyUser, RemoteError> {
        self.get_json("/me", &[]).await
    }

    async fn token(&self) -> Result<String, RemoteError> {
        self.tokens.lock().await.get_valid_token(&self.config).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    /// Authenticated `GET` of `path` with `query`, decoded as JSON.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let token = self.token().await?;
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;

        check_status(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// Maps non-success responses to errors.
///
/// # Errors
///
/// - `429 Too Many Requests` becomes [`RemoteError::RateLimited`] carrying the
///   `Retry-After` seconds when the header is present and numeric
/// - Any other non-2xx status becomes [`RemoteError::Status`] with the body
async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        return Err(RemoteError::RateLimited { retry_after });
    }

    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Status { status, body })
}

#[async_trait]
impl CatalogClient for SpotifyCatalog {
    /// `GET /playlists/{id}?fields=id`.
    ///
    /// `404`, `403` and `400` mean the playlist does not exist or is not
    /// accessible with this token and yield `Ok(false)`.
    async fn validate_playlist(&self, playlist_id: &str) -> Result<bool, RemoteError> {
        let token = self.token().await?;
        let response = self
            .client
            .get(self.url(&format!("/playlists/{playlist_id}")))
            .query(&[("fields", "id")])
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST => Ok(false),
            _ => check_status(response).await.map(|_| true),
        }
    }

    /// `GET /playlists/{id}/tracks`, requesting only the track ids.
    ///
    /// Items whose `track` is `null` (removed from the catalog) or whose id is
    /// `null` (local files) come back as `None`.
    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Option<String>>, RemoteError> {
        let res: PlaylistTracksResponse = self
            .get_json(
                &format!("/playlists/{playlist_id}/tracks"),
                &[
                    ("fields", "items(track(id))".to_string()),
                    ("offset", offset.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(Page::new(
            res.items
                .into_iter()
                .map(|item| item.track.and_then(|t| t.id))
                .collect(),
        ))
    }

    /// `GET /me/following?type=artist`. The next page starts at
    /// `cursors.after`; a missing cursor ends the listing.
    async fn list_followed_artists(
        &self,
        limit: u32,
        after: Option<String>,
    ) -> Result<Page<Artist>, RemoteError> {
        let mut query = vec![("type", "artist".to_string()), ("limit", limit.to_string())];
        if let Some(after) = after {
            query.push(("after", after));
        }

        let res: FollowedArtistsResponse = self.get_json("/me/following", &query).await?;
        let next = res.artists.cursors.and_then(|c| c.after);
        let artists = res
            .artists
            .items
            .into_iter()
            .map(|a| Artist {
                id: a.id,
                name: a.name,
            })
            .collect();

        Ok(Page::with_cursor(artists, next))
    }

    /// `GET /artists/{id}/albums?include_groups=<kind>`.
    ///
    /// Release dates are parsed with their `release_date_precision`; dates
    /// that cannot be parsed yield a release without a date.
    async fn list_artist_releases(
        &self,
        artist_id: &str,
        kind: ReleaseKind,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Release>, RemoteError> {
        let res: AlbumResponse = self
            .get_json(
                &format!("/artists/{artist_id}/albums"),
                &[
                    ("include_groups", kind.to_string()),
                    ("offset", offset.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(Page::new(
            res.items
                .into_iter()
                .map(|album| Release {
                    release_date: utils::parse_release_date(
                        &album.release_date,
                        album.release_date_precision.as_deref(),
                    ),
                    id: album.id,
                    name: album.name,
                    kind,
                })
                .collect(),
        ))
    }

    async fn list_release_tracks(
        &self,
        release_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Track>, RemoteError> {
        let res: AlbumTracksResponse = self
            .get_json(
                &format!("/albums/{release_id}/tracks"),
                &[("offset", offset.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        Ok(Page::new(
            res.items
                .into_iter()
                .map(|t| Track {
                    id: t.id,
                    display_name: t.name,
                    artist_names: t.artists.into_iter().map(|a| a.name).collect(),
                })
                .collect(),
        ))
    }

    /// `POST /playlists/{id}/tracks` with `spotify:track:` URIs. The caller
    /// keeps each batch within the endpoint's limit of 100.
    async fn append_playlist_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), RemoteError> {
        let token = self.token().await?;
        let body = AddTrackToPlaylistRequest {
            uris: track_ids
                .iter()
                .map(|id| format!("spotify:track:{id}"))
                .collect(),
        };

        let response = self
            .client
            .post(self.url(&format!("/playlists/{playlist_id}/tracks")))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}
