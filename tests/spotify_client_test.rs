mod common;

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use radarcli::{
    catalog::CatalogClient,
    config::SpotifyConfig,
    error::RemoteError,
    management::TokenManager,
    spotify::SpotifyCatalog,
    types::Token,
};

use common::serve;

async fn playlist(Path(id): Path<String>) -> Response {
    if id == "missing" {
        (StatusCode::NOT_FOUND, "not found").into_response()
    } else {
        Json(json!({ "id": id })).into_response()
    }
}

async fn playlist_tracks() -> Json<serde_json::Value> {
    Json(json!({
        "items": [
            { "track": { "id": "t1" } },
            { "track": null },
            { "track": { "id": null } },
            { "track": { "id": "t2" } }
        ]
    }))
}

async fn following() -> Response {
    (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "7")], "slow down").into_response()
}

async fn me() -> Json<serde_json::Value> {
    Json(json!({ "id": "listener", "display_name": "Night Listener" }))
}

async fn catalog() -> SpotifyCatalog {
    let app = Router::new()
        .route("/v1/playlists/{id}", get(playlist))
        .route("/v1/playlists/{id}/tracks", get(playlist_tracks))
        .route("/v1/me/following", get(following))
        .route("/v1/me", get(me));
    let base = serve(app).await;

    let vars: HashMap<&str, String> = HashMap::from([
        ("SPOTIFY_API_AUTH_CLIENT_ID", "client".to_string()),
        ("SPOTIFY_API_REDIRECT_URI", format!("{base}/callback")),
        ("SPOTIFY_API_URL", format!("{base}/v1")),
    ]);
    let config = SpotifyConfig::from_lookup(|key: &str| vars.get(key).cloned()).unwrap();

    // Fresh token, no refresh needed
    let token = Token {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        scope: config.scope.clone(),
        expires_in: 3600,
        obtained_at: chrono::Utc::now().timestamp() as u64,
    };
    SpotifyCatalog::new(config, TokenManager::new(token))
}

#[tokio::test]
async fn test_unplayable_playlist_items_have_no_id() {
    let catalog = catalog().await;

    let page = catalog.list_playlist_tracks("p1", 0, 100).await.unwrap();

    // Should keep every entry so the page length still ends pagination
    assert_eq!(
        page.items,
        vec![Some("t1".to_string()), None, None, Some("t2".to_string())]
    );
}

#[tokio::test]
async fn test_rate_limit_keeps_retry_after() {
    let catalog = catalog().await;

    let err = catalog.list_followed_artists(50, None).await.unwrap_err();

    assert!(matches!(
        err,
        RemoteError::RateLimited {
            retry_after: Some(7)
        }
    ));
}

#[tokio::test]
async fn test_missing_playlist_is_not_an_error() {
    let catalog = catalog().await;

    assert!(!catalog.validate_playlist("missing").await.unwrap());
    assert!(catalog.validate_playlist("p1").await.unwrap());
}

#[tokio::test]
async fn test_current_user() {
    let catalog = catalog().await;

    let user = catalog.current_user().await.unwrap();

    assert_eq!(user.id, "listener");
    assert_eq!(user.display_name.as_deref(), Some("Night Listener"));
}
