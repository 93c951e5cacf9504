mod common;

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use radarcli::{config::SpotifyConfig, server::callback_router, types::PkceToken};

use common::serve;

async fn callback_base() -> String {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SPOTIFY_API_AUTH_CLIENT_ID", "client"),
        ("SPOTIFY_API_REDIRECT_URI", "http://127.0.0.1:8888/callback"),
    ]);
    let config =
        SpotifyConfig::from_lookup(|key: &str| vars.get(key).map(|v| v.to_string())).unwrap();
    let state = Arc::new(Mutex::new(None::<PkceToken>));

    serve(callback_router(Arc::new(config), state)).await
}

async fn get_body(url: &str) -> String {
    let response = reqwest::get(url).await.unwrap();
    assert!(response.status().is_success());
    response.text().await.unwrap()
}

#[tokio::test]
async fn test_callback_without_code() {
    let base = callback_base().await;

    let body = get_body(&format!("{base}/callback")).await;

    assert!(body.contains("Missing authorization code"));
}

#[tokio::test]
async fn test_callback_denied() {
    let base = callback_base().await;

    let body = get_body(&format!("{base}/callback?error=access_denied")).await;

    assert!(body.contains("Authorization denied"));
}

#[tokio::test]
async fn test_callback_without_pending_login() {
    let base = callback_base().await;

    // A code arrives but no PKCE verifier was stored for it
    let body = get_body(&format!("{base}/callback?code=abc")).await;

    assert!(body.contains("Missing PKCE code verifier"));
}
