use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{Res, api, config::SpotifyConfig, types::PkceToken};

/// Routes served while `radarcli auth` waits for the browser redirect.
///
/// The PKCE state and the Spotify settings reach the handler as extensions.
pub fn callback_router(config: Arc<SpotifyConfig>, state: Arc<Mutex<Option<PkceToken>>>) -> Router {
    Router::new()
        .route("/callback", get(api::callback))
        .layer(Extension(state))
        .layer(Extension(config))
}

pub async fn start_api_server(
    config: Arc<SpotifyConfig>,
    state: Arc<Mutex<Option<PkceToken>>>,
) -> Res<()> {
    let addr = SocketAddr::from_str(&config.server_address)
        .map_err(|e| format!("Failed to parse server address: {e}"))?;
    let app = callback_router(config, state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
