use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{config::SpotifyConfig, error, spotify, types::PkceToken};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    let config = match SpotifyConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    };

    spotify::auth::auth(Arc::new(config), shared_state).await;
}
