use std::sync::Arc;

use crate::{
    config::SyncConfig,
    error,
    error::{RunAborted, SyncError},
    management::TokenManager,
    spotify::SpotifyCatalog,
    storage::RemoteStorage,
    success,
    sync::{Fetcher, RetryPolicy, Synchronizer, TokioSleeper},
    warning,
};

use super::open_store;

pub async fn sync() {
    let config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    };

    let tokens = match TokenManager::load().await {
        Ok(tokens) => tokens,
        Err(e) => error!("No cached Spotify token ({}). Please run radarcli auth", e),
    };

    let catalog = SpotifyCatalog::new(config.spotify.clone(), tokens);
    let fetcher = Fetcher::new(RetryPolicy::default(), Arc::new(TokioSleeper));

    match fetcher
        .with_retry("verify login", || catalog.current_user())
        .await
    {
        Ok(user) => success!(
            "Authenticated successfully as '{}' ({}).",
            user.display_name.as_deref().unwrap_or(&user.id),
            user.id
        ),
        Err(e) => error!("{}. Please run radarcli auth", e),
    }

    let store = open_store(&config.storage);
    let synchronizer = Synchronizer::new(catalog, store, fetcher, config.playlist_id);

    match synchronizer.run().await {
        Ok(report) => {
            if !report.skipped.is_empty() {
                warning!(
                    "{} listing(s) could not be fetched completely, see the warnings above.",
                    report.skipped.len()
                );
            }
            if report.is_degraded() {
                warning!(
                    "State was not fully saved to {}. Run radarcli upload-backup before the next sync.",
                    synchronizer.store().storage().backend_name()
                );
            }
        }
        Err(RunAborted {
            error: SyncError::NoFollowedArtists,
            ..
        }) => warning!("You do not follow any artists, nothing to check."),
        Err(e) => error!("{}. Nothing was saved.", e),
    }
}
