use std::{
    collections::{BTreeSet, HashSet},
    time::{Duration, Instant},
};

use chrono::{Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    catalog::{
        APPEND_BATCH_LIMIT, ARTIST_PAGE_LIMIT, CatalogClient, PLAYLIST_PAGE_LIMIT,
        RELEASE_PAGE_LIMIT, RELEASE_TRACK_PAGE_LIMIT,
    },
    error::{ExhaustedRetries, RunAborted, SyncError},
    info,
    management::{CommitOutcome, CommitRecord, StateStore},
    storage::RemoteStorage,
    success,
    sync::{
        Classification, FetchOutcome, Fetcher, PageStyle, ReleaseFilter, RunPhase, RunTracker,
        Verdict,
    },
    types::{AddedTracks, Artist, Release, ReleaseKind, Track},
    utils, warning,
};

/// Summary of a run that reached `DONE`.
#[derive(Debug)]
pub struct RunReport {
    pub added: AddedTracks,
    /// Cutoff the run filtered releases with.
    pub run_date_cutoff: NaiveDate,
    /// Cutoff handed to the state store at commit time.
    pub committed_cutoff: NaiveDate,
    pub artists_checked: usize,
    /// Listings that were given up on after exhausting their retries.
    pub skipped: Vec<ExhaustedRetries>,
    pub commits: Vec<CommitRecord>,
    pub phases: Vec<RunPhase>,
    pub elapsed: Duration,
}

impl RunReport {
    /// True when some state did not reach the primary storage.
    pub fn is_degraded(&self) -> bool {
        self.commits.iter().any(|c| !c.is_remote())
    }
}

/// Drives one synchronization run from playlist validation to the report.
pub struct Synchronizer<C, S> {
    catalog: C,
    store: StateStore<S>,
    fetcher: Fetcher,
    playlist_id: String,
    today: NaiveDate,
}

impl<C: CatalogClient, S: RemoteStorage> Synchronizer<C, S> {
    pub fn new(
        catalog: C,
        store: StateStore<S>,
        fetcher: Fetcher,
        playlist_id: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            store,
            fetcher,
            playlist_id: playlist_id.into(),
            today: Local::now().date_naive(),
        }
    }

    /// Overrides the date used for cold starts and the committed cutoff.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    pub async fn run(&self) -> Result<RunReport, RunAborted> {
        let started = Instant::now();
        let mut tracker = RunTracker::new();

        match self
            .fetcher
            .with_retry("validate playlist", || {
                self.catalog.validate_playlist(&self.playlist_id)
            })
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                return Err(tracker.abort(SyncError::PlaylistUnavailable(self.playlist_id.clone())));
            }
            Err(e) => return Err(tracker.abort(e.into())),
        }
        tracker.advance();

        info!("Fetching current playlist tracks for filtering.");
        let pb = spinner("Reading playlist...");
        let snapshot = self
            .snapshot_playlist(&self.fetcher.with_progress(&pb))
            .await;
        pb.finish_and_clear();
        let snapshot = snapshot.map_err(|e| tracker.abort(e.into()))?;
        success!("Playlist tracks retrieved ({}).", snapshot.len());
        tracker.advance();

        let loaded = self.store.load().await.map_err(|e| tracker.abort(e))?;
        let state = loaded.to_sync_state(self.today);
        info!(
            "Looking for releases since {}.",
            utils::format_date(state.run_date_cutoff)
        );
        tracker.advance();

        let pb = spinner("Fetching followed artists...");
        let artists = self
            .followed_artists(&self.fetcher.with_progress(&pb))
            .await;
        pb.finish_and_clear();
        let artists = artists.map_err(|e| tracker.abort(e.into()))?;
        if artists.is_empty() {
            return Err(tracker.abort(SyncError::NoFollowedArtists));
        }
        success!("Followed artists retrieved ({}).", artists.len());
        tracker.advance();

        let mut filter = ReleaseFilter::new(&snapshot, &state.previous_track_ids);
        let mut skipped = Vec::new();
        let total = artists.len();
        let width = utils::index_width(total);

        for (i, artist) in artists.iter().enumerate() {
            info!(
                "Checking releases from {}/{} {}",
                utils::padded_index(i + 1, width),
                total,
                artist.name
            );

            let mark = filter.added().len();
            for kind in ReleaseKind::ALL {
                let releases = self
                    .qualifying_releases(artist, kind, state.run_date_cutoff, &mut skipped)
                    .await;

                for release in releases {
                    for track in self.release_tracks(&release, &mut skipped).await {
                        report_classification(&track, filter.classify(&track));
                    }
                }
            }

            let new_ids = filter.added_since(mark).to_vec();
            if let Err(e) = self.append(&new_ids).await {
                return Err(tracker.abort(e.into()));
            }
        }
        tracker.advance();

        let added = filter.into_added();
        let committed_cutoff = self.today.max(state.run_date_cutoff);
        let updated_ids: BTreeSet<String> = state
            .previous_track_ids
            .iter()
            .chain(snapshot.iter())
            .chain(added.track_ids.iter())
            .cloned()
            .collect();
        let commits = self
            .store
            .commit_state(&loaded, committed_cutoff, &updated_ids)
            .await;
        tracker.advance();

        let elapsed = started.elapsed();
        success!("Done. All new releases added ({}).", added.len());
        for line in utils::report_lines(&added.descriptions) {
            println!("{line}");
        }
        for record in commits.iter().filter(|c| !c.is_remote()) {
            if let CommitOutcome::Backup(path) = &record.outcome {
                warning!(
                    "'{}' is waiting in {} for manual upload.",
                    record.file,
                    path.display()
                );
            }
        }
        info!("Execution time: {:.3} seconds", elapsed.as_secs_f64());
        tracker.advance();
        tracker.advance();

        Ok(RunReport {
            added,
            run_date_cutoff: state.run_date_cutoff,
            committed_cutoff,
            artists_checked: total,
            skipped,
            commits,
            phases: tracker.history().to_vec(),
            elapsed,
        })
    }

    async fn snapshot_playlist(
        &self,
        fetcher: &Fetcher,
    ) -> Result<HashSet<String>, ExhaustedRetries> {
        let ids = fetcher
            .paginate(
                "list playlist tracks",
                PageStyle::Offset,
                PLAYLIST_PAGE_LIMIT,
                |req| {
                    self.catalog
                        .list_playlist_tracks(&self.playlist_id, req.offset, req.limit)
                },
                |id: &Option<String>| {
                    if id.is_some() {
                        Verdict::Keep
                    } else {
                        Verdict::Skip
                    }
                },
            )
            .await
            .into_result()?;

        Ok(ids.into_iter().flatten().collect())
    }

    async fn followed_artists(&self, fetcher: &Fetcher) -> Result<Vec<Artist>, ExhaustedRetries> {
        fetcher
            .paginate(
                "list followed artists",
                PageStyle::Cursor,
                ARTIST_PAGE_LIMIT,
                |req| self.catalog.list_followed_artists(req.limit, req.after),
                |_: &Artist| Verdict::Keep,
            )
            .await
            .into_result()
    }

    /// Releases of one kind dated on or after `cutoff`. Listings are newest
    /// first, so the first older release ends the walk.
    async fn qualifying_releases(
        &self,
        artist: &Artist,
        kind: ReleaseKind,
        cutoff: NaiveDate,
        skipped: &mut Vec<ExhaustedRetries>,
    ) -> Vec<Release> {
        let outcome = self
            .fetcher
            .paginate(
                &format!("list {kind} releases of {}", artist.name),
                PageStyle::Offset,
                RELEASE_PAGE_LIMIT,
                |req| {
                    self.catalog
                        .list_artist_releases(&artist.id, kind, req.offset, req.limit)
                },
                |release: &Release| match release.release_date {
                    None => Verdict::Skip,
                    Some(date) if date >= cutoff => Verdict::Keep,
                    Some(_) => Verdict::Stop,
                },
            )
            .await;

        keep_partial(outcome, skipped)
    }

    async fn release_tracks(
        &self,
        release: &Release,
        skipped: &mut Vec<ExhaustedRetries>,
    ) -> Vec<Track> {
        let outcome = self
            .fetcher
            .paginate(
                &format!("list tracks of '{}'", release.name),
                PageStyle::Offset,
                RELEASE_TRACK_PAGE_LIMIT,
                |req| {
                    self.catalog
                        .list_release_tracks(&release.id, req.offset, req.limit)
                },
                |_: &Track| Verdict::Keep,
            )
            .await;

        keep_partial(outcome, skipped)
    }

    async fn append(&self, track_ids: &[String]) -> Result<(), ExhaustedRetries> {
        for chunk in track_ids.chunks(APPEND_BATCH_LIMIT) {
            self.fetcher
                .with_retry("append playlist tracks", || {
                    self.catalog.append_playlist_tracks(&self.playlist_id, chunk)
                })
                .await?;
        }
        Ok(())
    }
}

fn keep_partial<T>(outcome: FetchOutcome<Vec<T>>, skipped: &mut Vec<ExhaustedRetries>) -> Vec<T> {
    let (items, failure) = outcome.into_parts();
    if let Some(failure) = failure {
        warning!("{}. Continuing with what was fetched.", failure);
        skipped.push(failure);
    }
    items
}

fn report_classification(track: &Track, classification: Classification) {
    let description = utils::describe_track(track);
    match classification {
        Classification::AlreadyInPlaylist => println!("  Already in playlist: {description}"),
        Classification::PreviouslySynced => println!("  In playlist previously: {description}"),
        Classification::DuplicateThisRun => {}
        Classification::New => println!("  Added: {description}"),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
