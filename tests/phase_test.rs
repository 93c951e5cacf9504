use radarcli::{
    error::SyncError,
    sync::{RunPhase, RunTracker},
};

#[test]
fn test_phases_are_strictly_sequential() {
    let mut phase = RunPhase::Start;
    let mut seen = vec![phase];
    while let Some(next) = phase.next() {
        assert!(next > phase);
        seen.push(next);
        phase = next;
    }

    assert_eq!(
        seen,
        vec![
            RunPhase::Start,
            RunPhase::PlaylistValidated,
            RunPhase::PlaylistSnapshotTaken,
            RunPhase::StateLoaded,
            RunPhase::ArtistsFetched,
            RunPhase::ArtistsProcessed,
            RunPhase::StateCommitted,
            RunPhase::Reported,
            RunPhase::Done,
        ]
    );
    assert_eq!(RunPhase::Aborted.next(), None);
}

#[test]
fn test_abort_only_before_commit() {
    assert!(RunPhase::Start.can_abort());
    assert!(RunPhase::PlaylistSnapshotTaken.can_abort());
    assert!(RunPhase::ArtistsFetched.can_abort());
    assert!(!RunPhase::ArtistsProcessed.can_abort());
    assert!(!RunPhase::StateCommitted.can_abort());
    assert!(!RunPhase::Reported.can_abort());
}

#[test]
fn test_phase_display() {
    assert_eq!(RunPhase::PlaylistSnapshotTaken.to_string(), "PLAYLIST_SNAPSHOT_TAKEN");
    assert_eq!(RunPhase::Done.to_string(), "DONE");
}

#[test]
fn test_tracker_records_history() {
    let mut tracker = RunTracker::new();
    tracker.advance();
    tracker.advance();

    let aborted = tracker.abort(SyncError::NoFollowedArtists);

    assert_eq!(aborted.phase, RunPhase::PlaylistSnapshotTaken);
    assert_eq!(tracker.current(), RunPhase::Aborted);
    assert!(tracker.current().is_terminal());
    assert_eq!(
        tracker.history(),
        [
            RunPhase::Start,
            RunPhase::PlaylistValidated,
            RunPhase::PlaylistSnapshotTaken,
            RunPhase::Aborted
        ]
    );
}

#[test]
fn test_tracker_stays_at_done() {
    let mut tracker = RunTracker::default();
    for _ in 0..20 {
        tracker.advance();
    }

    assert_eq!(tracker.current(), RunPhase::Done);
    assert_eq!(tracker.history().len(), 9);
}
