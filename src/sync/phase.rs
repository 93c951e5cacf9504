use std::fmt;

use crate::error::{RunAborted, SyncError};

/// Phases of one run, in the only order they can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunPhase {
    Start,
    PlaylistValidated,
    PlaylistSnapshotTaken,
    StateLoaded,
    ArtistsFetched,
    ArtistsProcessed,
    StateCommitted,
    Reported,
    Done,
    Aborted,
}

impl RunPhase {
    pub fn next(self) -> Option<RunPhase> {
        use RunPhase::*;
        match self {
            Start => Some(PlaylistValidated),
            PlaylistValidated => Some(PlaylistSnapshotTaken),
            PlaylistSnapshotTaken => Some(StateLoaded),
            StateLoaded => Some(ArtistsFetched),
            ArtistsFetched => Some(ArtistsProcessed),
            ArtistsProcessed => Some(StateCommitted),
            StateCommitted => Some(Reported),
            Reported => Some(Done),
            Done | Aborted => None,
        }
    }

    /// Nothing durable has been written before the commit phase.
    pub fn can_abort(self) -> bool {
        self < RunPhase::ArtistsProcessed
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Aborted)
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Start => "START",
            RunPhase::PlaylistValidated => "PLAYLIST_VALIDATED",
            RunPhase::PlaylistSnapshotTaken => "PLAYLIST_SNAPSHOT_TAKEN",
            RunPhase::StateLoaded => "STATE_LOADED",
            RunPhase::ArtistsFetched => "ARTISTS_FETCHED",
            RunPhase::ArtistsProcessed => "ARTISTS_PROCESSED",
            RunPhase::StateCommitted => "STATE_COMMITTED",
            RunPhase::Reported => "REPORTED",
            RunPhase::Done => "DONE",
            RunPhase::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

/// Records the phases a run passes through.
#[derive(Debug, Clone)]
pub struct RunTracker {
    current: RunPhase,
    history: Vec<RunPhase>,
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RunTracker {
    pub fn new() -> Self {
        Self {
            current: RunPhase::Start,
            history: vec![RunPhase::Start],
        }
    }

    pub fn current(&self) -> RunPhase {
        self.current
    }

    pub fn history(&self) -> &[RunPhase] {
        &self.history
    }

    /// Moves to the following phase. Terminal phases stay where they are.
    pub fn advance(&mut self) -> RunPhase {
        if let Some(next) = self.current.next() {
            self.current = next;
            self.history.push(next);
        }
        self.current
    }

    /// Ends the run from the current phase.
    ///
    /// Aborting is only legal before the commit phase; later failures are
    /// reported as warnings by the caller instead.
    pub fn abort(&mut self, error: SyncError) -> RunAborted {
        debug_assert!(
            self.current.can_abort(),
            "cannot abort after {}",
            self.current
        );
        let phase = self.current;
        self.current = RunPhase::Aborted;
        self.history.push(RunPhase::Aborted);
        RunAborted { phase, error }
    }
}
