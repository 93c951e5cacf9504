use std::collections::{BTreeSet, HashSet};

use crate::{
    types::{AddedTracks, Track},
    utils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    AlreadyInPlaylist,
    PreviouslySynced,
    DuplicateThisRun,
    New,
}

/// Decides which candidate tracks get appended during one run.
///
/// Owns the run's "added" list; a track id can be classified
/// [`Classification::New`] at most once.
pub struct ReleaseFilter<'a> {
    playlist_snapshot: &'a HashSet<String>,
    previous_track_ids: &'a BTreeSet<String>,
    added_ids: HashSet<String>,
    added: AddedTracks,
}

impl<'a> ReleaseFilter<'a> {
    pub fn new(
        playlist_snapshot: &'a HashSet<String>,
        previous_track_ids: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            playlist_snapshot,
            previous_track_ids,
            added_ids: HashSet::new(),
            added: AddedTracks::default(),
        }
    }

    /// First match wins: snapshot, previous ids, added earlier this run.
    pub fn classify(&mut self, track: &Track) -> Classification {
        if self.playlist_snapshot.contains(&track.id) {
            return Classification::AlreadyInPlaylist;
        }
        if self.previous_track_ids.contains(&track.id) {
            return Classification::PreviouslySynced;
        }
        if !self.added_ids.insert(track.id.clone()) {
            return Classification::DuplicateThisRun;
        }

        self.added.track_ids.push(track.id.clone());
        self.added.descriptions.push(utils::describe_track(track));
        Classification::New
    }

    pub fn added(&self) -> &AddedTracks {
        &self.added
    }

    /// Ids classified new after the first `mark` additions.
    pub fn added_since(&self, mark: usize) -> &[String] {
        self.added.track_ids.get(mark..).unwrap_or(&[])
    }

    pub fn into_added(self) -> AddedTracks {
        self.added
    }
}
