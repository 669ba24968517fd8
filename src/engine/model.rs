use std::fmt;

use crate::engine::sort_key::SortKey;

/// One entry of a playlist, reduced to the fields the sort keys look at.
///
/// The same track may appear several times in a playlist; every occurrence
/// is its own positional entry and is never merged with the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub uri: String,
    pub title: String,
    pub primary_artist: Option<String>,
    pub album: String,
    pub release_date: Option<String>,
    pub popularity: u32,
}

/// A full, ordered read of a playlist at one point in time.
#[derive(Debug, Clone)]
pub struct PlaylistSnapshot {
    pub playlist_id: String,
    /// Provider revision marker at the time of the read, if exposed.
    pub revision: Option<String>,
    pub tracks: Vec<Track>,
}

impl PlaylistSnapshot {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn uris(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.uri.clone()).collect()
    }
}

/// Target order computed from a snapshot.
///
/// Only [`ReorderPlan::compute`] builds a plan, and it does so by permuting
/// the snapshot's positions, so a plan always holds exactly the snapshot's
/// entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    uris: Vec<String>,
    positions: Vec<usize>,
}

impl ReorderPlan {
    pub fn compute(snapshot: &PlaylistSnapshot, key: SortKey) -> Self {
        let cmp = key.comparator();
        let tracks = &snapshot.tracks;

        // `sort_by` is stable: equal keys keep their snapshot order.
        let mut positions: Vec<usize> = (0..tracks.len()).collect();
        positions.sort_by(|&a, &b| cmp(&tracks[a], &tracks[b]));

        let uris = positions.iter().map(|&i| tracks[i].uri.clone()).collect();
        Self { uris, positions }
    }

    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    /// Original snapshot position of each entry, in target order.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    /// True when applying the plan would leave the playlist as it is.
    pub fn matches_order(&self, snapshot: &PlaylistSnapshot) -> bool {
        self.uris.len() == snapshot.tracks.len()
            && self
                .uris
                .iter()
                .zip(&snapshot.tracks)
                .all(|(uri, track)| *uri == track.uri)
    }

    pub fn into_uris(self) -> Vec<String> {
        self.uris
    }
}

/// Outcome of a sort operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub playlist_id: String,
    pub sort_key: SortKey,
    pub track_count: usize,
    pub changed: bool,
    pub write_calls: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changed {
            write!(
                f,
                "sorted {} tracks by {} in {} write call(s)",
                self.track_count, self.sort_key, self.write_calls
            )
        } else {
            write!(
                f,
                "{} tracks already sorted by {}",
                self.track_count, self.sort_key
            )
        }
    }
}

/// Acknowledgement of a completed commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub committed: usize,
    pub write_calls: usize,
    pub revision: Option<String>,
}
