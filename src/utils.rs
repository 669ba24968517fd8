use crate::{
    engine::{PlaylistSnapshot, PlaylistSummary, ReorderPlan, SortKey},
    types::{PlaylistTableRow, SortKeyTableRow, TrackTableRow},
};

/// Outcome of matching user input against the user's playlists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistMatch {
    Found(String),
    Ambiguous(Vec<PlaylistSummary>),
    NoMatch,
}

/// Extracts a playlist id from a `spotify:playlist:` URI or an
/// `open.spotify.com/playlist/` link. Anything else is returned trimmed.
pub fn parse_playlist_ref(input: &str) -> String {
    let input = input.trim();

    if let Some(id) = input.strip_prefix("spotify:playlist:") {
        return id.to_string();
    }

    if let Some((_, rest)) = input.split_once("open.spotify.com/playlist/") {
        let end = rest.find(['?', '/', '#']).unwrap_or(rest.len());
        return rest[..end].to_string();
    }

    input.to_string()
}

/// Finds a playlist by id first, then by exact name, then by name ignoring
/// case.
pub fn match_playlist(input: &str, playlists: &[PlaylistSummary]) -> PlaylistMatch {
    let reference = parse_playlist_ref(input);
    if playlists.iter().any(|p| p.id == reference) {
        return PlaylistMatch::Found(reference);
    }

    let exact: Vec<&PlaylistSummary> = playlists.iter().filter(|p| p.name == input).collect();
    let candidates = if exact.is_empty() {
        let lowered = input.to_lowercase();
        playlists
            .iter()
            .filter(|p| p.name.to_lowercase() == lowered)
            .collect()
    } else {
        exact
    };

    match candidates.as_slice() {
        [] => PlaylistMatch::NoMatch,
        [only] => PlaylistMatch::Found(only.id.clone()),
        many => PlaylistMatch::Ambiguous(many.iter().map(|p| (*p).clone()).collect()),
    }
}

pub fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let kept: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

pub fn build_playlist_rows(playlists: &[PlaylistSummary]) -> Vec<PlaylistTableRow> {
    let mut sorted = playlists.to_vec();
    sorted.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    sorted
        .into_iter()
        .map(|p| PlaylistTableRow {
            name: truncate(&p.name, 40),
            id: p.id,
            owner: p.owner.unwrap_or_default(),
            tracks: p.total_tracks,
        })
        .collect()
}

/// Rows of the new order, each with its position before sorting.
pub fn build_track_rows(snapshot: &PlaylistSnapshot, plan: &ReorderPlan) -> Vec<TrackTableRow> {
    plan.positions()
        .iter()
        .enumerate()
        .map(|(new, &old)| {
            let track = &snapshot.tracks[old];
            TrackTableRow {
                position: new + 1,
                original: old + 1,
                title: truncate(&track.title, 40),
                artist: truncate(track.primary_artist.as_deref().unwrap_or("-"), 25),
                album: truncate(&track.album, 30),
                released: track.release_date.clone().unwrap_or_else(|| "-".to_string()),
                popularity: track.popularity,
            }
        })
        .collect()
}

pub fn build_sort_key_rows() -> Vec<SortKeyTableRow> {
    SortKey::ALL
        .iter()
        .map(|k| SortKeyTableRow {
            key: k.label().to_string(),
            order: k.description().to_string(),
        })
        .collect()
}

/// Number of entries whose position changes under `plan`.
pub fn moved_count(plan: &ReorderPlan) -> usize {
    plan.positions()
        .iter()
        .enumerate()
        .filter(|(new, old)| new != *old)
        .count()
}
