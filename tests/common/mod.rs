#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use plsort::engine::{
    ApiError, EngineConfig, PlaylistApi, PlaylistDetails, PlaylistSummary, RetryPolicy, Track,
    TrackPage,
};
use tokio::sync::Notify;

pub const PLAYLIST_ID: &str = "pl-1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCall {
    Replace(Vec<String>),
    Append(Vec<String>),
}

#[derive(Default)]
struct State {
    tracks: Vec<Track>,
    revision: u64,
    writes: Vec<WriteCall>,
    page_reads: usize,
    detail_reads: usize,
    reported_total: Option<usize>,
    fail_append_number: Option<usize>,
    appends_seen: usize,
}

/// In-memory playlist service with Spotify-like limits.
pub struct FakeRemote {
    state: Mutex<State>,
    catalog: HashMap<String, Track>,
    page_size: usize,
    max_batch: usize,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl FakeRemote {
    pub fn new(tracks: Vec<Track>, page_size: usize, max_batch: usize) -> Self {
        let catalog = tracks.iter().map(|t| (t.uri.clone(), t.clone())).collect();
        Self {
            state: Mutex::new(State {
                tracks,
                revision: 1,
                ..State::default()
            }),
            catalog,
            page_size,
            max_batch,
            gate: None,
        }
    }

    /// Blocks the first details read until `release` is notified and
    /// signals `entered` once it is waiting.
    pub fn with_gate(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some((entered, release));
        self
    }

    /// Makes the listing report `total` entries regardless of content.
    pub fn reporting_total(self, total: usize) -> Self {
        self.state.lock().unwrap().reported_total = Some(total);
        self
    }

    /// Fails every attempt of the `n`-th append call (1-based) with a 503.
    pub fn failing_append(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_append_number = Some(n);
        self
    }

    pub fn stored_uris(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .tracks
            .iter()
            .map(|t| t.uri.clone())
            .collect()
    }

    pub fn writes(&self) -> Vec<WriteCall> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn page_reads(&self) -> usize {
        self.state.lock().unwrap().page_reads
    }

    pub fn total_reads(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.page_reads + state.detail_reads
    }

    /// Simulates another client editing the playlist.
    pub fn external_edit(&self) {
        let mut state = self.state.lock().unwrap();
        state.tracks.reverse();
        state.revision += 1;
    }

    fn revision(state: &State) -> String {
        format!("rev-{}", state.revision)
    }

    fn resolve(&self, uris: &[String]) -> Result<Vec<Track>, ApiError> {
        if uris.len() > self.max_batch {
            return Err(ApiError::Rejected(format!(
                "{} uris exceed the limit of {}",
                uris.len(),
                self.max_batch
            )));
        }
        uris.iter()
            .map(|uri| {
                self.catalog
                    .get(uri)
                    .cloned()
                    .ok_or_else(|| ApiError::Rejected(format!("unknown uri {uri}")))
            })
            .collect()
    }

    fn check_id(playlist_id: &str) -> Result<(), ApiError> {
        if playlist_id == PLAYLIST_ID {
            Ok(())
        } else {
            Err(ApiError::NotFound(playlist_id.to_string()))
        }
    }
}

#[async_trait]
impl PlaylistApi for FakeRemote {
    async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(vec![PlaylistSummary {
            id: PLAYLIST_ID.to_string(),
            name: "Fake".to_string(),
            owner: None,
            total_tracks: state.tracks.len(),
        }])
    }

    async fn playlist_details(&self, playlist_id: &str) -> Result<PlaylistDetails, ApiError> {
        Self::check_id(playlist_id)?;

        let first_read = {
            let mut state = self.state.lock().unwrap();
            state.detail_reads += 1;
            state.detail_reads == 1
        };
        if let (true, Some((entered, release))) = (first_read, &self.gate) {
            entered.notify_one();
            release.notified().await;
        }

        let state = self.state.lock().unwrap();
        Ok(PlaylistDetails {
            id: playlist_id.to_string(),
            name: "Fake".to_string(),
            revision: Some(Self::revision(&state)),
            total_tracks: state.tracks.len(),
        })
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        cursor: Option<String>,
    ) -> Result<TrackPage, ApiError> {
        Self::check_id(playlist_id)?;

        let offset: usize = match cursor {
            Some(c) => c
                .parse()
                .map_err(|_| ApiError::Rejected(format!("bad cursor {c}")))?,
            None => 0,
        };

        let mut state = self.state.lock().unwrap();
        state.page_reads += 1;
        let end = (offset + self.page_size).min(state.tracks.len());
        let items = state.tracks[offset.min(end)..end].to_vec();

        Ok(TrackPage {
            items,
            next_cursor: (end < state.tracks.len()).then(|| end.to_string()),
            total: Some(state.reported_total.unwrap_or(state.tracks.len())),
        })
    }

    async fn replace_playlist_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<Option<String>, ApiError> {
        Self::check_id(playlist_id)?;
        let tracks = self.resolve(uris)?;

        let mut state = self.state.lock().unwrap();
        state.tracks = tracks;
        state.revision += 1;
        state.writes.push(WriteCall::Replace(uris.to_vec()));
        Ok(Some(Self::revision(&state)))
    }

    async fn append_playlist_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<Option<String>, ApiError> {
        Self::check_id(playlist_id)?;
        let tracks = self.resolve(uris)?;

        let mut state = self.state.lock().unwrap();
        state.appends_seen += 1;
        if state.fail_append_number == Some(state.appends_seen) {
            state.appends_seen -= 1;
            return Err(ApiError::Server {
                status: 503,
                message: "service unavailable".to_string(),
                retry_after: None,
            });
        }

        state.tracks.extend(tracks);
        state.revision += 1;
        state.writes.push(WriteCall::Append(uris.to_vec()));
        Ok(Some(Self::revision(&state)))
    }
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        max_retry_after: Duration::from_secs(1),
        call_timeout: Duration::from_secs(5),
    }
}

pub fn engine_config(batch_size: usize) -> EngineConfig {
    EngineConfig {
        batch_size,
        retry: fast_retry(),
    }
}

pub fn track(n: usize) -> Track {
    Track {
        uri: format!("spotify:track:{n:04}"),
        title: format!("Title {n:04}"),
        primary_artist: Some(format!("Artist {}", n % 7)),
        album: format!("Album {}", n % 5),
        release_date: Some(format!("{}-0{}-1{}", 1990 + n % 30, 1 + n % 9, n % 10)),
        popularity: (n * 37 % 101) as u32,
    }
}

pub fn titled(uri: &str, title: &str) -> Track {
    Track {
        uri: uri.to_string(),
        title: title.to_string(),
        primary_artist: None,
        album: String::new(),
        release_date: None,
        popularity: 0,
    }
}

pub fn with_popularity(uri: &str, popularity: u32) -> Track {
    Track {
        popularity,
        ..titled(uri, "same")
    }
}
