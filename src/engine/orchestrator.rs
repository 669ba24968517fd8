use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::engine::{
    EngineConfig,
    error::{EngineError, SortError},
    fetcher::TrackFetcher,
    model::{PlaylistSnapshot, ReorderPlan, Summary},
    remote::{PlaylistApi, PlaylistSummary},
    sort_key::SortKey,
    writer::PlaylistWriter,
};

/// Entry point of the engine: fetch, sort and write back one playlist.
///
/// Cloning is cheap and clones share the in-flight registry, so the guard
/// holds across every clone handed to concurrent callers.
#[derive(Clone)]
pub struct SortOrchestrator {
    api: Arc<dyn PlaylistApi>,
    fetcher: Arc<TrackFetcher>,
    writer: Arc<PlaylistWriter>,
    config: EngineConfig,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SortOrchestrator {
    pub fn new(api: Arc<dyn PlaylistApi>, config: EngineConfig) -> Self {
        Self {
            fetcher: Arc::new(TrackFetcher::new(Arc::clone(&api), config.retry.clone())),
            writer: Arc::new(PlaylistWriter::new(
                Arc::clone(&api),
                config.retry.clone(),
                config.batch_size,
            )),
            api,
            config,
            in_flight: Arc::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Write calls a commit of `len` entries takes.
    pub fn write_calls_for(&self, len: usize) -> usize {
        self.writer.calls_for(len)
    }

    /// Playlists of the current user, for callers that let users pick one.
    pub async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>, EngineError> {
        self.config
            .retry
            .run("list_playlists", None, || self.api.list_playlists())
            .await
            .map_err(|e| e.into_engine("<current user>"))
    }

    pub async fn sort_playlist(
        &self,
        playlist_id: &str,
        sort_key: &str,
    ) -> Result<Summary, SortError> {
        self.sort_playlist_with_cancel(playlist_id, sort_key, &CancellationToken::new())
            .await
    }

    /// Sorts `playlist_id` by `sort_key` and commits the new order.
    ///
    /// `cancel` stops the operation between pages and retries, up to the
    /// moment the first write chunk goes out.
    #[instrument(skip(self, cancel))]
    pub async fn sort_playlist_with_cancel(
        &self,
        playlist_id: &str,
        sort_key: &str,
        cancel: &CancellationToken,
    ) -> Result<Summary, SortError> {
        let wrap = |kind| SortError::new(playlist_id, sort_key, kind);

        let key: SortKey = sort_key.parse().map_err(wrap)?;
        let _guard = self.acquire(playlist_id).map_err(wrap)?;

        let snapshot = self
            .fetcher
            .fetch_with_cancel(playlist_id, cancel)
            .await
            .map_err(wrap)?;
        let plan = ReorderPlan::compute(&snapshot, key);

        if plan.matches_order(&snapshot) {
            info!(tracks = snapshot.len(), "playlist already in order");
            return Ok(Summary {
                playlist_id: playlist_id.to_string(),
                sort_key: key,
                track_count: snapshot.len(),
                changed: false,
                write_calls: 0,
            });
        }

        let ack = self
            .writer
            .commit(
                playlist_id,
                plan.into_uris(),
                snapshot.revision.as_deref(),
                cancel,
            )
            .await
            .map_err(wrap)?;

        Ok(Summary {
            playlist_id: playlist_id.to_string(),
            sort_key: key,
            track_count: ack.committed,
            changed: true,
            write_calls: ack.write_calls,
        })
    }

    /// Computes the plan without writing it.
    pub async fn preview(
        &self,
        playlist_id: &str,
        sort_key: &str,
    ) -> Result<(PlaylistSnapshot, ReorderPlan), SortError> {
        let wrap = |kind| SortError::new(playlist_id, sort_key, kind);

        let key: SortKey = sort_key.parse().map_err(wrap)?;
        let _guard = self.acquire(playlist_id).map_err(wrap)?;

        let snapshot = self.fetcher.fetch(playlist_id).await.map_err(wrap)?;
        let plan = ReorderPlan::compute(&snapshot, key);
        Ok((snapshot, plan))
    }

    pub fn is_in_progress(&self, playlist_id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(playlist_id)
    }

    fn acquire(&self, playlist_id: &str) -> Result<InFlightGuard, EngineError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !in_flight.insert(playlist_id.to_string()) {
            return Err(EngineError::AlreadyInProgress {
                playlist_id: playlist_id.to_string(),
            });
        }

        Ok(InFlightGuard {
            registry: Arc::clone(&self.in_flight),
            playlist_id: playlist_id.to_string(),
        })
    }
}

/// Marks a playlist as busy until dropped.
struct InFlightGuard {
    registry: Arc<Mutex<HashSet<String>>>,
    playlist_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.playlist_id);
    }
}
