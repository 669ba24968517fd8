use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::engine::{
    error::EngineError, model::PlaylistSnapshot, remote::PlaylistApi, retry::RetryPolicy,
};

/// Upper bound for pre-allocating a snapshot from the remote's track count.
const MAX_PREALLOCATED_TRACKS: usize = 10_000;

/// Reads a complete, order-preserving snapshot of a playlist.
pub struct TrackFetcher {
    api: Arc<dyn PlaylistApi>,
    retry: RetryPolicy,
}

impl TrackFetcher {
    pub fn new(api: Arc<dyn PlaylistApi>, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    pub async fn fetch(&self, playlist_id: &str) -> Result<PlaylistSnapshot, EngineError> {
        self.fetch_with_cancel(playlist_id, &CancellationToken::new())
            .await
    }

    /// Like [`fetch`](Self::fetch), stopping with [`EngineError::Cancelled`]
    /// before the next page once `cancel` fires.
    pub async fn fetch_with_cancel(
        &self,
        playlist_id: &str,
        cancel: &CancellationToken,
    ) -> Result<PlaylistSnapshot, EngineError> {
        let details = self
            .retry
            .run("playlist_details", Some(cancel), || {
                self.api.playlist_details(playlist_id)
            })
            .await
            .map_err(|e| e.into_engine(playlist_id))?;

        let mut tracks = Vec::with_capacity(details.total_tracks.min(MAX_PREALLOCATED_TRACKS));
        let mut expected: Option<usize> = None;
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .retry
                .run("playlist_tracks", Some(cancel), || {
                    self.api.playlist_tracks(playlist_id, cursor.clone())
                })
                .await
                .map_err(|e| e.into_engine(playlist_id))?;

            pages += 1;
            if expected.is_none() {
                expected = page.total;
            }
            debug!(
                playlist_id,
                page = pages,
                items = page.items.len(),
                "fetched playlist page"
            );

            // An empty page ends the listing even if a cursor came with it;
            // the count check below catches a truncated result.
            let empty = page.items.is_empty();
            tracks.extend(page.items);

            match page.next_cursor {
                Some(next) if !empty => cursor = Some(next),
                _ => break,
            }
        }

        let expected = expected.unwrap_or(details.total_tracks);
        if tracks.len() != expected {
            return Err(EngineError::PartialFetch {
                playlist_id: playlist_id.to_string(),
                expected,
                actual: tracks.len(),
            });
        }

        info!(playlist_id, tracks = tracks.len(), pages, "playlist fetched");

        Ok(PlaylistSnapshot {
            playlist_id: playlist_id.to_string(),
            revision: details.revision,
            tracks,
        })
    }
}
