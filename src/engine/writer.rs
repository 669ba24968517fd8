use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::engine::{
    error::EngineError, model::Ack, remote::PlaylistApi, retry::RetryPolicy,
};

/// Writes a target order back to a remote playlist in bounded chunks.
///
/// The first chunk replaces the playlist content, every following chunk is
/// appended, so the remote order equals the input order once all calls
/// succeeded. A replace is idempotent and safe to retry; a retried append
/// may duplicate entries, which the final length check reports.
pub struct PlaylistWriter {
    api: Arc<dyn PlaylistApi>,
    retry: RetryPolicy,
    batch_size: usize,
}

impl PlaylistWriter {
    pub fn new(api: Arc<dyn PlaylistApi>, retry: RetryPolicy, batch_size: usize) -> Self {
        Self {
            api,
            retry,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of write calls needed for `len` entries.
    pub fn calls_for(&self, len: usize) -> usize {
        len.div_ceil(self.batch_size).max(1)
    }

    /// Commits `uris` as the new content of `playlist_id`.
    ///
    /// With `expected_revision`, the commit is refused with
    /// [`EngineError::Conflict`] if the remote revision moved. `cancel` is
    /// only honored until the first chunk is sent.
    pub async fn commit(
        &self,
        playlist_id: &str,
        uris: Vec<String>,
        expected_revision: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Ack, EngineError> {
        if let Some(expected) = expected_revision {
            let details = self
                .retry
                .run("playlist_details", Some(cancel), || {
                    self.api.playlist_details(playlist_id)
                })
                .await
                .map_err(|e| e.into_engine(playlist_id))?;

            if details.revision.as_deref() != Some(expected) {
                return Err(EngineError::Conflict {
                    playlist_id: playlist_id.to_string(),
                    expected: expected.to_string(),
                    actual: details.revision.unwrap_or_else(|| "<none>".to_string()),
                });
            }
        }

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let expected = uris.len();
        let mut chunks = uris.chunks(self.batch_size);
        let first = chunks.next().unwrap_or(&[]);

        // From here on the remote is being modified: no more cancellation.
        let mut revision = self
            .retry
            .run("replace_playlist_tracks", None, || {
                self.api.replace_playlist_tracks(playlist_id, first)
            })
            .await
            .map_err(|e| e.into_engine(playlist_id))?;
        let mut committed = first.len();
        let mut write_calls = 1;
        debug!(playlist_id, committed, expected, "replaced playlist content");

        for chunk in chunks {
            let appended = self
                .retry
                .run("append_playlist_tracks", None, || {
                    self.api.append_playlist_tracks(playlist_id, chunk)
                })
                .await
                .map_err(|e| EngineError::WriteIncomplete {
                    playlist_id: playlist_id.to_string(),
                    expected,
                    committed,
                    cause: Some(e.into_engine(playlist_id).to_string()),
                })?;

            revision = appended.or(revision);
            committed += chunk.len();
            write_calls += 1;
            debug!(playlist_id, committed, expected, "appended chunk");
        }

        let details = self
            .retry
            .run("playlist_details", None, || {
                self.api.playlist_details(playlist_id)
            })
            .await
            .map_err(|e| EngineError::WriteIncomplete {
                playlist_id: playlist_id.to_string(),
                expected,
                committed,
                cause: Some(format!(
                    "could not verify: {}",
                    e.into_engine(playlist_id)
                )),
            })?;

        if details.total_tracks != expected {
            return Err(EngineError::WriteIncomplete {
                playlist_id: playlist_id.to_string(),
                expected,
                committed: details.total_tracks,
                cause: Some("remote length differs after commit".to_string()),
            });
        }

        info!(playlist_id, committed, write_calls, "playlist committed");

        Ok(Ack {
            committed,
            write_calls,
            revision: details.revision.or(revision),
        })
    }
}
