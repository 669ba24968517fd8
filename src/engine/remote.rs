use async_trait::async_trait;

use crate::engine::{error::ApiError, model::Track};

/// A playlist as listed for the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub owner: Option<String>,
    pub total_tracks: usize,
}

/// Playlist metadata read before fetching and after writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistDetails {
    pub id: String,
    pub name: String,
    pub revision: Option<String>,
    pub total_tracks: usize,
}

/// One page of a playlist listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPage {
    pub items: Vec<Track>,
    /// Opaque cursor for the following page, `None` on the last page.
    pub next_cursor: Option<String>,
    /// Total number of entries in the playlist, if the provider reports it.
    pub total: Option<usize>,
}

/// Remote operations the reordering engine depends on.
///
/// Implementations perform a single call per method: no retries, no
/// batching. Write methods must reject more URIs than the provider accepts
/// in one call; splitting is the caller's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>, ApiError>;

    async fn playlist_details(&self, playlist_id: &str) -> Result<PlaylistDetails, ApiError>;

    /// Reads the page at `cursor`, or the first page when `cursor` is `None`.
    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        cursor: Option<String>,
    ) -> Result<TrackPage, ApiError>;

    /// Replaces the whole playlist content with `uris`. Returns the new
    /// revision marker if the provider reports one.
    async fn replace_playlist_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<Option<String>, ApiError>;

    /// Appends `uris` at the end of the playlist.
    async fn append_playlist_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<Option<String>, ApiError>;
}
