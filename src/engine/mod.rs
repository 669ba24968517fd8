//! # Playlist Reordering Engine
//!
//! Fetches the full track listing of a remote playlist, orders it by a
//! [`SortKey`] and writes the result back in bounded chunks.
//!
//! ```text
//! SortOrchestrator
//!     ├── TrackFetcher   (paginated read, count check)
//!     ├── sort_key       (stable comparators)
//!     └── PlaylistWriter (replace + append chunks, length check)
//!          ↓
//! PlaylistApi (injected adapter, e.g. spotify::SpotifyClient)
//! ```
//!
//! Every remote call goes through the [`RetryPolicy`]: a per-call timeout,
//! exponential backoff for transient failures, and no retries for
//! authentication, not-found or rejected requests.
//!
//! The engine never keeps state between operations apart from the set of
//! playlists currently being sorted.

pub mod error;
pub mod fetcher;
pub mod model;
pub mod orchestrator;
pub mod remote;
pub mod retry;
pub mod sort_key;
pub mod writer;

pub use error::{ApiError, EngineError, SortError};
pub use fetcher::TrackFetcher;
pub use model::{Ack, PlaylistSnapshot, ReorderPlan, Summary, Track};
pub use orchestrator::SortOrchestrator;
pub use remote::{PlaylistApi, PlaylistDetails, PlaylistSummary, TrackPage};
pub use retry::RetryPolicy;
pub use sort_key::{Comparator, SortKey, comparator};
pub use writer::PlaylistWriter;

/// Largest number of URIs a single Spotify write call accepts.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Tunables of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of URIs per write call.
    pub batch_size: usize,
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}
