//! # Spotify Integration Module
//!
//! Implements the engine's [`PlaylistApi`](crate::engine::PlaylistApi)
//! boundary on top of the Spotify Web API.
//!
//! ```text
//! engine::SortOrchestrator
//!          ↓
//! PlaylistApi (trait)
//!          ↓
//! SpotifyClient (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Endpoints
//!
//! - `GET  /me/playlists`             list the user's playlists
//! - `GET  /playlists/{id}`           snapshot id and track count
//! - `GET  /playlists/{id}/tracks`    paginated listing, the cursor is `next`
//! - `PUT  /playlists/{id}/tracks`    replace content, at most 100 URIs
//! - `POST /playlists/{id}/tracks`    append, at most 100 URIs
//!
//! Every method issues exactly one HTTP request per page or chunk. Retries,
//! batching and timeouts beyond the HTTP client's own are handled by the
//! engine.
//!
//! ## Error Mapping
//!
//! | HTTP status        | [`ApiError`](crate::engine::ApiError) |
//! |--------------------|----------------------------------------|
//! | 401                | `Auth`                                 |
//! | 403, 404           | `NotFound`                             |
//! | 429                | `RateLimited` with the `Retry-After`   |
//! | 5xx                | `Server`, keeping any `Retry-After`    |
//! | other 4xx          | `Rejected`                             |
//!
//! The access token is passed in as a [`Credential`]; this module never
//! runs an authorization flow.

pub mod client;
pub mod playlist;

pub use client::{Credential, MAX_PAGE_SIZE, MAX_WRITE_BATCH, SpotifyClient};
