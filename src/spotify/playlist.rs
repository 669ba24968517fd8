use async_trait::async_trait;

use crate::{
    engine::{ApiError, PlaylistApi, PlaylistDetails, PlaylistSummary, Track, TrackPage},
    spotify::client::{MAX_WRITE_BATCH, SpotifyClient},
    types::{
        GetUserPlaylistsResponse, Playlist, PlaylistItem, PlaylistTracksRequest,
        PlaylistTracksResponse, SnapshotResponse, TrackObject,
    },
};

const PLAYLIST_FIELDS: &str = "id,name,snapshot_id,tracks.total";

#[async_trait]
impl PlaylistApi for SpotifyClient {
    async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>, ApiError> {
        let mut playlists = Vec::new();
        let mut url = Some(self.url("/me/playlists?limit=50"));

        while let Some(page_url) = url {
            let page: GetUserPlaylistsResponse = self.send_json(self.get(&page_url)).await?;
            playlists.extend(page.items.into_iter().map(into_summary));
            url = page.next;
        }

        Ok(playlists)
    }

    async fn playlist_details(&self, playlist_id: &str) -> Result<PlaylistDetails, ApiError> {
        let url = self.url(&format!(
            "/playlists/{id}?fields={fields}",
            id = playlist_id,
            fields = PLAYLIST_FIELDS
        ));
        let playlist: Playlist = self.send_json(self.get(&url)).await?;

        Ok(PlaylistDetails {
            total_tracks: playlist.tracks.as_ref().map_or(0, |t| t.total as usize),
            id: playlist.id,
            name: playlist.name,
            revision: playlist.snapshot_id,
        })
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        cursor: Option<String>,
    ) -> Result<TrackPage, ApiError> {
        // The cursor is the `next` URL of the previous page.
        let url = cursor.unwrap_or_else(|| {
            self.url(&format!(
                "/playlists/{id}/tracks?limit={limit}&offset=0",
                id = playlist_id,
                limit = self.page_size()
            ))
        });
        let page: PlaylistTracksResponse = self.send_json(self.get(&url)).await?;
        let offset = offset_of(&url);

        let items = page
            .items
            .into_iter()
            .enumerate()
            .map(|(i, item)| into_entry(offset + i, item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TrackPage {
            items,
            next_cursor: page.next,
            total: page.total.map(|t| t as usize),
        })
    }

    async fn replace_playlist_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<Option<String>, ApiError> {
        check_batch(uris)?;
        let url = self.url(&format!("/playlists/{id}/tracks", id = playlist_id));
        let request = self.put(&url).json(&PlaylistTracksRequest {
            uris: uris.to_vec(),
        });
        let response: SnapshotResponse = self.send_json(request).await?;
        Ok(Some(response.snapshot_id))
    }

    async fn append_playlist_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<Option<String>, ApiError> {
        check_batch(uris)?;
        let url = self.url(&format!("/playlists/{id}/tracks", id = playlist_id));
        let request = self.post(&url).json(&PlaylistTracksRequest {
            uris: uris.to_vec(),
        });
        let response: SnapshotResponse = self.send_json(request).await?;
        Ok(Some(response.snapshot_id))
    }
}

fn check_batch(uris: &[String]) -> Result<(), ApiError> {
    if uris.len() > MAX_WRITE_BATCH {
        return Err(ApiError::Rejected(format!(
            "{} URIs in one call, at most {} allowed",
            uris.len(),
            MAX_WRITE_BATCH
        )));
    }
    Ok(())
}

fn offset_of(url: &str) -> usize {
    url.split(['?', '&'])
        .find_map(|pair| pair.strip_prefix("offset="))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn into_summary(playlist: Playlist) -> PlaylistSummary {
    PlaylistSummary {
        total_tracks: playlist.tracks.as_ref().map_or(0, |t| t.total as usize),
        owner: playlist
            .owner
            .map(|o| o.display_name.unwrap_or(o.id)),
        id: playlist.id,
        name: playlist.name,
    }
}

/// Converts one playlist entry. Unavailable and local entries cannot be
/// written back, so reordering a playlist that holds them would drop them.
pub(crate) fn into_entry(position: usize, item: PlaylistItem) -> Result<Track, ApiError> {
    match item.track {
        None => Err(ApiError::Malformed(format!(
            "playlist entry {position} is unavailable and cannot be reordered"
        ))),
        Some(track) if track.is_local => Err(ApiError::Malformed(format!(
            "playlist entry {position} is a local file ({}) and cannot be reordered",
            track.uri
        ))),
        Some(track) => Ok(into_track(track)),
    }
}

pub(crate) fn into_track(track: TrackObject) -> Track {
    let (album, album_date) = match track.album {
        Some(album) => (album.name, album.release_date),
        None => (String::new(), None),
    };

    Track {
        uri: track.uri,
        title: track.name,
        primary_artist: track.artists.into_iter().next().map(|a| a.name),
        album,
        release_date: album_date.or(track.release_date),
        popularity: track.popularity.unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "items": [
            {"track": {
                "uri": "spotify:track:1",
                "name": "Song",
                "artists": [{"name": "First"}, {"name": "Second"}],
                "album": {"name": "Record", "release_date": "1999-05"},
                "popularity": 42
            }},
            {"track": {
                "uri": "spotify:episode:2",
                "name": "Episode",
                "release_date": "2021-01-02",
                "type": "episode"
            }}
        ],
        "next": "https://api.spotify.com/v1/playlists/pl/tracks?offset=2&limit=2",
        "total": 3
    }"#;

    #[test]
    fn decodes_tracks_and_episodes() {
        let page: PlaylistTracksResponse = serde_json::from_str(PAGE).unwrap();
        let tracks: Vec<Track> = page
            .items
            .into_iter()
            .filter_map(|i| i.track)
            .map(into_track)
            .collect();

        assert_eq!(tracks[0].primary_artist.as_deref(), Some("First"));
        assert_eq!(tracks[0].album, "Record");
        assert_eq!(tracks[0].release_date.as_deref(), Some("1999-05"));
        assert_eq!(tracks[0].popularity, 42);

        assert_eq!(tracks[1].primary_artist, None);
        assert_eq!(tracks[1].album, "");
        assert_eq!(tracks[1].release_date.as_deref(), Some("2021-01-02"));
        assert_eq!(tracks[1].popularity, 0);
    }

    #[test]
    fn unavailable_entries_decode_as_none() {
        let page: PlaylistTracksResponse =
            serde_json::from_str(r#"{"items":[{"track":null}],"next":null,"total":1}"#).unwrap();
        assert!(page.items[0].track.is_none());
    }

    #[test]
    fn local_files_are_refused() {
        let page: PlaylistTracksResponse = serde_json::from_str(
            r#"{"items":[
                {"track":{"uri":"spotify:track:1","name":"Remote"}},
                {"track":{"uri":"spotify:local:Artist:Album:Demo:180","name":"Demo","is_local":true}},
                {"track":null}
            ],"next":null,"total":3}"#,
        )
        .unwrap();
        let mut items = page.items.into_iter();

        let remote = into_entry(0, items.next().unwrap()).unwrap();
        assert_eq!(remote.uri, "spotify:track:1");

        match into_entry(1, items.next().unwrap()) {
            Err(ApiError::Malformed(message)) => {
                assert!(message.contains("entry 1"));
                assert!(message.contains("local file"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            into_entry(2, items.next().unwrap()),
            Err(ApiError::Malformed(_))
        ));
    }

    #[test]
    fn reads_offset_from_cursor() {
        assert_eq!(
            offset_of("https://api.spotify.com/v1/playlists/pl/tracks?offset=200&limit=100"),
            200
        );
        assert_eq!(offset_of("https://api.spotify.com/v1/playlists/pl/tracks"), 0);
    }

    #[test]
    fn oversized_batches_are_rejected() {
        let uris: Vec<String> = (0..=MAX_WRITE_BATCH).map(|i| i.to_string()).collect();
        assert!(matches!(check_batch(&uris), Err(ApiError::Rejected(_))));
        assert!(check_batch(&uris[..MAX_WRITE_BATCH]).is_ok());
    }
}
