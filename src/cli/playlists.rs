use tabled::Table;

use crate::{cli, error, info, utils};

pub async fn playlists(search: Option<String>) {
    let engine = cli::build_engine();

    let pb = cli::spinner("Fetching playlists...");
    let mut playlists = match engine.list_playlists().await {
        Ok(playlists) => playlists,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to fetch playlists: {}", e);
        }
    };
    pb.finish_and_clear();

    if let Some(search) = search {
        let search_term = search.to_lowercase();
        playlists.retain(|p| p.name.to_lowercase().contains(&search_term));
    }

    if playlists.is_empty() {
        info!("No playlists found");
        return;
    }

    let table = Table::new(utils::build_playlist_rows(&playlists));
    println!("{}", table);
}
