use tabled::Table;
use tokio_util::sync::CancellationToken;

use crate::{
    cli,
    engine::{SortKey, SortOrchestrator},
    error, info, success,
    utils::{self, PlaylistMatch},
    warning,
};

pub async fn sort(playlist: String, by: String, dry_run: bool) {
    let key = match by.parse::<SortKey>() {
        Ok(key) => key,
        Err(e) => error!("{}\nRun plsort keys to list the sort keys.", e),
    };

    let engine = cli::build_engine();
    let playlist_id = resolve_playlist(&engine, &playlist).await;

    if dry_run {
        preview(&engine, &playlist_id, key).await;
        return;
    }

    // Ctrl-C only stops the sort before the first write chunk; once writing
    // started the engine finishes the commit.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let pb = cli::spinner(&format!("Sorting playlist {} by {}...", playlist_id, key));
    let result = engine
        .sort_playlist_with_cancel(&playlist_id, key.label(), &cancel)
        .await;
    pb.finish_and_clear();

    match result {
        Ok(summary) if summary.changed => success!("Playlist {}: {}", playlist_id, summary),
        Ok(summary) => info!("Playlist {}: {}", playlist_id, summary),
        Err(e) => {
            if e.kind().leaves_remote_inconsistent() {
                warning!(
                    "The remote playlist may now hold only part of its tracks. Re-run the sort to restore them."
                );
            }
            error!("{}", e);
        }
    }
}

async fn preview(engine: &SortOrchestrator, playlist_id: &str, key: SortKey) {
    let pb = cli::spinner(&format!("Fetching playlist {}...", playlist_id));
    let result = engine.preview(playlist_id, key.label()).await;
    pb.finish_and_clear();

    let (snapshot, plan) = match result {
        Ok(preview) => preview,
        Err(e) => error!("{}", e),
    };

    if plan.matches_order(&snapshot) {
        info!(
            "Playlist {} is already sorted by {} ({} tracks)",
            playlist_id,
            key,
            snapshot.len()
        );
        return;
    }

    let table = Table::new(utils::build_track_rows(&snapshot, &plan));
    println!("{}", table);
    info!(
        "{} of {} tracks would move, using {} write call(s). Nothing was changed.",
        utils::moved_count(&plan),
        plan.len(),
        engine.write_calls_for(plan.len())
    );
}

async fn resolve_playlist(engine: &SortOrchestrator, input: &str) -> String {
    let pb = cli::spinner("Resolving playlist...");
    let playlists = engine.list_playlists().await;
    pb.finish_and_clear();

    let playlists = match playlists {
        Ok(playlists) => playlists,
        Err(e) => error!("Failed to fetch playlists: {}", e),
    };

    match utils::match_playlist(input, &playlists) {
        PlaylistMatch::Found(id) => id,
        PlaylistMatch::NoMatch => utils::parse_playlist_ref(input),
        PlaylistMatch::Ambiguous(candidates) => {
            warning!("Several playlists are named {:?}:", input);
            println!("{}", Table::new(utils::build_playlist_rows(&candidates)));
            error!("Pass the playlist id instead of its name.");
        }
    }
}
