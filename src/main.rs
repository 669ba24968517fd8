use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use plsort::{cli, config, error, logging, warning};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List your playlists
    Playlists(PlaylistsOptions),

    /// Sort a playlist by a sort key
    Sort(SortOptions),

    /// List the available sort keys
    Keys,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Only show playlists whose name contains this text
    #[clap(long)]
    pub search: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SortOptions {
    /// Playlist name, id, spotify:playlist URI or open.spotify.com link
    pub playlist: String,

    /// Sort key: Name, Artist, Album, Release Date or Popularity
    #[clap(long, short = 'b', default_value = "Name")]
    pub by: String,

    /// Show the new order without changing the playlist
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    if let Err(e) = logging::init_tracing(&config::log_filter()) {
        warning!("Logging disabled: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Playlists(opt) => cli::playlists(opt.search).await,
        Command::Sort(opt) => cli::sort(opt.playlist, opt.by, opt.dry_run).await,
        Command::Keys => cli::keys(),
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
