use std::sync::Arc;

use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotdeck::{
    cli::{self, Source},
    config, error,
    types::PkceToken,
};
use tokio::sync::Mutex;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default())
        .placeholder(AnsiColor::BrightBlue.on_default())
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
    /// Authorize with Spotify API
    Auth,

    /// Show your profile and subscription tier
    Me,

    /// List the tracks of a playlist, your library or your top tracks
    Tracks(SourceOptions),

    /// Play the track at a position (as shown by `tracks`), or pause it if it is playing
    Play(PlayOptions),

    /// Pause playback
    Pause,

    /// Resume or pause playback
    Toggle,

    /// Jump to a position in the current track
    Seek(SeekOptions),

    /// Find duplicate tracks and remove them
    Dedupe(DedupeOptions),

    /// Remove a single track
    Remove(RemoveOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceOptions {
    /// Playlist id
    #[clap(long)]
    pub playlist: Option<String>,

    /// Your saved tracks
    #[clap(long)]
    pub library: bool,

    /// Your long-term top tracks
    #[clap(long)]
    pub top: bool,
}

impl SourceOptions {
    fn source(&self) -> Source {
        match (&self.playlist, self.library) {
            (Some(id), _) => Source::Playlist(id.clone()),
            (None, true) => Source::Library,
            (None, false) => Source::Top,
        }
    }
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct EditableSourceOptions {
    /// Playlist id
    #[clap(long)]
    pub playlist: Option<String>,

    /// Your saved tracks
    #[clap(long)]
    pub library: bool,
}

impl EditableSourceOptions {
    fn source(&self) -> Source {
        match &self.playlist {
            Some(id) => Source::Playlist(id.clone()),
            None => Source::Library,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct PlayOptions {
    /// 1-based position in the list
    pub position: usize,

    #[command(flatten)]
    pub source: SourceOptions,

    /// Spotify Connect device to play on
    #[clap(long)]
    pub device: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SeekOptions {
    /// Seconds from the start of the track
    pub seconds: u64,
}

#[derive(Parser, Debug, Clone)]
pub struct DedupeOptions {
    #[command(flatten)]
    pub source: EditableSourceOptions,

    /// Remove without asking
    #[clap(long, short)]
    pub yes: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RemoveOptions {
    /// Spotify id of the track
    pub track_id: String,

    #[command(flatten)]
    pub source: EditableSourceOptions,

    /// 1-based playlist position of the entry to remove
    #[clap(long, requires = "playlist")]
    pub position: Option<usize>,
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

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await;
        }
        Command::Me => cli::me().await,
        Command::Tracks(opt) => cli::list_tracks(opt.source()).await,
        Command::Play(opt) => cli::play(opt.position, opt.source.source(), opt.device).await,
        Command::Pause => cli::pause().await,
        Command::Toggle => cli::toggle().await,
        Command::Seek(opt) => cli::seek(opt.seconds).await,
        Command::Dedupe(opt) => cli::dedupe(opt.source.source(), opt.yes).await,
        Command::Remove(opt) => {
            cli::remove(opt.track_id, opt.source.source(), opt.position).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
