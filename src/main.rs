use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use playlist_analyzer::{cli, config, error, types::Feature, utils};

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
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the playlist dashboard
    Serve,

    /// Log in and print the analysis of a playlist
    Report(ReportOptions),

    /// Render the vinyl cover of an image file
    Vinyl(VinylOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ReportOptions {
    /// Playlist id or name; lists the playlists when omitted
    #[clap(long)]
    pub playlist: Option<String>,

    /// Comma separated audio features for the feature table
    #[clap(long, default_value = "valence,energy,danceability", value_parser = parse_features)]
    pub features: Features,

    /// Also request this many recommended songs (1-25)
    #[clap(long, value_parser = clap::value_parser!(u8).range(1..=25))]
    pub recommend: Option<u8>,

    /// Also place the playlist's artists by their origin
    #[clap(long)]
    pub map: bool,
}

#[derive(Debug, Clone)]
pub struct Features(Vec<Feature>);

fn parse_features(raw: &str) -> Result<Features, String> {
    utils::parse_list(raw).map(Features)
}

#[derive(Parser, Debug, Clone)]
pub struct VinylOptions {
    /// Source image (PNG or JPEG)
    input: PathBuf,
    /// Where to write the PNG
    output: PathBuf,
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

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve().await,
        Command::Report(opt) => {
            cli::report(opt.playlist, opt.features.0, opt.recommend, opt.map).await
        }
        Command::Vinyl(opt) => cli::vinyl(opt.input, opt.output).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
