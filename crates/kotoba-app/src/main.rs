use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub mod commands;
pub mod output;
pub mod profile;

use self::commands::{ResolveArgs, ResolveKanjiArgs, ResolveRemoteArgs};

/// Resolve JLPT word lists to JMdict entry ids
#[derive(Parser)]
#[command(name = "kotoba", version)]
struct Cli {
    /// Profile under the user config directory
    #[arg(long, global = true, default_value = "main")]
    profile: String,

    /// Debug logging (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve vocabulary lists against a local JMdict file
    Resolve(ResolveArgs),

    /// Resolve kanji.json against a local JMdict file
    ResolveKanji(ResolveKanjiArgs),

    /// Resolve vocabulary lists against the hosted database
    ResolveRemote(ResolveRemoteArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    // JSON lines when stderr goes to a file or another process
    if atty::is(atty::Stream::Stderr) {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = profile::config_dir();
    profile::init_user_config(&root)?;
    let mut config = profile::load_user_profile(&root, &cli.profile)?;
    config.apply_env();

    match cli.command {
        Commands::Resolve(args) => commands::resolve(&config, args).await,
        Commands::ResolveKanji(args) => commands::resolve_kanji(&config, args).await,
        Commands::ResolveRemote(args) => commands::resolve_remote(&config, args).await,
    }
}
