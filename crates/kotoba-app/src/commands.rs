use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use kotoba_config::Config;
use kotoba_config::dictionary::DictionaryConfig;
use kotoba_core::{BatchOutcome, EntryStore, JlptLevel, SearchTerm};
use kotoba_lang_japanese::{JMdict, JMdictLoader, load_kanji_json, load_vocab_csv};
use kotoba_resolver::Resolver;
use kotoba_rest::RestStore;

use crate::output::write_outcome;

fn parse_level(s: &str) -> Result<JlptLevel, String> {
    JlptLevel::parse(s).ok_or_else(|| format!("invalid JLPT level '{s}', expected N5..N1"))
}

#[derive(Args, Debug)]
pub struct DictionaryArgs {
    /// jmdict-simplified JSON file (defaults to dictionary.path in the profile)
    #[arg(long)]
    pub dictionary: Option<PathBuf>,

    /// Additional dictionary files merged over the base one
    #[arg(long = "extra-dictionary")]
    pub extra_dictionaries: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Vocabulary CSV file, repeatable
    #[arg(long = "list", required = true)]
    pub lists: Vec<PathBuf>,

    /// JLPT level for every list, or one per list in the same order
    #[arg(long = "level", required = true, value_parser = parse_level)]
    pub levels: Vec<JlptLevel>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub dictionary: DictionaryArgs,

    #[command(flatten)]
    pub lists: ListArgs,

    /// Output directory (defaults to output.dir in the profile)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ResolveKanjiArgs {
    #[command(flatten)]
    pub dictionary: DictionaryArgs,

    /// kanji.json keyed by character
    #[arg(long)]
    pub kanji: PathBuf,

    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ResolveRemoteArgs {
    #[command(flatten)]
    pub lists: ListArgs,

    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub async fn resolve(config: &Config, args: ResolveArgs) -> anyhow::Result<()> {
    let dict = load_dictionary(&config.dictionary, args.dictionary).await?;
    let terms = load_lists(&args.lists)?;
    let outcome = run_batch(config, Arc::new(dict), &terms).await?;
    finish(config, args.out, &outcome)
}

pub async fn resolve_kanji(config: &Config, args: ResolveKanjiArgs) -> anyhow::Result<()> {
    let dict = load_dictionary(&config.dictionary, args.dictionary).await?;
    let list = load_kanji_json(&args.kanji)
        .with_context(|| format!("Failed to load kanji list {}", args.kanji.display()))?;
    if list.skipped > 0 {
        tracing::warn!("{} kanji have no JLPT level and were skipped", list.skipped);
    }

    let outcome = run_batch(config, Arc::new(dict), &list.terms).await?;
    finish(config, args.out, &outcome)
}

pub async fn resolve_remote(config: &Config, args: ResolveRemoteArgs) -> anyhow::Result<()> {
    let store = RestStore::new(&config.remote, config.dictionary.languages.clone())
        .context("Failed to create remote store")?;
    tracing::info!("Using remote store at {}", config.remote.rest_url());

    let terms = load_lists(&args.lists)?;
    let outcome = run_batch(config, Arc::new(store), &terms).await?;
    finish(config, args.out, &outcome)
}

async fn load_dictionary(
    config: &DictionaryConfig,
    args: DictionaryArgs,
) -> anyhow::Result<JMdict> {
    let path = args
        .dictionary
        .or_else(|| config.path.as_ref().map(PathBuf::from))
        .context("No dictionary given: pass --dictionary or set dictionary.path in the profile")?;

    let mut additional = config.additional_paths.clone();
    additional.extend(args.extra_dictionaries);
    let languages = config.languages.clone();
    let display = path.display().to_string();

    tokio::task::spawn_blocking(move || {
        JMdictLoader::load_with_additional(&path, &additional, &languages)
    })
    .await
    .context("Dictionary loader task failed")?
    .with_context(|| format!("Failed to load dictionary {display}"))
}

/// Pair every list with its level: one level for all lists, or one each
pub fn pair_lists(args: &ListArgs) -> anyhow::Result<Vec<(PathBuf, JlptLevel)>> {
    match args.levels.as_slice() {
        [level] => Ok(args.lists.iter().map(|list| (list.clone(), *level)).collect()),
        levels if levels.len() == args.lists.len() => {
            Ok(args.lists.iter().cloned().zip(levels.iter().copied()).collect())
        }
        levels => anyhow::bail!(
            "Expected one --level or one per --list, got {} levels for {} lists",
            levels.len(),
            args.lists.len()
        ),
    }
}

fn load_lists(args: &ListArgs) -> anyhow::Result<Vec<SearchTerm>> {
    let mut terms = Vec::new();
    for (path, level) in pair_lists(args)? {
        let list = load_vocab_csv(&path, level)
            .with_context(|| format!("Failed to load word list {}", path.display()))?;
        terms.extend(list);
    }
    Ok(terms)
}

async fn run_batch(
    config: &Config,
    store: Arc<dyn EntryStore>,
    terms: &[SearchTerm],
) -> anyhow::Result<BatchOutcome> {
    let resolver = Resolver::new(store, config.resolver.clone());
    let outcome = resolver
        .resolve_batch(terms)
        .await
        .context("Batch aborted")?;
    Ok(outcome)
}

fn finish(config: &Config, out: Option<PathBuf>, outcome: &BatchOutcome) -> anyhow::Result<()> {
    let dir = out.unwrap_or_else(|| PathBuf::from(&config.output.dir));
    let paths = write_outcome(&dir, outcome, config.output.level_batch_size)?;

    println!(
        "{} resolved, {} unresolved",
        outcome.resolved.len(),
        outcome.unresolved.len()
    );
    for path in [&paths.resolved, &paths.unresolved, &paths.level_rows] {
        println!("  {}", path.display());
    }
    Ok(())
}
