use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comics_core::tokenizer::{query_terms, tokenize, STOPWORDS};
use comics_core::{Collection, Comic};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A comic as published in xkcd's `info.0.json`.
#[derive(Debug, Deserialize)]
struct InputComic {
    #[serde(alias = "number")]
    num: u64,
    #[serde(alias = "img_url")]
    img: String,
    title: String,
    alt: String,
    #[serde(default)]
    transcript: String,
}

impl From<InputComic> for Comic {
    fn from(c: InputComic) -> Self {
        Comic {
            id: c.num,
            img_url: c.img,
            title: c.title,
            alt: c.alt,
            transcript: c.transcript,
        }
    }
}

#[derive(Parser)]
#[command(name = "comics")]
#[command(about = "Index comics and find the one that best matches a phrase", long_about = None)]
struct Cli {
    /// Collection path
    #[arg(long, global = true, env = "COMICS_DB", default_value = "./collection.db")]
    db: PathBuf,
    /// Seed for random picks and tie-breaking
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add comics from JSON/JSONL files or a directory of them
    Add {
        /// Input path (file or directory)
        #[arg(long)]
        input: PathBuf,
        /// Skip comics whose number is already in the collection instead of failing
        #[arg(long, default_value_t = false)]
        skip_existing: bool,
    },
    /// Exclude words from search ranking
    Blacklist {
        words: Vec<String>,
        /// File with one word per line
        #[arg(long)]
        file: Option<PathBuf>,
        /// Also blacklist the built-in English stopwords
        #[arg(long, default_value_t = false)]
        stopwords: bool,
    },
    /// Find the comic that best matches a phrase, or a comic number
    Search {
        #[arg(required = true)]
        phrase: Vec<String>,
    },
    /// Show the comic with the given number
    Get { id: u64 },
    /// Show the newest comic in the collection
    Latest,
    /// Show a random comic
    Random,
}

const EMPTY_COLLECTION_MSG: &str = "my collection is empty";

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let mut collection = Collection::open(&cli.db)
        .with_context(|| format!("opening collection at {}", cli.db.display()))?;
    if let Some(seed) = cli.seed {
        collection = collection.with_rng(StdRng::seed_from_u64(seed));
    }

    match cli.command {
        Commands::Add { input, skip_existing } => {
            let (added, skipped) = add_comics(&collection, &input, skip_existing)?;
            tracing::info!(added, skipped, total = collection.len(), "add complete");
        }
        Commands::Blacklist { words, file, stopwords } => {
            let count = blacklist_words(&collection, &words, file.as_deref(), stopwords)?;
            tracing::info!(count, "blacklist updated");
        }
        Commands::Search { phrase } => {
            print_comic(lookup(&collection, &phrase.join(" "))?, "I found nothing")?;
        }
        Commands::Get { id } => {
            print_comic(collection.get(id)?, &format!("comic {id} is not in my collection"))?
        }
        Commands::Latest => print_comic(collection.latest()?, EMPTY_COLLECTION_MSG)?,
        Commands::Random => print_comic(collection.random()?, EMPTY_COLLECTION_MSG)?,
    }

    collection.close()?;
    Ok(())
}

fn print_comic(comic: Option<Comic>, missing: &str) -> Result<()> {
    match comic {
        Some(comic) => println!("{}", serde_json::to_string_pretty(&comic)?),
        None => println!("{missing}"),
    }
    Ok(())
}

/// Resolve a user phrase: a lone comic number is looked up directly when that
/// comic is stored, anything else goes through phrase search.
fn lookup(collection: &Collection, phrase: &str) -> Result<Option<Comic>> {
    let terms = query_terms(phrase);
    if let [only] = terms.as_slice() {
        if let Ok(id) = only.parse::<u64>() {
            if let Some(comic) = collection.get(id)? {
                return Ok(Some(comic));
            }
            tracing::debug!(id, "comic number not stored, falling back to phrase search");
        }
    }
    Ok(collection.search(terms.as_slice())?)
}

fn add_comics(
    collection: &Collection,
    input: &Path,
    skip_existing: bool,
) -> Result<(usize, usize)> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            let ext = p.extension().and_then(|s| s.to_str());
            if p.is_file() && matches!(ext, Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input {} does not exist", input.display());
    }

    let (mut added, mut skipped) = (0, 0);
    for file in files {
        let comics = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file)?
        } else {
            read_json(&file)?
        };
        for comic in comics {
            if skip_existing && collection.get(comic.id)?.is_some() {
                tracing::warn!(
                    comic_id = comic.id,
                    file = %file.display(),
                    "comic already stored, skipping"
                );
                skipped += 1;
                continue;
            }
            collection
                .add_comic(&comic)
                .with_context(|| format!("adding comic {} from {}", comic.id, file.display()))?;
            added += 1;
        }
    }
    Ok((added, skipped))
}

fn read_jsonl(file: &Path) -> Result<Vec<Comic>> {
    let reader = BufReader::new(File::open(file)?);
    let mut comics = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let comic: InputComic = serde_json::from_str(&line)?;
        comics.push(comic.into());
    }
    Ok(comics)
}

fn read_json(file: &Path) -> Result<Vec<Comic>> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let comics = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(|v| serde_json::from_value::<InputComic>(v).map(Comic::from))
            .collect::<Result<Vec<_>, _>>()?,
        serde_json::Value::Object(_) => vec![serde_json::from_value::<InputComic>(json)?.into()],
        _ => anyhow::bail!("{} holds neither a comic nor a list of comics", file.display()),
    };
    Ok(comics)
}

/// Blacklist every word given, read from `file`, or listed as a stopword.
/// Each entry is tokenized first so it lines up with how comic text is indexed.
fn blacklist_words(
    collection: &Collection,
    words: &[String],
    file: Option<&Path>,
    stopwords: bool,
) -> Result<usize> {
    let mut entries: Vec<String> = words.to_vec();
    if let Some(file) = file {
        let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
        entries.extend(text.lines().map(str::to_string));
    }
    if stopwords {
        entries.extend(STOPWORDS.iter().map(|w| w.to_string()));
    }

    let mut count = 0;
    for entry in &entries {
        for word in tokenize(entry) {
            collection.blacklist(&word)?;
            count += 1;
        }
    }
    Ok(count)
}
