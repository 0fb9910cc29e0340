//! clinic-search CLI
//!
//! Commands:
//! - `search <query>` - ranked, grouped catalogue results
//! - `complete <query>` - shorter typeahead list
//! - `watch` - typeahead over stdin lines, stale answers dropped
//! - `triage [symptom] -a <value>...` - symptom questions and suggestions
//! - `related [specialty]` - lab exams recommended for a specialty
//! - `link [text]` - physician names in text turned into page links
//! - `validate` - load the data directory and report problems

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, LinkArgs, OutputArgs, RelatedArgs, SearchArgs, TriageArgs, WatchArgs};
use clinic_search::catalogue::{CatalogueCache, CatalogueSource, LoadOptions};
use clinic_search::config::{load_config, SearchConfig};
use clinic_search::error::SearchError;
use clinic_search::format::{
    format_outcome, format_related, format_report, format_symptoms, format_triage,
};
use clinic_search::linker::PhysicianLinker;
use clinic_search::search::{QueryGate, SearchEngine, SearchOutcome};
use clinic_search::triage;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flags
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr) // Log to stderr to keep stdout clean
        .init();

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            Ok(())
        }
        Err(e) => {
            match e.downcast_ref::<SearchError>() {
                Some(err) => eprintln!("Error [{}]: {:#}", err.error_code(), e),
                None => eprintln!("Error: {:#}", e),
            }
            std::process::exit(get_exit_code(&e));
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let config = load_config(cli.config.as_deref()).context("Failed to load config")?;

    let source = match &cli.data {
        Some(path) => CatalogueSource::Directory {
            path: path.clone(),
            options: LoadOptions {
                with_builtin: !cli.no_builtin,
            },
        },
        None => CatalogueSource::Builtin,
    };
    let cache = CatalogueCache::new(source);

    match cli.command {
        Commands::Search(args) => execute_search(&cache, config, args, false).await,
        Commands::Complete(args) => execute_search(&cache, config, args, true).await,
        Commands::Watch(args) => execute_watch(&cache, config, args).await,
        Commands::Triage(args) => execute_triage(&cache, args).await,
        Commands::Related(args) => execute_related(&cache, args).await,
        Commands::Link(args) => execute_link(&cache, args).await,
        Commands::Validate => {
            let data = cache.get().await?;
            Ok(format_report(&data))
        }
    }
}

/// Engine over the cached catalogue. A failed load still yields an engine:
/// red flags keep working and searches report the catalogue as not ready.
async fn build_engine(
    cache: &CatalogueCache,
    mut config: SearchConfig,
    output: &OutputArgs,
) -> Result<SearchEngine> {
    if let Some(policy) = output.policy {
        config.policy = policy;
    }
    debug!("Ranking policy: {:?}", config.policy);

    let engine = match cache.get().await {
        Ok(data) => SearchEngine::new(data, config)?,
        Err(e) => {
            warn!("Catalogue unavailable: {}", e);
            SearchEngine::not_ready(config)?
        }
    };
    Ok(engine)
}

fn render(outcome: &SearchOutcome, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(outcome)?)
    } else {
        Ok(format_outcome(outcome))
    }
}

async fn execute_search(
    cache: &CatalogueCache,
    config: SearchConfig,
    args: SearchArgs,
    autocomplete: bool,
) -> Result<String> {
    let engine = build_engine(cache, config, &args.output).await?;
    let query = args.query_text();

    let outcome = match (autocomplete, args.limit) {
        (_, Some(limit)) => engine.search_with_limit(&query, limit),
        (true, None) => engine.autocomplete(&query),
        (false, None) => engine.search(&query),
    };
    render(&outcome, args.output.json)
}

async fn execute_watch(
    cache: &CatalogueCache,
    config: SearchConfig,
    args: WatchArgs,
) -> Result<String> {
    let engine = Arc::new(build_engine(cache, config, &args.output).await?);
    let gate = Arc::new(QueryGate::new());
    let delay = Duration::from_millis(args.debounce_ms);
    let json = args.output.json;

    info!("Reading queries from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let ticket = gate.issue();
        let gate = Arc::clone(&gate);
        let engine = Arc::clone(&engine);

        pending.push(tokio::spawn(async move {
            if !gate.debounce(ticket, delay).await {
                debug!("Query {:?} superseded", line);
                return Ok(());
            }
            let outcome = engine.autocomplete(&line);
            if let Some(text) = gate.settle(ticket, render(&outcome, json)?) {
                println!("{}", text);
            }
            Ok::<_, anyhow::Error>(())
        }));
    }

    for task in pending {
        task.await??;
    }
    Ok(String::new())
}

async fn execute_triage(cache: &CatalogueCache, args: TriageArgs) -> Result<String> {
    let data = cache.get().await?;

    let Some(key) = args.symptom else {
        return Ok(format_symptoms(&data.symptoms));
    };

    let symptom = data
        .symptom(&key)
        .ok_or_else(|| SearchError::from(triage::TriageError::UnknownSymptom(key.clone())))?;
    let result = triage::run(symptom, &args.answers).map_err(SearchError::from)?;

    if args.json {
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(format_triage(&result))
    }
}

async fn execute_related(cache: &CatalogueCache, args: RelatedArgs) -> Result<String> {
    let data = cache.get().await?;

    let Some(specialty) = args.specialty else {
        let specialties: Vec<&str> = data.related.specialties().collect();
        return Ok(if args.json {
            serde_json::to_string_pretty(&specialties)?
        } else {
            specialties.join("\n")
        });
    };

    let related = data
        .related_exams(&specialty)
        .ok_or_else(|| SearchError::UnknownSpecialty(specialty.clone()))?;
    if args.json {
        Ok(serde_json::to_string_pretty(related)?)
    } else {
        Ok(format_related(&specialty, related))
    }
}

async fn execute_link(cache: &CatalogueCache, args: LinkArgs) -> Result<String> {
    let data = cache.get().await?;
    let linker = PhysicianLinker::from_catalogue(&data.catalogue)?;
    debug!("Linking against {} physicians", linker.physician_count());

    let text = if args.text.is_empty() {
        let mut input = String::new();
        tokio::io::stdin()
            .read_to_string(&mut input)
            .await
            .context("Failed to read stdin")?;
        input
    } else {
        args.text.join(" ")
    };

    if args.json {
        Ok(serde_json::to_string_pretty(&linker.find(&text))?)
    } else {
        Ok(linker.link_markdown(&text))
    }
}

/// Map errors to exit codes
fn get_exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SearchError>() {
        Some(SearchError::InvalidConfig(_))
        | Some(SearchError::Triage(_))
        | Some(SearchError::UnknownSpecialty(_)) => 1,
        Some(SearchError::Json(_)) => 2,
        Some(SearchError::CatalogueUnavailable(_)) | Some(SearchError::Io(_)) => 3,
        None => 5,
    }
}
