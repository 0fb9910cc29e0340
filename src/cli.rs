//! Command-line interface

use clap::{Args, Parser, Subcommand};
use clinic_search::config::RankingPolicy;
use std::path::PathBuf;

/// Clinic catalogue search
#[derive(Parser, Debug)]
#[command(name = "clinic-search")]
#[command(about = "Search and triage over a clinic catalogue", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output (no short flag to avoid conflicts)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to <config dir>/clinic-search/config.json)
    #[arg(long, global = true, env = "CLINIC_SEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory; the built-in catalogue is used when absent
    #[arg(short, long, global = true, env = "CLINIC_SEARCH_DATA")]
    pub data: Option<PathBuf>,

    /// Skip the built-in pathways, specialties and symptoms
    #[arg(long, global = true)]
    pub no_builtin: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the catalogue
    Search(SearchArgs),
    /// Typeahead results for a partial query
    Complete(SearchArgs),
    /// Read queries line by line from stdin, answering only the latest
    Watch(WatchArgs),
    /// Walk the questions for a symptom
    Triage(TriageArgs),
    /// Lab exams recommended for a specialty
    Related(RelatedArgs),
    /// Turn physician names in text into links to their pages
    Link(LinkArgs),
    /// Load the data directory and report problems
    Validate,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Print JSON instead of markdown
    #[arg(long)]
    pub json: bool,

    /// Ranking policy (overrides the config file)
    #[arg(long, value_enum)]
    pub policy: Option<RankingPolicy>,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Search terms
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Maximum number of ranked results
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl SearchArgs {
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Quiet period before a query runs, in milliseconds
    #[arg(long, default_value_t = 150)]
    pub debounce_ms: u64,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TriageArgs {
    /// Symptom key; lists the available symptoms when omitted
    pub symptom: Option<String>,

    /// Option value for each question, in order
    #[arg(short, long = "answer")]
    pub answers: Vec<String>,

    /// Print JSON instead of markdown
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RelatedArgs {
    /// Specialty slug or page path; lists the covered specialties when omitted
    pub specialty: Option<String>,

    /// Print JSON instead of markdown
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LinkArgs {
    /// Text to scan; read from stdin when omitted
    pub text: Vec<String>,

    /// Print the found mentions as JSON instead of the linked text
    #[arg(long)]
    pub json: bool,
}
