use clap::{Parser, Subcommand};
use std::path::PathBuf;

use knowledge_rag::{RagError, Result};
use knowledge_rag::commands::{
    ask_question, prepare_corpus, print_results, run_chat, search_corpus, show_status,
};
use knowledge_rag::config::{Config, run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "knowledge-rag")]
#[command(about = "Answer questions from a document corpus with TF-IDF retrieval and a hosted language model")]
#[command(version)]
struct Cli {
    /// Chunk list to read or write instead of the configured one
    #[arg(long, global = true)]
    chunks: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the language model endpoint and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Build the knowledge base from text and PDF documents
    Prepare {
        /// Files or directories to read
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Where to write the chunk list
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Maximum words per chunk
        #[arg(long)]
        max_words: Option<usize>,
    },
    /// Show the fragments that best match a query
    Search {
        query: String,
        /// Number of fragments to return
        #[arg(long)]
        top_k: Option<usize>,
        /// Discard fragments scoring at or below this
        #[arg(long)]
        min_score: Option<f64>,
    },
    /// Answer a single question
    Ask { question: String },
    /// Start an interactive conversation
    Chat,
    /// Show knowledge base and model status
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Config { show } = cli.command {
        if show {
            show_config()?;
        } else {
            run_interactive_config()?;
        }
        return Ok(());
    }

    let mut config =
        Config::load_default().map_err(|e| RagError::Config(format!("{e:#}")))?;
    if let Some(chunks) = cli.chunks {
        config.retrieval.chunks_file = Some(chunks);
    }

    match cli.command {
        Commands::Config { .. } => {}
        Commands::Prepare {
            inputs,
            output,
            max_words,
        } => {
            let summary = prepare_corpus(&config, &inputs, output.as_deref(), max_words)?;
            println!(
                "Read {} of {} documents",
                summary.documents, summary.sources
            );
            println!(
                "Saved {} chunks to {}",
                summary.chunks,
                summary.output.display()
            );
        }
        Commands::Search {
            query,
            top_k,
            min_score,
        } => {
            let results = search_corpus(&config, &query, top_k, min_score)?;
            print_results(&results);
        }
        Commands::Ask { question } => {
            ask_question(&config, &question)?;
        }
        Commands::Chat => {
            run_chat(&config)?;
        }
        Commands::Status => {
            show_status(&config)?;
        }
    }

    Ok(())
}
