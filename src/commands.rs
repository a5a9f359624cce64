use anyhow::{Context, Result, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::assistant::{Assistant, load_ranker};
use crate::config::Config;
use crate::corpus::{chunk_documents, collect_sources, load_documents_with, save_chunks};
use crate::llm::{ChatClient, CompletionModel};
use crate::retrieval::RankedChunk;
use crate::session::SessionId;

/// Outcome of a corpus preparation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareSummary {
    pub sources: usize,
    pub documents: usize,
    pub chunks: usize,
    pub output: PathBuf,
}

/// Load documents, cut them into chunks and write the chunk list
///
/// `output` defaults to the configured chunks file and `max_words` to the
/// configured chunk limit.
#[inline]
pub fn prepare_corpus(
    config: &Config,
    inputs: &[PathBuf],
    output: Option<&Path>,
    max_words: Option<usize>,
) -> Result<PrepareSummary> {
    if inputs.is_empty() {
        bail!("No input files or directories given");
    }

    let mut chunking = config.chunking.clone();
    if let Some(max_words) = max_words {
        if max_words == 0 {
            bail!("--max-words must be greater than 0");
        }
        chunking.max_words = max_words;
    }

    let sources = collect_sources(inputs);
    info!("Preparing knowledge base from {} source files", sources.len());

    let bar = if console::user_attended_stderr() {
        ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] Reading {msg}")
                .expect("style template is valid"),
        )
    } else {
        ProgressBar::hidden()
    };
    bar.set_length(sources.len() as u64);

    let documents = load_documents_with(&sources, |source| {
        bar.set_message(source.display().to_string());
        bar.inc(1);
    });
    bar.finish_and_clear();

    if documents.is_empty() {
        warn!("No readable documents found; writing an empty knowledge base");
    }

    let chunks = chunk_documents(&documents, &chunking);
    let output = output.map_or_else(|| config.chunks_path(), Path::to_path_buf);
    save_chunks(&output, &chunks)?;

    Ok(PrepareSummary {
        sources: sources.len(),
        documents: documents.len(),
        chunks: chunks.len(),
        output,
    })
}

/// Rank the stored chunk list against a query
#[inline]
pub fn search_corpus(
    config: &Config,
    query: &str,
    top_k: Option<usize>,
    min_score: Option<f64>,
) -> Result<Vec<RankedChunk>> {
    let ranker = load_ranker(&config.chunks_path());
    if !ranker.is_ready() {
        bail!(
            "Knowledge base {} is missing or empty. Run 'knowledge-rag prepare' first.",
            config.chunks_path().display()
        );
    }

    Ok(ranker.rank(
        query,
        top_k.unwrap_or(config.retrieval.top_k),
        min_score.unwrap_or(config.retrieval.min_score),
    ))
}

#[inline]
pub fn print_results(results: &[RankedChunk]) {
    if results.is_empty() {
        println!("No relevant fragments found.");
        return;
    }

    for (i, result) in results.iter().enumerate() {
        println!(
            "{} {}",
            style(format!("[{}]", i + 1)).bold().cyan(),
            style(format!("score {:.3}", result.score)).dim()
        );
        println!("{}", result.text);
        println!();
    }
}

/// Answer one question with the configured model and print its sources
#[inline]
pub fn ask_question(config: &Config, question: &str) -> Result<()> {
    let client = ChatClient::new(&config.llm).context("Failed to create model client")?;
    let assistant = Assistant::from_config(config, client);

    let answer = assistant.answer(&SessionId::generate(), question)?;

    println!("{}", answer.text);
    if !answer.sources.is_empty() {
        println!();
        println!("{}", style("Sources:").bold().yellow());
        print_results(&answer.sources);
    }

    Ok(())
}

/// Interactive conversation on stdin with the configured model
#[inline]
pub fn run_chat(config: &Config) -> Result<()> {
    let client = ChatClient::new(&config.llm).context("Failed to create model client")?;
    let assistant = Assistant::from_config(config, client);

    eprintln!("{}", style("💬 Knowledge RAG chat").bold().cyan());
    eprintln!("Type a question. /reset clears the conversation, /quit exits.");
    eprintln!();

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_chat_with(&assistant, stdin.lock(), stdout.lock())
}

/// Drive a chat session over arbitrary input and output streams
#[inline]
pub fn run_chat_with<M, R, W>(assistant: &Assistant<M>, input: R, mut output: W) -> Result<()>
where
    M: CompletionModel,
    R: BufRead,
    W: Write,
{
    let session = SessionId::generate();
    write!(output, "> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line.context("Failed to read input")?;

        match line.trim() {
            "" => {}
            "/quit" | "/exit" => break,
            "/reset" | "/cancel" => {
                assistant.reset(&session);
                writeln!(output, "Conversation cleared.")?;
            }
            question => match assistant.answer(&session, question) {
                Ok(answer) => {
                    writeln!(output, "{}", answer.text)?;
                    writeln!(output)?;
                }
                Err(e) => {
                    warn!("Failed to answer: {}", e);
                    writeln!(output, "Error: {}", e)?;
                }
            },
        }

        write!(output, "> ")?;
        output.flush()?;
    }

    writeln!(output)?;
    Ok(())
}

/// Print configuration paths, knowledge base statistics and the model endpoint
#[inline]
pub fn show_status(config: &Config) -> Result<()> {
    println!("📊 Knowledge RAG Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("⚙️  Configuration:");
    let config_file = config.config_file_path();
    if config_file.exists() {
        println!("   ✅ Config file: {}", config_file.display());
    } else {
        println!("   ⚠️  Config file: {} (using defaults)", config_file.display());
    }

    println!();
    println!("📚 Knowledge Base:");
    let chunks_path = config.chunks_path();
    println!("   File: {}", chunks_path.display());
    let ranker = load_ranker(&chunks_path);
    if ranker.is_ready() {
        println!("   ✅ Chunks: {}", ranker.len());
        println!("   🔤 Vocabulary: {} terms", ranker.vocabulary_size());
    } else {
        println!("   ❌ Not prepared. Run 'knowledge-rag prepare <inputs>'.");
    }
    println!(
        "   🔍 Top k: {}, min score: {}",
        config.retrieval.top_k, config.retrieval.min_score
    );

    println!();
    println!("🤖 Language Model:");
    match config.llm.endpoint_url() {
        Ok(url) => println!("   Endpoint: {}", url),
        Err(e) => println!("   ❌ Endpoint: invalid - {}", e),
    }
    println!("   📋 Model: {}", config.llm.model);
    if std::env::var_os(&config.llm.api_key_env).is_some() {
        println!("   🔑 {}: set", config.llm.api_key_env);
    } else {
        println!("   ⚠️  {}: not set", config.llm.api_key_env);
    }

    println!();
    println!("🗂️  Sessions:");
    println!(
        "   TTL: {} minutes, max turns: {}",
        config.session.ttl_minutes, config.session.max_turns
    );

    Ok(())
}
