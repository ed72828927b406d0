use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

use docqa_core::chunker::ChunkingConfig;
use docqa_core::config::{self, Config};
use docqa_core::traits::QaBackend;
use docqa_embed::EmbedConfig;
use docqa_rag::backend::{BackendConfig, KnowledgeBaseBackend};
use docqa_rag::generate::{GenerationConfig, HttpAnswerGenerator};
use docqa_rag::RagEngine;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <ingest|search|ask> [args...]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn engine_from(config: &Config) -> RagEngine {
    let chunking: ChunkingConfig = config.get_or("chunking", ChunkingConfig::default());
    let embedding: EmbedConfig = config.get_or("embedding", EmbedConfig::default());
    RagEngine::new(chunking, embedding)
}

fn index_path(config: &Config) -> anyhow::Result<PathBuf> {
    let path: String = config.get_or("index.path", "data/index.json".to_string());
    Ok(config::resolve_with_base(&env::current_dir()?, path))
}

fn top_k_arg(args: &[String], config: &Config) -> usize {
    args.get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| config.get_or("index.top_k", 3))
}

/// Single-line preview of a chunk for source listings.
fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let short: String = flat.chars().take(80).collect();
    if short.len() < flat.len() {
        format!("{short}...")
    } else {
        short
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "ingest" => {
            let Some(file) = args.first() else {
                eprintln!("Usage: docqa ingest <file>");
                std::process::exit(1);
            };
            let text = fs::read_to_string(config::expand_path(file))?;
            let mut engine = engine_from(&config);

            let spinner = ProgressBar::new_spinner();
            spinner.set_message("Chunking and embedding...");
            spinner.enable_steady_tick(Duration::from_millis(100));
            let count = engine.ingest(&text)?;
            spinner.finish_and_clear();

            let path = index_path(&config)?;
            engine.save(&path)?;
            println!("✅ Ingested {} chunks into {}", count, path.display());
        }
        "search" => {
            let Some(query) = args.first() else {
                eprintln!("Usage: docqa search \"<query>\" [top_k]");
                std::process::exit(1);
            };
            let top_k = top_k_arg(&args, &config);
            let mut engine = engine_from(&config);
            engine.load(&index_path(&config)?)?;
            let results = engine.retrieve(query, top_k)?;
            if results.is_empty() {
                println!("No matches.");
            }
            for r in &results {
                println!("{}. [{:.3}] {}", r.rank, r.score, preview(&r.chunk.text));
            }
        }
        "ask" => {
            let Some(question) = args.first() else {
                eprintln!("Usage: docqa ask \"<question>\" [top_k]");
                std::process::exit(1);
            };
            let top_k = top_k_arg(&args, &config);
            let backend_cfg: BackendConfig = config.get_or("backend", BackendConfig::default());
            let outcome = if backend_cfg.mode == "managed" {
                let backend = KnowledgeBaseBackend::from_config(&backend_cfg)?;
                backend.answer(question, top_k)?
            } else {
                let mut engine = engine_from(&config);
                let generation: GenerationConfig =
                    config.get_or("generation", GenerationConfig::default());
                if generation.enabled {
                    engine = engine
                        .with_generator(Box::new(HttpAnswerGenerator::from_config(&generation)?));
                }
                engine.load(&index_path(&config)?)?;
                engine.answer(question, top_k)?
            };
            println!("{}", outcome.answer);
            if !outcome.results.is_empty() {
                println!("\nSources:");
                for r in &outcome.results {
                    println!("  {}. [{:.3}] {}", r.rank, r.score, preview(&r.chunk.text));
                }
            }
        }
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
    Ok(())
}
