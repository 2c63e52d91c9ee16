//! Fragment Translator - batch translation of document fragments
//!
//! Command line entry point: translates the paragraphs of a text file
//! through an Ollama backend, with glossary protection and a persistent
//! translation cache.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fragment_translator::cache::FileCache;
use fragment_translator::cli::{Args, CacheAction, Commands};
use fragment_translator::config::Config;
use fragment_translator::document::TextDocument;
use fragment_translator::glossary::Glossary;
use fragment_translator::progress::{ConsoleProgress, TracingLog};
use fragment_translator::translate::common::format_duration;
use fragment_translator::translate::ollama::OllamaBackend;
use fragment_translator::translate::TranslationSession;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Translate { input, output, target_lang, stream, no_cache } => {
            if let Some(target_lang) = target_lang {
                config.translation.target_language = target_lang;
            }
            config.backend.stream |= stream;
            config.cache.enabled &= !no_cache;

            info!("Translating {} to {}", input.display(), config.translation.target_language);

            let backend = OllamaBackend::new(config.backend.clone(), &config.translation.target_language)?;
            backend.check_availability().await?;

            let mut session = TranslationSession::from_config(&config, Arc::new(backend))?;
            session.set_progress(Some(Arc::new(ConsoleProgress::new())));
            session.set_log(Some(Arc::new(TracingLog)));

            let mut document = TextDocument::load(&input).await?;
            let result = session.handle(&mut document.paragraphs).await;

            // Paragraphs translated before a failure are kept in the output.
            document.save(&output).await?;
            result?;
        }
        Commands::Glossary { path, text } => {
            let glossary = Glossary::load(&path)?;

            println!("\nGlossary rules ({}):", glossary.len());
            println!("{:<30} {:<30} {:<10}", "Term", "Replacement", "Kind");
            println!("{}", "-".repeat(70));
            for rule in glossary.rules() {
                let kind = if rule.is_protect_only() { "protect" } else { "swap" };
                println!("{:<30} {:<30} {:<10}", rule.source, rule.replacement, kind);
            }

            if let Some(text) = text {
                let replaced = glossary.replace(&text);
                println!("\nSent to backend: {}", replaced);
                println!("Restored:        {}", glossary.restore(&replaced));
            }
        }
        Commands::Cache { action } => {
            let cache = FileCache::new(&config.cache.directory);

            match action {
                CacheAction::Info => {
                    let info = cache.info().await?;
                    let now = chrono::Utc::now();

                    println!("\nTranslation cache: {}", cache.cache_dir().display());
                    println!("Entries: {}", info.entries);
                    println!("Size: {:.2} MB", info.total_size as f64 / 1024.0 / 1024.0);
                    if let Some(oldest) = info.oldest_entry {
                        let age = (now - oldest).num_seconds().max(0) as u64;
                        println!("Oldest entry: {} ago", format_duration(age));
                    }
                    if let Some(newest) = info.newest_entry {
                        let age = (now - newest).num_seconds().max(0) as u64;
                        println!("Newest entry: {} ago", format_duration(age));
                    }
                }
                CacheAction::Clear => {
                    let deleted = cache.clear().await?;
                    println!("Cleared {} cached translations", deleted);
                }
            }
        }
        Commands::Init { path } => {
            Config::default().save_to_file(&path)?;
            println!("Default configuration written to {}", path.display());
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".fragment-translator").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "fragment-translator.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("fragment-translator.log").display()
    );

    Ok(())
}
