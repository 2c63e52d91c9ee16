use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate every paragraph of a text file into an XHTML fragment
    Translate {
        /// Input text file, paragraphs separated by blank lines
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Target language code (overrides the configuration)
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Request streaming responses from the backend
        #[arg(long)]
        stream: bool,

        /// Do not read or write the translation cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Show the rules of a glossary file
    Glossary {
        /// Glossary file
        #[arg(short, long)]
        path: PathBuf,

        /// Sample text to show protected through the glossary
        #[arg(short, long)]
        text: Option<String>,
    },

    /// Manage the translation cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Write the default configuration file
    Init {
        /// Destination of the configuration file
        #[arg(short, long, default_value = "config.toml")]
        path: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Show cache statistics and size
    Info,

    /// Clear all cached translations
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_translate() {
        let args = Args::try_parse_from([
            "fragment-translator",
            "--verbose",
            "translate",
            "-i",
            "book.txt",
            "-o",
            "book.html",
            "--target-lang",
            "de",
            "--no-cache",
        ])
        .unwrap();

        assert!(args.verbose);
        match args.command {
            Commands::Translate { input, target_lang, stream, no_cache, .. } => {
                assert_eq!(input, PathBuf::from("book.txt"));
                assert_eq!(target_lang.as_deref(), Some("de"));
                assert!(!stream);
                assert!(no_cache);
            }
            _ => panic!("expected translate command"),
        }
    }

    #[test]
    fn test_init_default_path() {
        let args = Args::try_parse_from(["fragment-translator", "init"]).unwrap();
        match args.command {
            Commands::Init { path } => assert_eq!(path, PathBuf::from("config.toml")),
            _ => panic!("expected init command"),
        }
    }

    #[test]
    fn test_command_is_required() {
        assert!(Args::try_parse_from(["fragment-translator"]).is_err());
    }
}
