//! Command-line interface: convert a parser dump into Markdown, JSON, or
//! SQLite.
//!
//! Exit codes: 0 ok, 2 bad input, 3 malformed parser dump, 4 IO error.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use scholar_oxide::config::PipelineConfig;
use scholar_oxide::dictionary::AdaptiveDictionary;
use scholar_oxide::export::{JsonDocument, MarkdownExporter};
use scholar_oxide::export::sqlite::write_sqlite;
use scholar_oxide::error::Error;
use scholar_oxide::input::ParsedDocument;
use scholar_oxide::pipeline::ScholarPipeline;

#[derive(Debug, Parser)]
#[command(name = "scholar_oxide", about = "Convert scholarly PDF text layers into structured documents", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a parser dump into a structured document
    Convert {
        /// Path to the parser dump (JSON)
        path: PathBuf,

        /// Output file; stdout when omitted (not valid for sqlite)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "markdown")]
        format: Format,

        /// Learned-dictionary file to load and update
        #[arg(long)]
        dict: Option<PathBuf>,

        /// Process pages serially
        #[arg(long)]
        no_parallel: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Markdown,
    Json,
    Sqlite,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e))
        },
    }
}

fn exit_code(error: &Error) -> u8 {
    match error {
        Error::MalformedDump(_) | Error::MalformedPage { .. } => 3,
        Error::Io(_) | Error::Json(_) | Error::Sqlite(_) => 4,
        _ => 2,
    }
}

fn run(cli: Cli) -> scholar_oxide::error::Result<()> {
    let Command::Convert { path, out, format, dict, no_parallel } = cli.command;

    if format == Format::Sqlite && out.is_none() {
        return Err(Error::Input("--format sqlite requires --out".to_string()));
    }

    let dump = ParsedDocument::from_path(&path)?;
    let config = PipelineConfig::new().with_parallel(!no_parallel);

    let mut dictionary = AdaptiveDictionary::new(config.dictionary.clone());
    if let Some(dict_path) = &dict {
        for warning in dictionary.load_learned(dict_path)? {
            log::warn!("{}", warning);
        }
    }

    let conversion = ScholarPipeline::new(config.clone()).convert(&dump, &mut dictionary)?;
    for warning in &conversion.warnings {
        log::warn!("{}", warning);
    }

    let document = &conversion.document;
    match format {
        Format::Markdown => {
            let markdown = MarkdownExporter::new(config.markdown).export(document);
            write_text_output(out.as_deref(), &markdown)?;
        },
        Format::Json => {
            let json = JsonDocument::from(document).to_json()?;
            write_text_output(out.as_deref(), &json)?;
        },
        Format::Sqlite => {
            write_sqlite(document, out.as_deref().expect("checked above"))?;
        },
    }

    if let Some(dict_path) = &dict {
        log::info!(
            "saving {} learned entries to {}",
            dictionary.learned_entries().count(),
            dict_path.display()
        );
        dictionary.save(dict_path)?;
    }

    log::info!(
        "document rating {:?}, RAG-ready: {}",
        document.quality.rating,
        document.quality.is_rag_ready()
    );
    Ok(())
}

fn write_text_output(out: Option<&std::path::Path>, content: &str) -> scholar_oxide::error::Result<()> {
    match out {
        Some(path) => std::fs::write(path, content)?,
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content.as_bytes())?;
        },
    }
    Ok(())
}
