#![doc = include_str!("../README.md")]

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use semantic_md::ConversionOptions;

/// Converts HTML into semantic Markdown for language models.
#[derive(Debug, Parser)]
#[clap(name = "semantic-md", version)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert HTML to Markdown.
    ///
    /// Input is taken from `--url`, then `--input`, then stdin.
    Convert(ConvertArgs),
    /// Print the version.
    Version,
}

#[derive(Debug, Clone, Args)]
struct ConvertArgs {
    /// Input HTML file, `-` for stdin
    #[clap(short, long, value_name = "FILE")]
    input: Option<String>,

    /// Output Markdown file (default: stdout)
    #[clap(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Fetch the HTML from a URL
    #[clap(short, long)]
    url: Option<String>,

    /// Convert only the detected main content
    #[clap(short, long = "extract-main")]
    extract_main: bool,

    /// Annotate table cells with column IDs
    #[clap(short = 't', long = "track-table-columns")]
    track_table_columns: bool,

    /// Render head metadata as frontmatter (basic|extended)
    #[clap(short = 'm', long = "include-meta-data", value_name = "MODE", default_value = "")]
    include_meta_data: String,

    /// Replace long URLs by reference tokens
    #[clap(short, long = "refify-urls")]
    refify_urls: bool,

    /// Base domain of the document, stored only
    #[clap(short, long, default_value = "")]
    domain: String,

    /// Escape mode (smart|disabled)
    #[clap(long = "escape-mode", value_name = "MODE", default_value = "smart")]
    escape_mode: String,

    /// Enable debug logging
    #[clap(long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert(args) => convert(args),
        Commands::Version => {
            println!("semantic-md version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        exit(1);
    }
}

fn convert(args: ConvertArgs) -> Result<()> {
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.debug {
        logger.filter_module("semantic_md", LevelFilter::Debug);
    }
    let _ = logger.try_init();
    log::debug!("arguments: {args:?}");

    let opts = ConversionOptions::builder()
        .extract_main_content(args.extract_main)
        .enable_table_column_tracking(args.track_table_columns)
        .refify_urls(args.refify_urls)
        .website_domain(args.domain)
        .include_meta_data_str(&args.include_meta_data)?
        .escape_mode_str(&args.escape_mode)?
        .build();
    log::debug!(
        "metadata: {}, escaping: {}",
        opts.include_meta_data,
        opts.escape_mode
    );

    let html = if let Some(url) = &args.url {
        fetch(url).with_context(|| format!("failed to fetch {url}"))?
    } else {
        match args.input.as_deref() {
            Some(path) if path != "-" => {
                std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?
            }
            _ => {
                let mut html = String::new();
                std::io::stdin()
                    .read_to_string(&mut html)
                    .context("failed to read from stdin")?;
                html
            }
        }
    };
    log::debug!("read {} bytes of HTML", html.len());

    let converted = semantic_md::convert_str(&html, &opts).context("conversion failed")?;
    log::debug!("generated {} bytes of Markdown", converted.markdown.len());

    match &args.output {
        Some(path) => std::fs::write(path, &converted.markdown)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            writeln!(std::io::stdout().lock(), "{}", converted.markdown)
                .context("failed to write to stdout")?;
        }
    }

    Ok(())
}

#[cfg(feature = "fetch")]
fn fetch(url: &str) -> Result<String> {
    log::debug!("fetching {url}");
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        bail!("HTTP error: {status}");
    }
    Ok(response.text()?)
}

#[cfg(not(feature = "fetch"))]
fn fetch(_url: &str) -> Result<String> {
    bail!("fetching URLs requires the `fetch` feature")
}
