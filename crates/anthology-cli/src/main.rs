use std::io::Write;
use std::path::{Path, PathBuf};

use anthology_core::config_file::{load_config, read_config};
use anthology_core::{
    AuthorNameParts, EngineConfig, canonical_venue_slug, get_venue_type, make_bibtex_key,
    slugify_author,
};
use anthology_store::{assemble_batch, read_raw_papers, repair_dir, write_venue_json};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod output;

use output::ColorMode;

/// Normalize scraped paper records into canonical venue-year datasets
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file (default: ./.anthology.toml over the platform config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize raw records of one venue-year and write the venue file
    Normalize {
        /// Raw records: a JSON array or JSONL, optionally gzipped
        input: PathBuf,

        /// Venue slug, e.g. icml
        #[arg(long)]
        venue: String,

        /// Publication year
        #[arg(long)]
        year: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Output file stem (default: <venue>-<year>)
        #[arg(long)]
        filename: Option<String>,
    },

    /// Re-run author-name repair over every venue file in a directory
    Repair {
        /// Directory holding *.json.gz venue files
        dir: PathBuf,
    },

    /// Print the BibTeX key for a paper
    Key {
        /// First author's family name
        #[arg(long, default_value = "")]
        family: String,

        #[arg(long)]
        year: String,

        /// Venue slug or proceedings short name
        #[arg(long)]
        venue: String,

        #[arg(long)]
        title: String,
    },

    /// Print the URL slug for an author
    Slug { given: String, family: String },

    /// Print the type of a venue (conference, workshop, journal)
    VenueType {
        /// Venue slug or proceedings short name
        slug: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let config = engine_config(cli.config.as_deref())?;
    let color = ColorMode(!cli.no_color);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Normalize {
            input,
            venue,
            year,
            output,
            filename,
        } => normalize(
            &mut out,
            &config,
            &input,
            &venue,
            &year,
            &output,
            filename.as_deref(),
            color,
        ),
        Command::Repair { dir } => {
            tracing::info!(dir = %dir.display(), "repairing venue files");
            let summary = repair_dir(&dir, &config)?;
            output::print_repair_summary(&mut out, &dir, &summary, color)?;
            Ok(())
        }
        Command::Key {
            family,
            year,
            venue,
            title,
        } => {
            let venue = resolve_venue(&venue, &config);
            writeln!(out, "{}", make_bibtex_key(&family, &year, &venue, &title, &config))?;
            Ok(())
        }
        Command::Slug { given, family } => {
            writeln!(out, "{}", slugify_author(&AuthorNameParts::new(given, family)))?;
            Ok(())
        }
        Command::VenueType { slug } => {
            let slug = resolve_venue(&slug, &config);
            writeln!(out, "{}", get_venue_type(&slug, &config).as_str())?;
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout carries only command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn engine_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let file = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config file");
            read_config(path)?
        }
        None => load_config(),
    };
    Ok(file.into_builder().build()?)
}

/// Accept either a slug (`icml`) or a proceedings short name (`ICML`).
fn resolve_venue(venue: &str, config: &EngineConfig) -> String {
    canonical_venue_slug(venue, config)
        .map(str::to_string)
        .unwrap_or_else(|| venue.to_lowercase())
}

#[allow(clippy::too_many_arguments)]
fn normalize(
    out: &mut dyn Write,
    config: &EngineConfig,
    input: &Path,
    venue: &str,
    year: &str,
    output_dir: &Path,
    filename: Option<&str>,
    color: ColorMode,
) -> anyhow::Result<()> {
    let venue = resolve_venue(venue, config);
    let raw = read_raw_papers(input)?;
    tracing::info!(input = %input.display(), venue = %venue, year, records = raw.len(), "read raw records");
    let (papers, report) = assemble_batch(&venue, year, raw, config);

    if report.all_failed() {
        output::print_batch_summary(out, &venue, year, &report, None, color)?;
        anyhow::bail!(
            "all {} records of {venue} {year} failed normalization",
            report.total
        );
    }

    std::fs::create_dir_all(output_dir)?;
    let path = write_venue_json(&venue, year, &papers, output_dir, filename)?;
    output::print_batch_summary(out, &venue, year, &report, Some(&path), color)?;
    Ok(())
}
