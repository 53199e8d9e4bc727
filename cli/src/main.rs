//! unscan CLI - table and paragraph recovery for scanned pages

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unscan::{render, AnalysisOptions, Analyzer, Document, JsonFormat, PageSelection};

#[derive(Parser)]
#[command(name = "unscan")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Recover tables and paragraphs from scanned page images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze pages and print the document as JSON
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print logical tables (merged across pages)
    Tables {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Render tables as HTML instead of JSON
        #[arg(long)]
        html: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print recognized text in reading order
    Text {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show per-page layout statistics
    Info {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show version information
    Version,
}

/// Inputs and analysis settings shared by all analysing commands.
#[derive(Args)]
struct InputArgs {
    /// Page images, one page per file, in page order
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Recognition backend (tesseract, blank)
    #[arg(long, env = "UNSCAN_BACKEND")]
    backend: Option<String>,

    /// Concurrent recognition calls per page
    #[arg(long, env = "UNSCAN_WORKERS")]
    workers: Option<usize>,

    /// Tesseract language pack(s), e.g. "eng+deu"
    #[arg(long, env = "UNSCAN_LANGUAGE")]
    language: Option<String>,

    /// Tesseract page segmentation mode (0-13)
    #[arg(long)]
    psm: Option<u8>,

    /// JSON file with analysis options
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Analyze pages one at a time
    #[arg(long)]
    sequential: bool,
}

impl InputArgs {
    fn options(&self) -> Result<AnalysisOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.config {
            Some(path) => AnalysisOptions::from_json_file(path)?,
            None => AnalysisOptions::new().with_backend("tesseract"),
        };

        if let Some(backend) = &self.backend {
            options = options.with_backend(backend.as_str());
        }
        if let Some(workers) = self.workers {
            options = options.with_workers(workers);
        }
        if let Some(language) = &self.language {
            options = options.with_language(language.as_str());
        }
        if let Some(psm) = self.psm {
            options = options.with_psm(psm);
        }
        if let Some(pages) = &self.pages {
            options = options.with_pages(PageSelection::parse(pages)?);
        }
        if self.sequential {
            options = options.sequential();
        }
        log::debug!("Analysis options: {:?}", options);
        Ok(options)
    }

    fn analyze(&self) -> Result<Document, Box<dyn std::error::Error>> {
        let analyzer = Analyzer::new(self.options()?)?;

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message(format!(
            "Analyzing {} page(s) with {}...",
            self.inputs.len(),
            analyzer.backend()
        ));
        pb.enable_steady_tick(Duration::from_millis(100));

        let result = analyzer.analyze_files(&self.inputs);
        pb.finish_and_clear();

        Ok(result?)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            output,
            compact,
        } => cmd_analyze(&input, output.as_deref(), compact),
        Commands::Tables {
            input,
            output,
            html,
            compact,
        } => cmd_tables(&input, output.as_deref(), html, compact),
        Commands::Text { input, output } => cmd_text(&input, output.as_deref()),
        Commands::Info { input } => cmd_info(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn emit(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_analyze(
    input: &InputArgs,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = input.analyze()?;
    let json = render::to_json(&doc, json_format(compact))?;
    emit(output, &json)
}

fn cmd_tables(
    input: &InputArgs,
    output: Option<&Path>,
    html: bool,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = input.analyze()?;
    let tables = doc.logical_tables();

    let content = if html {
        render::tables_to_html(&tables)
    } else {
        render::tables_to_json(&tables, json_format(compact))?
    };
    emit(output, &content)
}

fn cmd_text(input: &InputArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let doc = input.analyze()?;
    let text = render::to_text(&doc)?;
    emit(output, &text)
}

fn cmd_info(input: &InputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = input.analyze()?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    if let Some(ref source) = doc.metadata.source {
        println!("{}: {}", "Source".bold(), source);
    }
    if let Some(ref backend) = doc.metadata.backend {
        println!("{}: {}", "Backend".bold(), backend);
    }
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);

    println!();
    println!("{}", "Layout".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for page in &doc.pages {
        let merged: usize = page
            .tables
            .iter()
            .map(|t| t.cells.iter().filter(|c| c.is_merged()).count())
            .sum();
        let headers = page.paragraphs.iter().filter(|p| p.is_header()).count();
        let footers = page.paragraphs.iter().filter(|p| p.is_footer()).count();

        println!(
            "{} {} ({}x{}): {} tables, {} cells ({} merged), {} paragraphs ({} header, {} footer)",
            "Page".bold(),
            page.num_page,
            page.width,
            page.height,
            page.tables.len(),
            page.cell_count(),
            merged,
            page.paragraphs.len(),
            headers,
            footers
        );
    }

    let logical = doc.logical_tables();
    println!();
    println!("{}: {}", "Logical tables".bold(), logical.len());
    for (i, table) in logical.iter().enumerate() {
        println!(
            "  {} #{}: {} rows x {} columns, starts on page {}",
            "├─".dimmed(),
            i + 1,
            table.row_count(),
            table.column_count(),
            table.start_page_num
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unscan".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Table and paragraph recovery for scanned pages");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unscan".dimmed());
    println!("License: MIT");
}
