//! docorder CLI - page orientation and reading order tool

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docorder::{
    estimate_page_orientation, load_file, render, Docorder, Document, JsonFormat, OrderOptions,
    OrientationMethod, OrientationOptions, Rotation,
};

#[derive(Parser)]
#[command(name = "docorder")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Fix page rotation and reading order of analyzed documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show document information
    Info {
        /// Input JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Estimate page orientation and store it on each page
    Orient {
        /// Input JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// How word angles are combined
        #[arg(long, value_enum, default_value = "circular")]
        method: Method,
    },

    /// Rotate pages around their center
    Rotate {
        /// Input JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Angle in degrees (positive turns clockwise on the page)
        #[arg(short, long, allow_negative_numbers = true)]
        degrees: f64,

        /// Page number to rotate (all pages if not specified)
        #[arg(short, long)]
        page: Option<u32>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Rearrange blocks into reading order
    Order {
        /// Input JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print lines in reading order
    Text {
        /// Input JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Rotate pages upright first
        #[arg(long)]
        correct: bool,
    },

    /// Run orientation and ordering over many files
    Process {
        /// Input JSON files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Rotate pages upright before ordering
        #[arg(long)]
        correct: bool,

        /// Process files one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Circular mean of word angles
    Circular,
    /// Most populated quarter turn plus mean residual
    Bucket,
}

impl From<Method> for OrientationMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Circular => OrientationMethod::CircularMean,
            Method::Bucket => OrientationMethod::QuadrantBucket,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Orient {
            input,
            output,
            method,
        }) => cmd_orient(&input, output.as_deref(), method),
        Some(Commands::Rotate {
            input,
            degrees,
            page,
            output,
        }) => cmd_rotate(&input, degrees, page, output.as_deref()),
        Some(Commands::Order {
            input,
            output,
            compact,
        }) => cmd_order(&input, output.as_deref(), compact),
        Some(Commands::Text { input, correct }) => cmd_text(&input, correct),
        Some(Commands::Process {
            inputs,
            output,
            correct,
            sequential,
        }) => cmd_process(&inputs, &output, correct, sequential),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: docorder <COMMAND> <FILE>".yellow());
            println!("       docorder --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn write_output(
    doc: &Document,
    output: Option<&Path>,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = render::to_json(doc, format)?;
    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_file(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), doc.page_count());
    println!("{}: {}", "Blocks".bold(), doc.blocks.len());
    if let Some(ref status) = doc.job_status {
        println!("{}: {}", "Job status".bold(), status);
    }
    if let Some(ref version) = doc.analyze_document_model_version {
        println!("{}: {}", "Model".bold(), version);
    }

    println!();
    println!("{}", "Block Types".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for block in &doc.blocks {
        let name = serde_json::to_value(block.block_type)?
            .as_str()
            .unwrap_or("UNKNOWN")
            .to_string();
        *counts.entry(name).or_default() += 1;
    }
    for (name, count) in &counts {
        println!("{}: {}", name.bold(), count);
    }

    println!();
    println!("{}", "Page Orientation".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    let options = OrientationOptions::default();
    for (i, page_id) in doc.page_ids().iter().enumerate() {
        match estimate_page_orientation(&doc, page_id, &options)? {
            Some(degrees) => println!("{} {}: {:.2}°", "Page".bold(), i + 1, degrees),
            None => println!("{} {}: {}", "Page".bold(), i + 1, "no words".dimmed()),
        }
    }

    Ok(())
}

fn cmd_orient(
    input: &Path,
    output: Option<&Path>,
    method: Method,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = load_file(input)?;
    let options = OrientationOptions::new().with_method(method.into());
    docorder::add_page_orientation(&mut doc, &options)?;
    write_output(&doc, output, JsonFormat::Pretty)
}

fn cmd_rotate(
    input: &Path,
    degrees: f64,
    page: Option<u32>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = load_file(input)?;
    let rotation = Rotation::around_center(degrees);

    let count = match page {
        Some(number) => {
            let page_id = doc
                .get_page(number)
                .map(|p| p.id.clone())
                .ok_or_else(|| format!("Page {} not found", number))?;
            doc.rotate_page(&page_id, &rotation)?
        }
        None => doc.rotate(&rotation)?,
    };
    log::info!("rotated {} blocks by {} degrees", count, degrees);

    write_output(&doc, output, JsonFormat::Pretty)
}

fn cmd_order(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_file(input)?;
    let ordered = docorder::order_blocks_by_geo(&doc, &OrderOptions::default())?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    write_output(&ordered, output, format)
}

fn cmd_text(input: &Path, correct: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = Docorder::new();
    if correct {
        builder = builder.correct_rotation();
    }
    let text = builder.process_file(input)?.to_text()?;
    println!("{}", text);
    Ok(())
}

fn cmd_process(
    inputs: &[PathBuf],
    output: &Path,
    correct: bool,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(output)?;

    let mut builder = Docorder::new();
    if correct {
        builder = builder.correct_rotation();
    }
    if sequential {
        builder = builder.sequential();
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Processing...");
    let results = builder.process_files_with(inputs, |_| pb.inc(1));

    pb.set_message("Writing...");
    let mut failed = 0;
    for (input, result) in inputs.iter().zip(results) {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.json".to_string());
        match result.and_then(|r| r.to_json(JsonFormat::Pretty)) {
            Ok(json) => fs::write(output.join(&name), json)?,
            Err(e) => {
                failed += 1;
                pb.println(format!("{} {}: {}", "Failed".red(), input.display(), e));
            }
        }
    }
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} of {} files written to {}",
        "Done!".green().bold(),
        inputs.len() - failed,
        inputs.len(),
        output.display()
    );
    if failed > 0 {
        return Err(format!("{} files failed", failed).into());
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docorder".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Page orientation and reading order tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docorder".dimmed());
    println!("License: MIT");
}
