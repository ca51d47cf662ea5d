use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;

use tattoo_quote_lib::config::Config;
use tattoo_quote_lib::image_io::{get_image_files_in_dir, load_image};
use tattoo_quote_lib::output::{write_quotes_csv, BatchRow};
use tattoo_quote_lib::pipeline::process_image;
use tattoo_quote_lib::pricing::{PricingEngine, QuestionnaireWeights, SizeWeight};
use tattoo_quote_lib::report::{format_analysis_report, format_questionnaire_summary, QuestionnaireLabels};
use tattoo_quote_lib::{parse_height, TattooQuoteError};

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "TattooQuote - Tattoo price estimation")]
struct Args {
    /// Path to configuration file (defaults are used if it does not exist)
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Path to output directory (overwrites config)
    #[clap(short, long)]
    output: Option<String>,

    /// Log per-stage details
    #[clap(short, long)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate the price of a single reference image
    Analyze {
        #[clap(short, long)]
        image: PathBuf,

        /// Height of the printed tattoo in cm ("12,5" is accepted)
        #[clap(long)]
        height: String,

        /// Body location label or index
        #[clap(short, long)]
        location: String,

        /// Print the result as JSON instead of the report text
        #[clap(long)]
        json: bool,

        /// Save intermediate images
        #[clap(short, long)]
        debug: bool,
    },

    /// Estimate every image in a directory and write quotes.csv
    Batch {
        #[clap(short, long)]
        input: Option<PathBuf>,

        #[clap(long)]
        height: String,

        #[clap(short, long)]
        location: String,

        #[clap(short, long)]
        debug: bool,
    },

    /// Estimate from questionnaire answers (label or index for each)
    Quote {
        #[clap(long = "type")]
        tattoo_type: String,

        #[clap(short, long)]
        location: String,

        #[clap(short, long)]
        size: String,

        #[clap(long)]
        detail: String,
    },

    /// Write the default configuration
    InitConfig {
        #[clap(short, long, default_value = "config.toml")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Command::InitConfig { path } = &args.command {
        Config::default()
            .save_to_file(path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Default configuration written to {}", path.display());
        return Ok(());
    }

    let mut config = Config::from_file_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config))?;
    if let Some(output) = args.output.clone() {
        config.output_base_dir = output;
    }
    config.validate()?;

    match args.command {
        Command::Analyze { image, height, location, json, debug } => {
            run_analyze(&config, image, &height, &location, json, debug)
        }
        Command::Batch { input, height, location, debug } => {
            if let Some(input) = input {
                config.input_path = input.display().to_string();
            }
            run_batch(&config, &height, &location, debug)
        }
        Command::Quote { tattoo_type, location, size, detail } => {
            run_quote(&config, &tattoo_type, &location, &size, &detail)
        }
        Command::InitConfig { .. } => Ok(()),
    }
}

fn run_analyze(
    config: &Config,
    image: PathBuf,
    height: &str,
    location: &str,
    json: bool,
    debug: bool,
) -> Result<()> {
    let height_cm = parse_height(height)?;
    let location = config.location(location)?;
    let input_image = load_image(&image).with_context(|| format!("loading {}", image.display()))?;
    let filename = input_image.filename.clone();

    let result = match process_image(input_image, height_cm, location, config, debug) {
        Ok(result) => result,
        Err(e) if e.requires_retry() => {
            eprintln!("{}", e);
            eprintln!("Please send a clearer image or a valid height and try again.");
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let engine = PricingEngine::new(config.pricing.clone());
        println!("{}", format_analysis_report(&result, &location.label, &engine));
    }

    if !json && (debug || config.save_debug_images) {
        let debug_dir = PathBuf::from(&config.output_base_dir).join("debug");
        println!("Diagnostic images for {} saved to {}", filename, debug_dir.display());
    }

    Ok(())
}

fn run_batch(config: &Config, height: &str, location: &str, debug: bool) -> Result<()> {
    let height_cm = parse_height(height)?;
    let location = config.location(location)?;
    let input_path = config.validate_input_path()?;
    if !input_path.is_dir() {
        return Err(TattooQuoteError::InvalidPath(input_path).into());
    }

    let start_time = Instant::now();
    let files = get_image_files_in_dir(&input_path)?;
    log::info!("Found {} images in {}", files.len(), input_path.display());

    let estimate = |path: &PathBuf| -> BatchRow {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let outcome = load_image(path)
            .and_then(|input_image| process_image(input_image, height_cm, location, config, debug));

        match outcome {
            Ok(result) => BatchRow::Quoted { filename, result },
            Err(e) => {
                log::error!("Error processing {}: {}", path.display(), e);
                BatchRow::Failed { filename, error: e.to_string() }
            }
        }
    };

    let rows: Vec<BatchRow> = if config.use_parallel {
        files.par_iter().map(estimate).collect()
    } else {
        files.iter().map(estimate).collect()
    };

    let output_dir = PathBuf::from(&config.output_base_dir);
    fs::create_dir_all(&output_dir)?;
    write_quotes_csv(&rows, &output_dir)?;

    let failed = rows.iter().filter(|row| matches!(row, BatchRow::Failed { .. })).count();
    println!(
        "Estimated {} of {} images in {:.2} seconds",
        rows.len() - failed,
        rows.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

fn run_quote(config: &Config, tattoo_type: &str, location: &str, size: &str, detail: &str) -> Result<()> {
    let type_option = config.type_option(tattoo_type)?;
    let location_option = config.location(location)?;
    let size_option = config.size_option(size)?;
    let detail_option = config.detail_option(detail)?;

    let engine = PricingEngine::new(config.pricing.clone());
    let quote = engine.price_from_answers(&QuestionnaireWeights {
        type_weight: type_option.weight,
        location_weight: location_option.weight,
        size: SizeWeight::from(size_option),
        detail_weight: detail_option.weight,
    });

    let labels = QuestionnaireLabels {
        tattoo_type: &type_option.label,
        location: &location_option.label,
        size: &size_option.label,
        detail: &detail_option.label,
    };
    println!("{}", format_questionnaire_summary(&labels, &quote, &engine));

    Ok(())
}
