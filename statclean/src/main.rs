//! statclean CLI - normalize indicator extracts
//!
//! ```bash
//! statclean run                          # All built-in datasets, data/raw -> data/processed
//! statclean run cpi energy               # Only some of them
//! statclean run --spec water.json        # A custom dataset spec
//! statclean inspect raw.csv --skip-rows 4
//! statclean datasets                     # List built-in datasets
//! statclean spec undernourishment        # Print a built-in spec as JSON
//! ```

use clap::{Parser, Subcommand};
use serde_json::json;
use statclean::logs::{by_dataset, drain, RUN_LOG};
use statclean::transform::select_columns;
use statclean::{
    parse_file, run_all, DatasetKind, DatasetSpec, DirSink, DirSource, ReadOptions, RunConfig,
    YearRule,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "statclean")]
#[command(
    about = "Normalize country-level indicator extracts into one wide canonical format",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize datasets (all built-ins when none is named)
    Run {
        /// Built-in datasets to run (undernourishment, cpi, energy)
        datasets: Vec<String>,

        /// Raw input directory [env: STATCLEAN_RAW_DIR, default: data/raw]
        #[arg(long)]
        raw_dir: Option<PathBuf>,

        /// Output directory, created if absent
        /// [env: STATCLEAN_PROCESSED_DIR, default: data/processed]
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Custom dataset spec (JSON), may be repeated
        #[arg(long)]
        spec: Vec<PathBuf>,

        /// Write a JSON run report here
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show the headers of a raw file and which columns each year rule picks up
    Inspect {
        /// Raw CSV file
        input: PathBuf,

        /// Metadata lines before the header row
        #[arg(long, default_value = "0")]
        skip_rows: usize,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// List built-in datasets
    Datasets,

    /// Print the configuration of a built-in dataset as JSON
    Spec {
        /// Dataset name
        dataset: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            datasets,
            raw_dir,
            out_dir,
            spec,
            report,
        } => cmd_run(
            &datasets,
            raw_dir.as_deref(),
            out_dir.as_deref(),
            &spec,
            report.as_deref(),
        ),

        Commands::Inspect {
            input,
            skip_rows,
            delimiter,
        } => cmd_inspect(&input, skip_rows, delimiter),

        Commands::Datasets => cmd_datasets(),

        Commands::Spec { dataset } => cmd_spec(&dataset),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn collect_specs(
    datasets: &[String],
    spec_files: &[PathBuf],
) -> Result<Vec<DatasetSpec>, Box<dyn std::error::Error>> {
    let mut specs = Vec::new();

    for name in datasets {
        specs.push(name.parse::<DatasetKind>()?.spec());
    }
    for path in spec_files {
        let content = fs::read_to_string(path)?;
        specs.push(DatasetSpec::from_json(&content)?);
    }

    if specs.is_empty() {
        specs = DatasetKind::ALL.iter().map(|k| k.spec()).collect();
    }
    Ok(specs)
}

fn cmd_run(
    datasets: &[String],
    raw_dir: Option<&Path>,
    out_dir: Option<&Path>,
    spec_files: &[PathBuf],
    report: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let specs = collect_specs(datasets, spec_files)?;
    let config = RunConfig::resolve(raw_dir, out_dir);

    eprintln!("📂 Raw data: {}", config.raw_dir.display());
    eprintln!("📂 Output:   {}", config.processed_dir.display());
    let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
    eprintln!("⚙️  Datasets: {}", names.join(", "));

    let mut events = RUN_LOG.subscribe();
    let source = DirSource::new(&config.raw_dir);
    let sink = DirSink::new(&config.processed_dir);

    let results = run_all(&specs, &source, &sink);

    let mut summaries = Vec::new();
    let mut failures = Vec::new();
    for (name, result) in results {
        match result {
            Ok(summary) => summaries.push(summary),
            Err(e) => failures.push(json!({ "dataset": name, "error": e.to_string() })),
        }
    }

    if let Some(path) = report {
        let report_json = json!({
            "config": config,
            "succeeded": summaries,
            "failed": failures,
            "log": by_dataset(drain(&mut events)),
        });
        fs::write(path, serde_json::to_string_pretty(&report_json)?)?;
        eprintln!("💾 Report written to: {}", path.display());
    }

    eprintln!("\n📊 {} succeeded, {} failed", summaries.len(), failures.len());
    if !failures.is_empty() {
        return Err(format!("{} dataset(s) failed", failures.len()).into());
    }

    eprintln!("✨ Done!");
    Ok(())
}

fn cmd_inspect(
    input: &Path,
    skip_rows: usize,
    delimiter: Option<char>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Inspecting: {}", input.display());

    let mut options = ReadOptions::skip(skip_rows);
    options.delimiter = delimiter;
    let table = parse_file(input, &options)?;

    println!("Rows: {}", table.len());
    println!("Columns ({}):", table.headers.len());
    for (i, col) in table.headers.iter().enumerate() {
        println!("  [{:2}] {}", i + 1, col);
    }

    let rules = [
        ("bare digits >= 2001", YearRule::bare_digits(2001)),
        ("Y-prefixed", YearRule::prefixed("Y")),
    ];
    for (label, rule) in rules {
        let years: Vec<i32> = table
            .headers
            .iter()
            .filter_map(|h| rule.column_year(h))
            .collect();
        match (years.iter().min(), years.iter().max()) {
            (Some(min), Some(max)) => {
                println!("{}: {} columns ({}..={})", label, years.len(), min, max)
            }
            _ => println!("{}: none", label),
        }
    }

    let field_rule = YearRule::field("Year", "Value");
    match select_columns(&table.headers, "Area", None, &field_rule) {
        Ok(_) => println!("Year field: Area/Year/Value present"),
        Err(e) => println!("Year field: {}", e),
    }

    Ok(())
}

fn cmd_datasets() -> Result<(), Box<dyn std::error::Error>> {
    for kind in DatasetKind::ALL {
        let spec = kind.spec();
        println!("  📄 {}", kind);
        println!("     {}", kind.description());
        println!("     {} -> {}", spec.input_file, spec.output_file);
        println!();
    }
    Ok(())
}

fn cmd_spec(dataset: &str) -> Result<(), Box<dyn std::error::Error>> {
    let kind: DatasetKind = dataset.parse()?;
    println!("{}", kind.spec().to_json()?);
    Ok(())
}
