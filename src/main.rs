use anyhow::{anyhow, Result};
use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use receipt_resolver::{
    read_name_column, CatalogPaths, CatalogSet, EngineOptions, LinearCategoryModel, ModelParams,
    ProductRecord, ResolutionEngine, SubstitutionTables,
};

struct CliArgs {
    input: PathBuf,
    data_dir: PathBuf,
    substitutions: Option<PathBuf>,
    jobs: Option<usize>,
    verbose: bool,
}

fn print_usage() {
    eprintln!("Usage: receipt-resolver <input.csv> [options]");
    eprintln!();
    eprintln!("The input file must contain a column named `name` with raw");
    eprintln!("receipt product descriptions. Resolved rows are written to");
    eprintln!("stdout as CSV.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --data-dir DIR        catalog directory (default: data)");
    eprintln!("  --substitutions FILE  substitution tables JSON (default: built-in)");
    eprintln!("  --jobs N              worker threads (default: machine-sized)");
    eprintln!("  --verbose             log per-pass resolution counts");
}

fn parse_args() -> Result<CliArgs> {
    let mut args = env::args().skip(1);
    let mut input = None;
    let mut data_dir = PathBuf::from("data");
    let mut substitutions = None;
    let mut jobs = None;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                data_dir = PathBuf::from(
                    args.next().ok_or_else(|| anyhow!("--data-dir needs a value"))?,
                );
            }
            "--substitutions" => {
                substitutions = Some(PathBuf::from(
                    args.next().ok_or_else(|| anyhow!("--substitutions needs a value"))?,
                ));
            }
            "--jobs" => {
                let value = args.next().ok_or_else(|| anyhow!("--jobs needs a value"))?;
                jobs = Some(value.parse().map_err(|_| anyhow!("--jobs needs a number"))?);
            }
            "--verbose" => verbose = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if input.is_none() && !other.starts_with('-') => {
                input = Some(PathBuf::from(other));
            }
            other => return Err(anyhow!("Unknown argument: {}", other)),
        }
    }

    Ok(CliArgs {
        input: input.ok_or_else(|| anyhow!("Missing input file"))?,
        data_dir,
        substitutions,
        jobs,
        verbose,
    })
}

fn write_output(records: &[ProductRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(io::stdout());
    wtr.write_record(["name", "product_norm", "brand_norm", "cat_norm"])?;
    for record in records {
        wtr.write_record([
            record.raw_name.as_str(),
            record.product_norm.as_deref().unwrap_or(""),
            record.brand_norm.as_deref().unwrap_or(""),
            record.cat_norm.map(|c| c.as_label()).unwrap_or(""),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("❌ {}", err);
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    // 1. Catalogs
    let paths = CatalogPaths::under_dir(&args.data_dir);
    let catalogs = CatalogSet::load(&paths)?;
    eprintln!("✓ Catalogs loaded from {}", args.data_dir.display());

    // 2. Substitution tables
    let tables = match &args.substitutions {
        Some(path) => SubstitutionTables::from_file(path)?,
        None => SubstitutionTables::builtin(),
    };

    // 3. Classifier artifact
    let vocab_path = args.data_dir.join("models/cat_vocab.json");
    let weights_path = args.data_dir.join("models/cat_weights.json");
    let model = LinearCategoryModel::load(&vocab_path, &weights_path, ModelParams::default())?;
    eprintln!("✓ Classifier loaded");

    // 4. Input batch
    let names = read_name_column(&args.input)?;
    eprintln!("✓ Loaded {} descriptions from {}", names.len(), args.input.display());

    // 5. Resolve
    let engine = ResolutionEngine::new(
        catalogs,
        tables,
        Arc::new(model),
        EngineOptions {
            verbose: args.verbose,
            jobs: args.jobs,
            ..EngineOptions::default()
        },
    )?;
    let records = engine.resolve_batch(&names);

    // 6. Emit results + summary
    write_output(&records)?;

    let total = records.len();
    let brands = records.iter().filter(|r| r.has_brand()).count();
    let products = records.iter().filter(|r| r.has_product()).count();
    let categories = records.iter().filter(|r| r.has_category()).count();
    eprintln!(
        "✓ Recognized brands: {}/{}, products: {}/{}, categories: {}/{}",
        brands, total, products, total, categories, total
    );

    Ok(())
}
