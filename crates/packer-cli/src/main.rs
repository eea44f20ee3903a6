use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use packer_core::{
    tally_by_shape, ItemSpec, Optimizer, PackingRequest, PackingSummary, SearchOutcome,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "packer")]
#[command(about = "Evolutionary bin packer - Fit priced items into a fixed set of bins", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for the best packing of a catalog
    Optimize {
        /// Input file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the packing plan (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Override the number of generations
        #[arg(short, long)]
        generations: Option<u32>,

        /// Override the population size
        #[arg(short, long)]
        population: Option<usize>,
    },

    /// Validate an input file and print what it expands to
    Check {
        /// Input file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Optimize {
            input,
            output,
            seed,
            generations,
            population,
        } => {
            let mut request = load_request(&input)?;
            if let Some(seed) = seed {
                request.search = request.search.with_seed(seed);
            }
            if let Some(generations) = generations {
                request.search = request.search.with_generations(generations);
            }
            if let Some(population) = population {
                request.search = request.search.with_population_size(population);
            }
            optimize_command(request, output)?;
        }
        Commands::Check { input } => {
            check_command(&input)?;
        }
    }

    Ok(())
}

fn load_request(input: &Path) -> Result<PackingRequest> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let extension = input.extension().and_then(|s| s.to_str());
    let request = if matches!(extension, Some("yaml") | Some("yml")) {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    info!(path = %input.display(), "Loaded packing request");
    Ok(request)
}

fn check_command(input: &Path) -> Result<()> {
    let request = load_request(input)?;
    let catalog = request.items.clone();
    let optimizer = Optimizer::from_request(request)?;

    println!("{}", "✅ Input is valid".bright_green().bold());
    println!();
    print_inventory(&catalog, &optimizer);

    println!("  Bins:");
    for bin in optimizer.bins() {
        println!(
            "    • bin {}: {} x {}",
            bin.id.to_string().bright_white(),
            bin.width,
            bin.height
        );
    }

    Ok(())
}

/// Catalog lines as given, then the expanded items grouped by shape.
fn print_inventory(catalog: &[ItemSpec], optimizer: &Optimizer) {
    println!("{}", "📦 Inventory:".bright_yellow().bold());
    for spec in catalog {
        println!(
            "    • {} {} {} x {}, qty {}, {}, {:.2} each, {:.2} total",
            spec.id.bright_white(),
            spec.shape,
            spec.width,
            spec.height,
            spec.quantity,
            if spec.can_rotate { "rotatable" } else { "fixed" },
            spec.price,
            spec.price * spec.quantity as f64
        );
    }
    println!();

    println!(
        "  {} items after expanding quantities",
        optimizer.items().len().to_string().bright_white().bold()
    );
    for (shape, tally) in tally_by_shape(optimizer.items()) {
        println!(
            "    • {}: {} items worth {:.2}",
            shape.to_string().bright_cyan(),
            tally.count,
            tally.value
        );
    }
    println!();
}

fn optimize_command(request: PackingRequest, output: Option<PathBuf>) -> Result<()> {
    println!("{}", "🔍 Loading input...".bright_blue());

    let catalog = request.items.clone();
    let optimizer = Optimizer::from_request(request)?;
    print_inventory(&catalog, &optimizer);
    println!(
        "  {} bins available",
        optimizer.bins().len().to_string().bright_white().bold()
    );
    println!();

    println!("{}", "🚀 Running search...".bright_blue());
    let outcome = optimizer.search();

    println!();
    if outcome.cancelled {
        println!("{}", "⚠️  Search stopped early".bright_yellow().bold());
    } else {
        println!("{}", "✅ Search complete!".bright_green().bold());
    }
    println!();

    print_outcome(&outcome);

    let plan = outcome.result.plan();
    let json = serde_json::to_string_pretty(&plan)?;
    if let Some(output_path) = output {
        std::fs::write(&output_path, json)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        println!(
            "💾 Saved plan to {}",
            output_path.display().to_string().bright_white()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn print_outcome(outcome: &SearchOutcome) {
    let summary = outcome.result.summary();

    println!("{}", "📊 Results:".bright_yellow().bold());
    println!(
        "  Best fitness: {} after {} generations",
        format!("{:.6}", outcome.best_fitness).bright_white().bold(),
        outcome.generations
    );
    println!();

    println!("  Bins:");
    for layout in &outcome.result.layouts {
        println!(
            "    • bin {} ({} x {}): {} items",
            layout.bin.id.to_string().bright_white(),
            layout.bin.width,
            layout.bin.height,
            layout.placements.len()
        );
    }
    println!();

    print_summary(&summary);
    println!();
}

fn print_summary(summary: &PackingSummary) {
    println!(
        "  Packed items: {} of {}",
        summary.packed_items.to_string().bright_white().bold(),
        summary.total_items
    );
    println!(
        "  Packed value: {:.2} of {:.2} ({:.1}%)",
        summary.packed_value, summary.total_value, summary.packed_value_percentage
    );
    println!(
        "  Unpacked value: {}",
        format!("{:.2}", summary.unpacked_value).bright_red()
    );
    println!("  Unpacked area: {:.2}", summary.unpacked_area);
    println!(
        "  Bin area: {:.2} (occupied {:.2}, wasted {:.2})",
        summary.total_bin_area, summary.occupied_area, summary.wastage
    );
    println!(
        "  Utilization: {}",
        format!("{:.1}%", summary.utilization_percentage).bright_green()
    );

    if !summary.triangle_rotations.is_empty() {
        println!();
        println!("  Triangle rotations:");
        for (degrees, count) in &summary.triangle_rotations {
            println!("    • {}°: {}", degrees.to_string().bright_cyan(), count);
        }
    }

    if !summary.unpacked_by_shape.is_empty() {
        println!();
        println!("  Left out:");
        for (shape, tally) in &summary.unpacked_by_shape {
            println!(
                "    • {}: {} items worth {:.2}",
                shape.to_string().bright_white(),
                tally.count,
                tally.value
            );
        }
    }
}
