use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use gc_psi::circuit::Circuit;
use gc_psi::garbler::{GarbleSession, garble_circuit};
use gc_psi::hashing::{self, DIGEST_LEN};
use gc_psi::psi::PsiContext;
use gc_psi::stats::compute_stats;

/// Garbled-circuit private set intersection demo
#[derive(Parser, Debug)]
#[command(name = "gc-psi")]
#[command(about = "Garbled-circuit PSI demo and equality-circuit statistics")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Compute the membership mask of set A against set B
    Intersect {
        /// File with one element of set A per line
        #[arg(long = "set-a")]
        set_a: PathBuf,
        /// File with one element of set B per line
        #[arg(long = "set-b")]
        set_b: PathBuf,
    },
    /// Garble a k-bit equality circuit and print its statistics
    Stats {
        /// Equality width in bits
        #[arg(long, default_value_t = 128)]
        bits: usize,
    },
}

/// Read a set file: one element per line, blank lines skipped.
fn read_set(path: &Path) -> Result<Vec<String>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading set file {}", path.display()))?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn run_intersect(set_a: &Path, set_b: &Path) -> Result<()> {
    let elems_a = read_set(set_a)?;
    let elems_b = read_set(set_b)?;

    if elems_a.is_empty() || elems_b.is_empty() {
        bail!("both set files must contain at least one element");
    }
    if elems_a.len() != elems_b.len() {
        bail!(
            "set sizes must match: {} has {}, {} has {}",
            set_a.display(),
            elems_a.len(),
            set_b.display(),
            elems_b.len()
        );
    }

    let count = elems_a.len();
    let flat_a = hashing::hash_strings_to_flat(&elems_a, None);
    let flat_b = hashing::hash_strings_to_flat(&elems_b, None);

    let ctx = PsiContext::new(count, DIGEST_LEN * 8)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message(format!(
        "Garbling {}-bit equality circuit and comparing {} element pairs...",
        DIGEST_LEN * 8,
        count * count
    ));

    let mask = ctx.compute(&flat_a, &flat_b, count)?;

    pb.finish_with_message(format!("✓ Compared {} element pairs", count * count));

    for (elem, &hit) in elems_a.iter().zip(&mask) {
        println!("  {}: {}", elem, if hit == 1 { "present" } else { "absent" });
    }

    let summary = serde_json::json!({
        "count": count,
        "matches": mask.iter().filter(|&&m| m == 1).count(),
        "mask": mask,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

fn run_stats(bits: usize) -> Result<()> {
    let plain = Circuit::eq_bits(bits)?;
    let gc = garble_circuit(&plain, &GarbleSession::new())?;
    let stats = compute_stats(&gc);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    match args.command {
        Commands::Intersect { set_a, set_b } => run_intersect(&set_a, &set_b),
        Commands::Stats { bits } => run_stats(bits),
    }
}
