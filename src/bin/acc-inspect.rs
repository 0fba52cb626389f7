//! acc-inspect: Inspect accelerator task directories and encoded arguments
//!
//! `contract` loads the two contract files of a task directory and prints the
//! argument descriptors and key requirements. `args` decodes a file produced by
//! the wire encoder.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::{Context, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use acc_bridge::argument::ArgumentData;
use acc_bridge::export::wire::decode_arguments;
use acc_bridge::signature::{load_task_contract, Phase};

#[derive(Parser)]
#[command(name = "acc-inspect")]
#[command(about = "Inspect accelerator task contracts and encoded arguments")]
#[command(version)]
struct Args {
    /// Log debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize the contracts of a task directory
    Contract {
        /// Task directory containing task_signature.json and mega_ag.json
        dir: PathBuf,
    },
    /// Decode a file of wire-encoded arguments
    Args {
        /// Encoded argument file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Contract { dir } => inspect_contract(dir),
        Command::Args { file } => inspect_args(file),
    }
}

fn inspect_contract(dir: PathBuf) -> Result<()> {
    let contract = load_task_contract(&dir)
        .with_context(|| format!("Failed to load task contract from {}", dir.display()))?;
    let sig = &contract.signature;
    let param = &contract.parameter;

    info!("Task directory: {}", dir.display());
    info!("Algorithm: {}", sig.algorithm);
    info!(
        "Parameters: n={}, |q|={}, |p|={}, t={}",
        param.n,
        param.q.len(),
        param.p.as_ref().map_or(0, Vec::len),
        param.t.map_or_else(|| "-".to_string(), |t| t.to_string())
    );

    match sig.key.rlk {
        Some(level) => info!("Relinearization key: level {}", level),
        None => info!("Relinearization key: none"),
    }
    if sig.key.glk.is_empty() {
        info!("Galois keys: none");
    } else {
        info!(
            "Galois keys: {} elements, export level {}",
            sig.key.glk.len(),
            sig.key.glk.max_level().unwrap_or_default()
        );
        info!("Galois export order: {:?}", sig.key.glk.canonical_order());
    }

    for phase in [Phase::Offline, Phase::Online] {
        let descriptors = sig.descriptors(phase);
        if descriptors.is_empty() {
            continue;
        }
        let inputs = descriptors.iter().filter(|d| d.phase.is_input()).count();
        info!(
            "{} arguments: {} ({} inputs, {} outputs)",
            phase,
            descriptors.len(),
            inputs,
            descriptors.len() - inputs
        );
        for d in descriptors {
            info!(
                "  {:<16} {:<8} shape={:?} count={} level={} phase={:?}",
                d.id,
                d.kind.as_str(),
                d.size,
                d.expected_count(),
                d.level,
                d.phase
            );
        }
    }

    Ok(())
}

fn inspect_args(file: PathBuf) -> Result<()> {
    let bytes = fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
    let args = decode_arguments(&bytes)
        .with_context(|| format!("Failed to decode arguments in {}", file.display()))?;

    info!("{}: {} arguments, {} bytes", file.display(), args.len(), bytes.len());
    for arg in &args {
        let detail = match &arg.data {
            ArgumentData::Ciphertexts(cts) => format!(
                "degree={}",
                cts.first().map_or(0, |ct| ct.degree)
            ),
            ArgumentData::Plaintexts(pts) => format!(
                "components={}",
                pts.first().map_or(0, |pt| pt.poly.component_count())
            ),
            ArgumentData::RelinKey(ksk) => format!("digits={}", ksk.digit_count()),
            ArgumentData::GaloisKey(gk) => format!("elements={:?}", gk.galois_elements),
        };
        info!(
            "  {:<16} {:<10} count={} level={} {}",
            arg.id,
            arg.arg_type().to_string(),
            arg.count,
            arg.level,
            detail
        );
    }

    Ok(())
}
