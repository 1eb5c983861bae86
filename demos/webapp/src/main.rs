//! webapp: runs the three-center web-application network.
//!
//! ```bash
//! # 128 replications of four simulated hours, baseline workload
//! webapp finite
//!
//! # Batch means under the two-factor-authentication workload
//! webapp --scenario two-fa batch --batches 64 --batch-size 4096
//!
//! # Which batch size decorrelates the batch means?
//! webapp search --sizes 256,1024,4096
//!
//! # Throughput against arrival rate, custom network from JSON
//! webapp --config net.json sweep --rates 0.4,0.8,1.2
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use qn_core::{BatchConfig, FiniteConfig, NetworkConfig, Scenario};
use qn_sim::{
    Agenda, DEFAULT_LAG1_THRESHOLD, SplitAgenda, UnifiedAgenda, batch_means, replicate,
    search_batch_size, sweep_arrival_rate,
};
use qn_stats::Summary;

// ── CLI ───────────────────────────────────────────────────────────────────────

/// Multiclass processor-sharing network simulator.
#[derive(Parser, Debug)]
#[command(name = "webapp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Workload preset applied to the baseline network.
    #[arg(long, value_enum, default_value = "light1-fa")]
    scenario: Preset,

    /// Network description as JSON; overrides `--scenario`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Master seed.  Defaults to the network's own seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Keep the next arrival outside the departure heap.
    #[arg(long)]
    split_agenda: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replicated finite-horizon run.
    Finite {
        #[arg(long, default_value_t = FiniteConfig::default().stop_time)]
        stop_time: f64,
        #[arg(long, default_value_t = FiniteConfig::default().sample_step)]
        step: f64,
        #[arg(short, long, default_value_t = FiniteConfig::default().replications)]
        replications: u64,
    },
    /// Infinite-horizon batch means.
    Batch {
        #[arg(short = 'k', long, default_value_t = BatchConfig::default().batches)]
        batches: u64,
        #[arg(short = 'b', long, default_value_t = BatchConfig::default().batch_size)]
        batch_size: u64,
        /// Also require this many arrivals before closing a batch.
        #[arg(long)]
        min_arrivals: Option<u64>,
    },
    /// Lag-1 autocorrelation of batch response times per candidate size.
    Search {
        #[arg(short = 'k', long, default_value_t = BatchConfig::default().batches)]
        batches: u64,
        #[arg(long, value_delimiter = ',', default_values_t = [64, 128, 256, 512, 1024, 2048, 4096, 8192])]
        sizes: Vec<u64>,
        #[arg(long, default_value_t = DEFAULT_LAG1_THRESHOLD)]
        threshold: f64,
    },
    /// Batch-means throughput at each arrival rate.
    Sweep {
        #[arg(long, value_delimiter = ',', default_values_t = [0.2, 0.4, 0.6, 0.8, 1.0, 1.1, 1.2])]
        rates: Vec<f64>,
        #[arg(short = 'k', long, default_value_t = 32)]
        batches: u64,
        #[arg(short = 'b', long, default_value_t = 1024)]
        batch_size: u64,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Preset {
    Light1Fa,
    Heavy1Fa,
    TwoFa,
    FasterB,
}

impl From<Preset> for Scenario {
    fn from(p: Preset) -> Self {
        match p {
            Preset::Light1Fa => Scenario::Light1Fa,
            Preset::Heavy1Fa => Scenario::Heavy1Fa,
            Preset::TwoFa => Scenario::TwoFa,
            Preset::FasterB => Scenario::FasterB,
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut network = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<NetworkConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => NetworkConfig::scenario(args.scenario.into()),
    };
    if let Some(seed) = args.seed {
        network.seed = seed;
    }
    info!(
        scenario = ?args.scenario,
        arrival_rate = network.arrival_rate,
        seed = network.seed,
        split_agenda = args.split_agenda,
        "network ready"
    );

    let t0 = Instant::now();
    if args.split_agenda {
        run::<SplitAgenda>(&network, &args.command)?;
    } else {
        run::<UnifiedAgenda>(&network, &args.command)?;
    }
    println!();
    println!("Done in {:.3} s", t0.elapsed().as_secs_f64());
    Ok(())
}

fn run<A: Agenda>(network: &NetworkConfig, command: &Command) -> Result<()> {
    match *command {
        Command::Finite { stop_time, step, replications } => {
            let finite = FiniteConfig { stop_time, sample_step: step, replications };
            let traj = replicate::<A>(network, &finite)?;

            println!("=== finite horizon: {replications} replications × {stop_time} s ===");
            println!();
            println!("{:<18} {:>12} {:>12} {:>12}", "Metric", "Mean", "± 95%", "Rel.");
            println!("{}", "-".repeat(57));
            for key in traj.series.keys() {
                if let Some(s) = traj.last(key) {
                    print_summary(key, &s);
                }
            }

            // Response-time trajectory, ten points across the horizon.
            if let Some(rt) = traj.metric("RT") {
                println!();
                println!("{:>10} {:>12} {:>12}", "t", "RT", "± 95%");
                let stride = (rt.len() / 10).max(1);
                for (t, s) in traj.times.iter().zip(rt).step_by(stride) {
                    println!("{t:>10.0} {:>12.4} {:>12.4}", s.mean, s.half_width);
                }
            }
        }
        Command::Batch { batches, batch_size, min_arrivals } => {
            let batch = BatchConfig { batches, batch_size, min_arrivals };
            let study = batch_means::<A>(network, &batch)?;

            println!("=== batch means: k = {batches}, b = {batch_size} ===");
            println!();
            println!("{:<18} {:>12} {:>12} {:>12}", "Metric", "Mean", "± 95%", "Rel.");
            println!("{}", "-".repeat(57));
            for (key, s) in &study.summary {
                print_summary(key, s);
            }
        }
        Command::Search { batches, ref sizes, threshold } => {
            let search = search_batch_size::<A>(network, batches, sizes, threshold)?;

            println!("=== batch-size search: k = {batches}, |r1| < {threshold} ===");
            println!();
            println!("{:>8} {:>12} {:>10}", "b", "r1", "accepted");
            println!("{}", "-".repeat(32));
            for c in &search.candidates {
                let r1 = c.lag1.map_or_else(|| "n/a".to_owned(), |r| format!("{r:.4}"));
                println!("{:>8} {:>12} {:>10}", c.batch_size, r1, c.accepted(threshold));
            }
            println!();
            match search.recommended {
                Some(b) => println!("Recommended batch size: {b}"),
                None => println!("No candidate met the threshold; try larger sizes."),
            }
        }
        Command::Sweep { ref rates, batches, batch_size } => {
            let batch = BatchConfig { batches, batch_size, min_arrivals: None };
            let points = sweep_arrival_rate::<A>(network, &batch, rates)?;

            println!("=== throughput vs arrival rate: k = {batches}, b = {batch_size} ===");
            println!();
            println!("{:>8} {:>12} {:>12} {:>12}", "λ", "X", "1/D_max", "RT");
            println!("{}", "-".repeat(47));
            for p in &points {
                println!(
                    "{:>8.3} {:>12.4} {:>12.4} {:>12.4}",
                    p.arrival_rate, p.throughput.mean, p.throughput_bound.mean, p.response_time.mean
                );
            }
        }
    }
    Ok(())
}

fn print_summary(key: &str, s: &Summary) {
    println!(
        "{:<18} {:>12.4} {:>12.4} {:>11.2}%",
        key,
        s.mean,
        s.half_width,
        100.0 * s.relative_precision()
    );
}
