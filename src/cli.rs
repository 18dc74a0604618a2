use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;

use crate::sequencing::{self, MicroLpEngine, MixOptions};
use crate::{catalog, report};

#[derive(Parser)]
#[command(name = "mixpath", version, about)]
enum Cli {
    /// Order a track catalog into a single harmonic mix
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Tab-separated catalog: id, name, bpm, MM:SS length, key
    catalog: PathBuf,
    /// Largest key shift (in fifths) a track may be transposed by
    #[arg(long, env = "MIXPATH_MAX_SHIFT", default_value = "1", allow_negative_numbers = true)]
    max_shift: i32,
    /// Solver wall-clock budget in seconds (0 disables the limit)
    #[arg(long, env = "MIXPATH_TIME_LIMIT", default_value = "300")]
    time_limit: u64,
    /// Append the report to this file instead of printing it
    #[arg(long)]
    output: Option<PathBuf>,
    /// Render the report as JSON
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn mix_options(&self) -> MixOptions {
        MixOptions {
            max_shift: self.max_shift,
            time_limit: time_limit_from_secs(self.time_limit),
        }
    }
}

fn time_limit_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli {
        Cli::Run(args) => run(args).await,
    }
}

async fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let tracks = catalog::load_catalog(&args.catalog)?;
    let options = args.mix_options();
    tracing::info!(
        tracks = tracks.len(),
        max_shift = options.max_shift,
        time_limit = ?options.time_limit,
        "planning mix"
    );

    let started = Instant::now();
    let plan = tokio::task::spawn_blocking(move || {
        sequencing::plan_mix(&tracks, &options, &MicroLpEngine)
    })
    .await??;
    tracing::info!(
        elapsed_secs = started.elapsed().as_secs_f64(),
        objective = plan.objective,
        "mix planned"
    );
    tracing::debug!(order = ?plan.track_ids(), "track order");

    let rendered = if args.json {
        report::render_json(&plan)?
    } else {
        report::render_table(&plan)
    };
    report::write_report(&rendered, args.output.as_deref())?;
    Ok(())
}
