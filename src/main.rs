//! Command-line front end: judge a replay (or autoplay) against a chart.

use clap::Parser;
use rjudge::difficulty::ChartDensity;
use rjudge::models::replay::{ReplayData, ReplayResult, autoplay_replay, simulate_replay};
use rjudge::{Chart, ConfigError, Settings};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "rjudge", about = "Judge a rhythm game replay against a chart")]
struct Args {
    /// Chart file (.osu, .json or .toml).
    chart: PathBuf,

    /// Replay to judge. Autoplay is used when absent.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Settings file (TOML or JSON). Defaults to mania OD 8.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Writes the judged replay here (.json or compressed).
    #[arg(long)]
    save_replay: Option<PathBuf>,
}

fn main() -> ExitCode {
    if std::env::var_os("RUST_LOG").is_none() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("MAIN: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), ConfigError> {
    let chart = Chart::load(&args.chart)?;
    log::info!(
        "MAIN: loaded {}K chart with {} notes ({} holds)",
        chart.key_count,
        chart.notes.len(),
        chart.hold_count()
    );

    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let ruleset = settings.to_ruleset()?;

    let replay = match &args.replay {
        Some(path) => ReplayData::load(path)?,
        None => {
            log::info!("MAIN: no replay given, using autoplay");
            autoplay_replay(&chart, &ruleset)
        }
    };

    let result = simulate_replay(&replay, &chart, &ruleset)?;
    print_summary(&result, &ChartDensity::from_chart_global(&chart));

    if let Some(path) = &args.save_replay {
        replay.save(path)?;
    }
    Ok(())
}

fn print_summary(result: &ReplayResult, density: &ChartDensity) {
    let stats = &result.hit_stats;
    println!("ruleset    {}", result.ruleset);
    println!("score      {:.0}", result.total_score);
    println!("accuracy   {:.2}%", result.accuracy * 100.0);
    println!("max combo  {}", result.max_combo);
    println!("rank       {:?}", result.rank);
    println!(
        "results    {} / {} / {} / {} / {} / {}",
        stats.perfect, stats.great, stats.good, stats.ok, stats.meh, stats.miss
    );
    println!(
        "holds      {} ignore-hit, {} ignore-miss",
        stats.ignore_hit, stats.ignore_miss
    );
    println!("ghost taps {}", result.ghost_taps.len());

    match density.weighted_nps {
        Some(weighted) => println!("density    {:.2} nps ({weighted:.3} weighted)", density.nps),
        None => println!("density    {:.2} nps", density.nps),
    }
}
