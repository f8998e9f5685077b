use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dragrace_app::game_loop::{run_race_loop, spawn_race_loop, CancelToken};
use dragrace_app::persistence::{GhostStore, StoreError};
use dragrace_app::state::{LoopEvent, RaceSetup};
use dragrace_core::constants::TICK_RATE;
use dragrace_core::enums::RacePhase;
use dragrace_core::events::RaceEvent;
use dragrace_core::types::{CarStats, RaceResult};
use dragrace_opponent::flavor::{resolve_opponent, FlavorSource, OpponentFlavor};
use dragrace_opponent::profiles::{get_profile, OpponentTier};
use dragrace_sim::clock::ManualClock;
use dragrace_sim::driver::HeadlessScheduler;

/// Headless runs give up after this many ticks.
const HEADLESS_TICK_BUDGET: u64 = 100_000;

#[derive(Debug, Parser)]
#[clap(
    version,
    name = "dragrace",
    about = "Quarter-mile drag race against an AI opponent or your best ghost"
)]
struct Opts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Race the stored best run instead of the AI (needs --store)
    #[clap(long, requires = "store")]
    ghost: bool,

    /// Run on the wall clock at the real tick rate instead of headless
    #[clap(long)]
    realtime: bool,

    /// Never shift; stay in first gear
    #[clap(long)]
    no_shift: bool,

    /// Print the race result as JSON
    #[clap(long)]
    json: bool,

    /// Enable debug logging
    #[clap(short, long)]
    verbose: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Player acceleration stat (1-10)
    #[clap(short, long, default_value = "6")]
    acceleration: u8,

    /// Player top speed stat (1-10)
    #[clap(short, long, default_value = "6")]
    top_speed: u8,

    /// Player grip stat (1-10)
    #[clap(short, long, default_value = "6")]
    grip: u8,

    /// Opponent preset: rookie, street or pro
    #[clap(short, long, default_value = "street")]
    opponent: OpponentTier,

    /// Opponent stats as ACC,TOP,GRIP, overriding the preset's
    #[clap(long, parse(try_from_str = parse_stats))]
    opponent_stats: Option<CarStats>,

    /// Opponent name, overriding the preset's
    #[clap(long)]
    opponent_name: Option<String>,

    /// Opponent difficulty multiplier, overriding the preset's
    #[clap(short, long)]
    difficulty: Option<f64>,

    /// RNG seed for the opponent's shift points
    #[clap(short, long, default_value = "42")]
    seed: u64,

    /// Upshift automatically at this rpm
    #[clap(long, default_value = "7400")]
    shift_rpm: f64,

    /// Directory holding the best ghost; runs are offered to it
    #[clap(long)]
    store: Option<PathBuf>,

    /// Name recorded with a stored ghost
    #[clap(long, default_value = "Player")]
    player_name: String,

    /// Ticks per second in --realtime mode
    #[clap(long, default_value_t = TICK_RATE)]
    tick_rate: u32,
}

fn parse_stats(s: &str) -> Result<CarStats, String> {
    let values: Vec<u8> = s
        .split(',')
        .map(|v| v.trim().parse::<u8>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<_, _>>()?;
    match values.as_slice() {
        [acc, top, grip] => CarStats::new(*acc, *top, *grip).map_err(|e| e.to_string()),
        _ => Err(format!("expected ACC,TOP,GRIP, got {s:?}")),
    }
}

/// Flavor from the command line.
struct GivenName(String);

impl FlavorSource for GivenName {
    fn generate(&self, _stats: &CarStats) -> Result<OpponentFlavor, String> {
        Ok(OpponentFlavor {
            name: self.0.clone(),
            tagline: String::new(),
        })
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_setup(opts: &Opts, store: Option<&GhostStore>) -> anyhow::Result<RaceSetup> {
    let player = CarStats::new(opts.acceleration, opts.top_speed, opts.grip)
        .context("Invalid player stats")?;

    let mut profile = get_profile(opts.opponent);
    if let Some(stats) = opts.opponent_stats {
        profile.stats = stats;
    }
    if let Some(difficulty) = opts.difficulty {
        anyhow::ensure!(
            difficulty.is_finite() && difficulty > 0.0,
            "Difficulty must be a positive number, got {difficulty}"
        );
        profile.difficulty = difficulty;
    }
    let mut opponent = match &opts.opponent_name {
        Some(name) => resolve_opponent(&profile, &GivenName(name.clone())).0,
        None => profile.to_opponent(),
    };

    let mut ghost = None;
    if opts.ghost {
        let store = store.context("--ghost needs --store")?;
        let best = match store.load_best() {
            Err(StoreError::Malformed(err)) => {
                tracing::warn!(error = %err, "Stored ghost is unusable, racing the AI");
                None
            }
            loaded => loaded.context("Failed to load best ghost")?,
        };
        match best {
            Some(best) => {
                opponent.name = format!("{} (ghost)", best.player_name);
                opponent.is_ghost = true;
                ghost = Some(best);
            }
            None => tracing::warn!("No stored ghost yet, racing the AI"),
        }
    }

    Ok(RaceSetup {
        seed: opts.seed,
        player,
        opponent,
        ghost,
        autopilot_rpm: (!opts.no_shift).then_some(opts.shift_rpm),
    })
}

fn run_headless(setup: RaceSetup) -> Option<RaceResult> {
    let clock = ManualClock::new();
    let scheduler = HeadlessScheduler::new(clock.clone()).with_tick_budget(HEADLESS_TICK_BUDGET);
    let (_cmd_tx, cmd_rx) = mpsc::channel();
    run_race_loop(
        setup,
        Box::new(clock),
        scheduler,
        &cmd_rx,
        &CancelToken::new(),
        None,
        &Mutex::new(None),
    )
}

fn run_realtime(setup: RaceSetup, tick_rate: u32) -> anyhow::Result<Option<RaceResult>> {
    let handle = spawn_race_loop(setup, tick_rate)?;
    let mut last_phase = None;
    for event in handle.events() {
        match event {
            LoopEvent::Snapshot(snapshot) => {
                if last_phase != Some(snapshot.phase) {
                    match snapshot.phase {
                        RacePhase::Countdown(n) => println!("{n}..."),
                        RacePhase::Racing => println!("GO!"),
                        RacePhase::Finished => {}
                    }
                    last_phase = Some(snapshot.phase);
                }
                for event in &snapshot.events {
                    if let RaceEvent::Shift(feedback) = event {
                        println!(
                            "  gear {} {} at {:.0} km/h",
                            snapshot.player.gear,
                            feedback.kind.label(),
                            snapshot.player.speed_kmh
                        );
                    }
                }
            }
            LoopEvent::Finished(_) | LoopEvent::Cancelled => break,
        }
    }
    Ok(handle.wait()?)
}

fn print_result(result: &RaceResult, opponent: &str) {
    println!("Player      {:>8.3} s", result.player_time());
    println!("{:<11} {:>8.3} s", opponent, result.enemy_time());
    println!(
        "Result      {}",
        if result.player_won() { "WIN" } else { "LOSS" }
    );
    println!("Top speed   {:>8.1} km/h", result.max_speed());
    println!("Perfect     {:>8}", result.perfect_shifts());
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_tracing(opts.verbose);

    let store = opts.store.as_ref().map(GhostStore::new);
    let setup = build_setup(&opts, store.as_ref())?;
    let opponent_name = setup.opponent.name.clone();

    let result = if opts.realtime {
        run_realtime(setup, opts.tick_rate)?
    } else {
        run_headless(setup)
    };
    let result = result.context("Race did not finish")?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result, &opponent_name);
    }

    if let Some(store) = &store {
        let stored = store
            .offer(&result, &opts.player_name, None)
            .with_context(|| format!("Failed to store ghost in {}", store.dir().display()))?;
        if stored && !opts.json {
            println!("New best run saved as ghost");
        }
    }

    Ok(())
}
