// CLI entry point for running the idle garden without a UI.
//
// Builds or loads a garden, optionally applies the dev grant and buys
// automations in the first ticks, advances it a fixed number of ticks with idle
// input, prints a summary, and optionally writes the result back out. This
// binary owns all file I/O; the sim crate only sees strings.
//
// A missing save file is not an error: it means there is no saved game yet,
// and a fresh garden is started. A save file that exists but fails to parse
// or validate is logged and likewise replaced by a fresh garden.
//
// Usage:
//   garden [OPTIONS]
//     --seed <N>          PRNG seed for a fresh garden (default: 1)
//     --ticks <N>         Ticks to run (default: 10000)
//     --config <PATH>     Game config JSON (default: built-in tuning)
//     --load <PATH>       Resume from a save file
//     --save <PATH>       Write the garden here after running
//     --buy <KIND>        Buy an automation at the start (repeatable)
//     --dev               Apply the dev grant on the first tick
//     --json              Print the summary as JSON
//
// Log verbosity follows `RUST_LOG` (default: info).

use std::io::ErrorKind;
use std::path::PathBuf;

use idle_garden_sim::command::SimAction;
use idle_garden_sim::config::GameConfig;
use idle_garden_sim::event::{SimEvent, SimEventKind};
use idle_garden_sim::input::{KeyState, TickInput};
use idle_garden_sim::save;
use idle_garden_sim::settings::AudioSettings;
use idle_garden_sim::sim::SimState;
use idle_garden_sim::types::AutomationKind;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq)]
struct Options {
    seed: u64,
    ticks: u64,
    config: Option<PathBuf>,
    load: Option<PathBuf>,
    save: Option<PathBuf>,
    buy: Vec<AutomationKind>,
    dev: bool,
    json: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            seed: 1,
            ticks: 10_000,
            config: None,
            load: None,
            save: None,
            buy: Vec::new(),
            dev: false,
            json: false,
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            std::process::exit(1);
        }
    };

    init_tracing();

    let config = match read_config(options.config.as_ref()) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    };

    let (mut sim, audio) = open_game(&options, config);
    let events = run(&mut sim, &options);
    print_summary(&sim, &events, options.json);

    if let Some(path) = &options.save {
        let written = save::to_json(&sim, &audio)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => info!(path = %path.display(), tick = sim.tick, "garden saved"),
            Err(e) => {
                eprintln!("Failed to save {}: {e}", path.display());
                std::process::exit(1);
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Parse arguments (without the program name). `Ok(None)` means help was
/// requested.
fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut options = Options::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                options.seed = parse_value(args.get(i), "--seed requires a number")?;
            }
            "--ticks" => {
                i += 1;
                options.ticks = parse_value(args.get(i), "--ticks requires a number")?;
            }
            "--config" => {
                i += 1;
                options.config = Some(path_value(args.get(i), "--config")?);
            }
            "--load" => {
                i += 1;
                options.load = Some(path_value(args.get(i), "--load")?);
            }
            "--save" => {
                i += 1;
                options.save = Some(path_value(args.get(i), "--save")?);
            }
            "--buy" => {
                i += 1;
                let name = args.get(i).ok_or("--buy requires an automation kind")?;
                options.buy.push(parse_kind(name)?);
            }
            "--dev" => options.dev = true,
            "--json" => options.json = true,
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("Unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(Some(options))
}

fn parse_value<T: std::str::FromStr>(arg: Option<&String>, message: &str) -> Result<T, String> {
    arg.and_then(|s| s.parse().ok())
        .ok_or_else(|| message.to_string())
}

fn path_value(arg: Option<&String>, flag: &str) -> Result<PathBuf, String> {
    arg.map(PathBuf::from)
        .ok_or_else(|| format!("{flag} requires a path"))
}

fn parse_kind(name: &str) -> Result<AutomationKind, String> {
    AutomationKind::ALL
        .into_iter()
        .find(|kind| kind.to_string().eq_ignore_ascii_case(name))
        .ok_or_else(|| format!("Unknown automation kind: {name} (expected harvester, planter or seller)"))
}

fn print_usage() {
    println!("Usage: garden [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --seed <N>          PRNG seed for a fresh garden (default: 1)");
    println!("  --ticks <N>         Ticks to run (default: 10000)");
    println!("  --config <PATH>     Game config JSON (default: built-in tuning)");
    println!("  --load <PATH>       Resume from a save file");
    println!("  --save <PATH>       Write the garden here after running");
    println!("  --buy <KIND>        Buy a harvester, planter or seller at the start");
    println!("  --dev               Apply the dev grant on the first tick");
    println!("  --json              Print the summary as JSON");
    println!("  --help, -h          Show this help");
}

fn read_config(path: Option<&PathBuf>) -> Result<GameConfig, String> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    GameConfig::from_json(&json).map_err(|e| format!("Bad config {}: {e}", path.display()))
}

/// Resume the saved garden if there is one, otherwise start fresh.
fn open_game(options: &Options, config: GameConfig) -> (SimState, AudioSettings) {
    let fresh = |config: GameConfig| (SimState::with_config(options.seed, config), AudioSettings::default());
    let Some(path) = &options.load else {
        return fresh(config);
    };

    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no saved game, starting fresh");
            return fresh(config);
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "save unreadable, starting fresh");
            return fresh(config);
        }
    };

    match save::from_json(&json, config.clone()) {
        Ok(loaded) => {
            info!(path = %path.display(), tick = loaded.state.tick, "garden loaded");
            (loaded.state, loaded.audio)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "save rejected, starting fresh");
            fresh(config)
        }
    }
}

/// Advance `options.ticks` ticks. The dev grant lands on the first tick and
/// purchases on the next, so a grant can pay for them.
fn run(sim: &mut SimState, options: &Options) -> Vec<SimEvent> {
    let target = sim.tick + options.ticks;
    let mut events = Vec::new();

    if options.dev && sim.tick < target {
        let input = TickInput {
            keys: KeyState {
                d_held: true,
                e_held: true,
                v_pressed: true,
            },
            ..TickInput::idle()
        };
        events.extend(sim.tick(&input, &[]).events);
    }

    if !options.buy.is_empty() && sim.tick < target {
        let purchases: Vec<SimAction> = options
            .buy
            .iter()
            .map(|&kind| SimAction::BuyAutomation { kind })
            .collect();
        events.extend(sim.tick(&TickInput::idle(), &purchases).events);
    }

    events.extend(sim.step(&[], target).events);
    events
}

fn print_summary(sim: &SimState, events: &[SimEvent], json: bool) {
    let alerts: Vec<&str> = events
        .iter()
        .filter_map(|e| match &e.kind {
            SimEventKind::Alert { text, .. } => Some(text.as_str()),
            SimEventKind::Sound { .. } => None,
        })
        .collect();
    let automations: Vec<String> = sim
        .automations
        .values()
        .map(|a| a.report())
        .collect();

    if json {
        let summary = serde_json::json!({
            "tick": sim.tick,
            "cash": sim.ledger.cash,
            "score": sim.ledger.score,
            "seeds": sim.ledger.total_seeds(),
            "harvested": sim.ledger.total_harvested(),
            "fertilizer": sim.ledger.fertilizer_count(),
            "plants": sim.live_plant_count(),
            "automations": automations,
            "alerts": alerts,
        });
        println!("{summary:#}");
        return;
    }

    println!("Tick {}", sim.tick);
    println!("  cash:       ${}", sim.ledger.cash);
    println!("  score:      {}", sim.ledger.score);
    println!("  seeds:      {}", sim.ledger.total_seeds());
    println!("  harvested:  {}", sim.ledger.total_harvested());
    println!("  fertilizer: {}", sim.ledger.fertilizer_count());
    println!("  plants:     {}", sim.live_plant_count());
    for line in &automations {
        println!("  {line}");
    }
    for alert in &alerts {
        println!("  ! {alert}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_arguments() {
        assert_eq!(parse_args(&[]), Ok(Some(Options::default())));
    }

    #[test]
    fn parses_every_flag() {
        let options = parse_args(&args(&[
            "--seed", "9", "--ticks", "50", "--load", "a.json", "--save", "b.json", "--buy",
            "Planter", "--buy", "seller", "--dev", "--json",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(options.seed, 9);
        assert_eq!(options.ticks, 50);
        assert_eq!(options.load, Some(PathBuf::from("a.json")));
        assert_eq!(options.save, Some(PathBuf::from("b.json")));
        assert_eq!(options.buy, vec![AutomationKind::Planter, AutomationKind::Seller]);
        assert!(options.dev && options.json);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&args(&["--seed"])).is_err());
        assert!(parse_args(&args(&["--ticks", "many"])).is_err());
        assert!(parse_args(&args(&["--buy", "gnome"])).is_err());
        assert!(parse_args(&args(&["--frobnicate"])).is_err());
        assert_eq!(parse_args(&args(&["-h"])), Ok(None));
    }

    #[test]
    fn run_advances_exactly_the_requested_ticks() {
        let options = Options {
            ticks: 25,
            dev: true,
            buy: vec![AutomationKind::Harvester],
            ..Options::default()
        };
        let mut sim = SimState::new(3);
        let events = run(&mut sim, &options);
        assert_eq!(sim.tick, 25);
        assert_eq!(sim.automation_count(AutomationKind::Harvester), 1);
        assert!(events.iter().any(
            |e| matches!(&e.kind, SimEventKind::Alert { text, .. } if text == "Dev Mode Activated!")
        ));
    }

    #[test]
    fn missing_save_starts_fresh() {
        let options = Options {
            seed: 77,
            load: Some(PathBuf::from("/nonexistent/garden-save.json")),
            ..Options::default()
        };
        let (sim, audio) = open_game(&options, GameConfig::default());
        assert_eq!(sim.tick, 0);
        assert_eq!(sim.seed, 77);
        assert_eq!(audio, AudioSettings::default());
    }
}
