//! `mazerun-cli` – command line front end
//!
//! ```text
//! mazerun plan   <maze.toml>                 print the route and its turns
//! mazerun replay <maze.toml> <frames.json>   drive the walker over a recording
//! mazerun config                             show (and create) ~/.mazerun/config.toml
//! ```
//!
//! Ctrl-C raises the shared shutdown flag; the control loop stops the wheels
//! before its next tick.

mod config;
mod maze;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use mazerun_hal::SimRig;
use mazerun_planner::{AStarPlanner, PathSource, path_to_turns};
use mazerun_runtime::{
    ControlLoop, ControlLoopConfig, ExitReason, GuideKind, Pacing, Walker, init_tracing,
};
use mazerun_types::{Direction, GridPoint};

/// Proximity-guided maze walker
#[derive(Parser)]
#[command(name = "mazerun")]
#[command(about = "Plan maze routes and replay the walker over sensor recordings", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the route through a maze and the turns compiled from it
    Plan {
        /// Maze file (TOML)
        maze: PathBuf,
    },

    /// Drive the walker over a recorded sequence of sensor frames
    Replay {
        /// Maze file (TOML)
        maze: PathBuf,
        /// Sensor recording (JSON array of frames)
        frames: PathBuf,
    },

    /// Show the effective configuration, writing the default file if missing
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _telemetry = init_tracing("mazerun");

    print_banner();

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping the robot …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the run can only end on its own");
    }

    let result = match cli.command {
        Command::Plan { maze } => cmd_plan(&maze),
        Command::Replay { maze, frames } => cmd_replay(&maze, &frames, shutdown),
        Command::Config => cmd_config(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_plan(maze_path: &Path) -> Result<(), String> {
    let path = plan_route(maze_path)?;

    println!("  {} {} cells", "Route:".bold(), path.len());
    let cells: Vec<String> = path.iter().map(GridPoint::to_string).collect();
    println!("    {}", cells.join(" → ").dimmed());
    if path.len() < 2 {
        println!("  {} start is the goal, nothing to drive", "Turns:".bold());
    } else {
        let turns = path_to_turns(&path).map_err(|e| e.to_string())?;
        println!("  {} {}", "Turns:".bold(), format_turns(&turns));
    }
    Ok(())
}

fn cmd_replay(maze_path: &Path, frames_path: &Path, shutdown: Arc<AtomicBool>) -> Result<(), String> {
    let cfg = load_config();
    let path = plan_route(maze_path)?;
    let turns = script_for(cfg.guide, &path)?;
    let frames = maze::load_frames(frames_path)?;

    println!(
        "  Replaying {} frame(s) with the {} guide",
        frames.len(),
        cfg.guide.to_string().bold()
    );
    if cfg.guide == GuideKind::Scripted {
        println!("  Script {}", format_turns(&turns));
    }

    let walker = Walker::new(cfg.guide.build(turns), cfg.calibration.clone());
    let (sensor, drive) = SimRig::builder().with_frames(frames).build();
    let loop_config = ControlLoopConfig {
        tick_period: cfg.tick_period(),
        max_ticks: None,
    };
    let mut control = ControlLoop::new(walker, sensor, drive, loop_config).with_shutdown(shutdown);

    let summary = control.run(Pacing::Virtual).map_err(|e| e.to_string())?;
    info!(ticks = summary.ticks, exit = ?summary.exit, "replay finished");

    println!();
    for (i, decision) in summary.decisions.iter().enumerate() {
        println!(
            "    #{:<2} offered {:<32} chose {}",
            i + 1,
            decision.offered.to_string(),
            decision.chosen.to_string().bold()
        );
    }
    let exit = match summary.exit {
        ExitReason::Halted => "halted".green(),
        ExitReason::Shutdown => "shut down".yellow(),
        ExitReason::TickLimit => "tick limit".yellow(),
    };
    println!(
        "\n  {} after {} tick(s), {} wheel command(s) sent",
        exit,
        summary.ticks,
        control.drive().commands().len()
    );
    Ok(())
}

fn cmd_config() -> Result<(), String> {
    let path = config::config_path();
    let cfg = match config::load()? {
        Some(cfg) => {
            println!("  Config loaded from {}", path.display().to_string().bold());
            cfg
        }
        None => {
            let cfg = config::Config::default();
            config::save(&cfg)?;
            println!(
                "  {} Default config written to {}",
                "✓".green().bold(),
                path.display().to_string().bold()
            );
            cfg
        }
    };

    let mut effective = cfg;
    config::apply_env_overrides(&mut effective);
    let raw = toml::to_string_pretty(&effective)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    println!();
    for line in raw.lines() {
        println!("    {}", line);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn plan_route(maze_path: &Path) -> Result<Vec<GridPoint>, String> {
    let maze = maze::load_maze(maze_path)?;
    AStarPlanner::new(maze.grid)
        .find_path(maze.start, maze.end)
        .map_err(|e| e.to_string())
}

/// Instructions for the guide.  Only the scripted guide needs a compiled
/// route; the rule-based guides ignore it and accept any route.
fn script_for(guide: GuideKind, path: &[GridPoint]) -> Result<Vec<Direction>, String> {
    match guide {
        GuideKind::Scripted if path.len() < 2 => {
            Err("start and end are the same cell; there is no route to script".to_string())
        }
        GuideKind::Scripted => path_to_turns(path).map_err(|e| e.to_string()),
        GuideKind::RightHand | GuideKind::Straight => Ok(Vec::new()),
    }
}

/// File config (or defaults) with `MAZERUN_*` overrides applied.  A broken
/// file is reported and ignored.
fn load_config() -> config::Config {
    let mut cfg = match config::load() {
        Ok(Some(cfg)) => cfg,
        Ok(None) => config::Config::default(),
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };
    config::apply_env_overrides(&mut cfg);
    cfg
}

fn format_turns(turns: &[Direction]) -> String {
    if turns.is_empty() {
        return "(none)".dimmed().to_string();
    }
    let names: Vec<String> = turns.iter().map(Direction::to_string).collect();
    format!("[{}]", names.join(", ")).cyan().to_string()
}

fn print_banner() {
    println!();
    println!(
        "  {} {}",
        "mazerun".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Proximity-guided maze walker");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cells(raw: &[(i32, i32)]) -> Vec<GridPoint> {
        raw.iter().copied().map(GridPoint::from).collect()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["mazerun", "replay", "maze.toml", "frames.json"]).unwrap();
        match cli.command {
            Command::Replay { maze, frames } => {
                assert_eq!(maze, PathBuf::from("maze.toml"));
                assert_eq!(frames, PathBuf::from("frames.json"));
            }
            _ => panic!("expected replay"),
        }
        assert!(matches!(
            Cli::try_parse_from(["mazerun", "config"]).unwrap().command,
            Command::Config
        ));
    }

    #[test]
    fn missing_or_unknown_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["mazerun", "plan"]).is_err());
        assert!(Cli::try_parse_from(["mazerun", "replay", "maze.toml"]).is_err());
        assert!(Cli::try_parse_from(["mazerun", "plot", "maze.toml"]).is_err());
        assert!(Cli::try_parse_from(["mazerun"]).is_err());
    }

    #[test]
    fn rule_guides_accept_a_single_cell_route() {
        let path = cells(&[(3, 3)]);
        assert_eq!(script_for(GuideKind::RightHand, &path), Ok(Vec::new()));
        assert_eq!(script_for(GuideKind::Straight, &path), Ok(Vec::new()));

        let err = script_for(GuideKind::Scripted, &path).unwrap_err();
        assert!(err.contains("same cell"), "{err}");
    }

    #[test]
    fn scripted_guide_gets_compiled_turns() {
        let path = cells(&[(0, 2), (0, 1), (0, 0), (1, 0)]);
        assert_eq!(script_for(GuideKind::Scripted, &path), Ok(vec![Direction::RIGHT]));
        assert_eq!(script_for(GuideKind::RightHand, &path), Ok(Vec::new()));
    }

    #[test]
    fn reference_maze_plans_from_demo_file() {
        let demo = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/maze.toml");
        let path = plan_route(&demo).unwrap();
        assert_eq!(path.len(), 17);
        assert_eq!(
            script_for(GuideKind::Scripted, &path).unwrap(),
            vec![Direction::RIGHT, Direction::RIGHT, Direction::LEFT, Direction::LEFT]
        );
    }
}
