//! Skyline - headless level runner
//!
//! Loads a level, feeds it scripted input for a number of ticks and logs
//! what happened. Set `RUST_LOG=debug` to see per-tick status lines.

mod script;

use std::cell::Cell;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use skyline_game::{ConfigError, LevelDefinition, LevelError, LevelSession, SessionConfig, SessionEvent};

use crate::script::{Script, ScriptError};

#[derive(Parser)]
#[command(name = "skyline")]
#[command(about = "Run a skyline level headlessly with scripted input", long_about = None)]
struct Cli {
    /// Built-in level to run
    #[arg(short, long, default_value = "hub")]
    level: String,

    /// Load the level from a TOML file instead
    #[arg(long)]
    level_file: Option<PathBuf>,

    /// Session config (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ticks to simulate. Defaults to the end of the script, or 600.
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Input script
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Keep running after the level completes
    #[arg(long)]
    keep_going: bool,

    /// List built-in levels and exit
    #[arg(long)]
    list: bool,
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("unknown level '{0}' (try --list)")]
    UnknownLevel(String),
    #[error("failed to read {}: {source}", .path.display())]
    ScriptIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Script(#[from] ScriptError),
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list {
        for name in LevelDefinition::builtin_names() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), RunError> {
    let config = match &cli.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };

    let level = match &cli.level_file {
        Some(path) => LevelDefinition::from_file(path)?,
        None => LevelDefinition::by_name(&cli.level).ok_or_else(|| RunError::UnknownLevel(cli.level.clone()))?,
    };

    let script = match &cli.script {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| RunError::ScriptIo {
                path: path.clone(),
                source,
            })?;
            Script::parse(&text)?
        }
        None => Script::default(),
    };

    let ticks = cli
        .ticks
        .unwrap_or_else(|| if script.end() > 0 { script.end() } else { 600 });

    let completed = Rc::new(Cell::new(false));
    let flag = completed.clone();
    let mut session = LevelSession::new(level, config, Box::new(move || flag.set(true)))?;
    session.input_mut().set_pointer_captured(true);

    log::info!("running '{}' for {} ticks", session.definition().name, ticks);

    let mut held = BTreeSet::new();
    for tick in 0..ticks {
        script.apply(tick, &mut held, session.input_mut());

        let report = session.tick();
        for event in &report.events {
            match event {
                SessionEvent::SpeedChanged { .. } => log::debug!("tick {}: {:?}", tick, event),
                _ => log::info!("tick {}: {:?}", tick, event),
            }
        }

        if completed.get() && !cli.keep_going {
            break;
        }
    }

    let actor = session.actor();
    let camera = session.camera();
    println!("level:       {}", session.definition().name);
    println!("ticks:       {}", session.ticks());
    println!(
        "actor:       ({:.3}, {:.3}, {:.3}) facing {:.3} {:?}",
        actor.position.x, actor.position.y, actor.position.z, actor.facing, actor.phase
    );
    println!(
        "camera:      ({:.3}, {:.3}, {:.3}){}",
        camera.position.x,
        camera.position.y,
        camera.position.z,
        if camera.occluded { " occluded" } else { "" }
    );
    println!(
        "checkpoints: {}/{}",
        session.checkpoints_passed(),
        session.checkpoints().total()
    );
    println!("complete:    {}", session.is_complete());

    session.teardown();
    Ok(())
}
