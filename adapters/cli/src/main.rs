#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the zombie survival game in a terminal.

mod roster;

use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
    path::PathBuf,
    thread,
    time::Duration,
};

use anyhow::{ensure, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use survival_core::CharacterSnapshot;
use survival_rendering::{RenderingBackend, Scene, TextRenderer};
use survival_system_bootstrap::Bootstrap;
use survival_system_turn::{CommandSource, Config, Turn, TurnError, TurnPhase};
use survival_world::{self as world, query, World, WorldConfig};
use tracing_subscriber::EnvFilter;

/// Turn-based zombie survival on a small grid.
#[derive(Debug, Parser)]
#[command(name = "zombie-survival", version)]
struct Args {
    /// Number of grid rows.
    #[arg(long, default_value_t = WorldConfig::default().width())]
    width: u32,
    /// Number of grid columns.
    #[arg(long, default_value_t = WorldConfig::default().height())]
    height: u32,
    /// Each cell becomes an obstacle with probability 1 / ODDS; 0 disables obstacles.
    #[arg(long, value_name = "ODDS", default_value_t = WorldConfig::default().obstacle_odds())]
    obstacle_odds: u32,
    /// Seed for every random draw; a random seed is used when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file listing the characters and zombies to spawn.
    #[arg(long)]
    roster: Option<PathBuf>,
    /// Delay after each combat report and between turns, in milliseconds.
    #[arg(long, default_value_t = 500)]
    pause_ms: u64,
    /// Stop after this many turns even if zombies remain.
    #[arg(long)]
    max_ticks: Option<u64>,
}

/// Entry point for the zombie survival command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    ensure!(
        args.width > 0 && args.height > 0,
        "the grid needs at least one cell"
    );

    let roster = roster::load(args.roster.as_deref())?;
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "starting game");

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let config = WorldConfig::new(args.width, args.height, args.obstacle_odds);
    let mut world = World::generate(&config, &mut rng);

    let bootstrap = Bootstrap;
    let mut commands = Vec::new();
    bootstrap.populate(&roster, query::grid_view(&world), &mut rng, &mut commands);
    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    let pause = Duration::from_millis(args.pause_ms);
    let stdout = io::stdout();
    let mut renderer = TextRenderer::new(stdout.lock(), pause);
    println!("{}", bootstrap.welcome_banner(&world));
    renderer.report(&events)?;

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut turn = Turn::new(Config::new(rng.gen()));

    loop {
        renderer.present(&scene(&world))?;

        if query::character_view(&world).is_empty() {
            println!("No survivors remain.");
            break;
        }
        if args.max_ticks.is_some_and(|limit| turn.ticks() >= limit) {
            println!("Turn limit reached.");
            break;
        }

        let mut events = Vec::new();
        let result = {
            let mut input = TerminalInput::new(&mut reader, &mut renderer);
            turn.advance(&mut world, &mut input, &mut events)
        };
        renderer.report(&events)?;

        match result {
            Ok(TurnPhase::Terminal) => {
                renderer.present(&scene(&world))?;
                break;
            }
            Ok(_) => {}
            Err(TurnError::InputExhausted { name, .. }) => {
                tracing::info!(%name, "input closed, leaving the game");
                break;
            }
            Err(error) => return Err(error.into()),
        }

        if !pause.is_zero() {
            thread::sleep(pause);
        }
    }

    Ok(())
}

fn scene(world: &World) -> Scene {
    Scene::new(
        query::grid_view(world),
        query::character_view(world),
        query::zombie_view(world),
    )
}

/// Prompts through the renderer and reads whitespace-separated tokens from a reader.
struct TerminalInput<'a, R, B> {
    reader: &'a mut R,
    backend: &'a mut B,
    pending: VecDeque<String>,
}

impl<'a, R, B> TerminalInput<'a, R, B>
where
    R: BufRead,
    B: RenderingBackend,
{
    fn new(reader: &'a mut R, backend: &'a mut B) -> Self {
        Self {
            reader,
            backend,
            pending: VecDeque::new(),
        }
    }

    fn next_token(&mut self) -> Option<String> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }

            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => self
                    .pending
                    .extend(line.split_whitespace().map(str::to_owned)),
                Err(error) => {
                    tracing::warn!(%error, "failed to read a command");
                    return None;
                }
            }
        }
    }
}

impl<R, B> CommandSource for TerminalInput<'_, R, B>
where
    R: BufRead,
    B: RenderingBackend,
{
    fn next_command(&mut self, character: &CharacterSnapshot) -> Option<String> {
        if let Err(error) = self.backend.prompt(character) {
            tracing::warn!(%error, "failed to prompt for a command");
        }
        let token = self.next_token();
        if token.is_none() {
            // Keep the shell prompt on its own line after EOF.
            if let Err(error) = writeln!(io::stderr()) {
                tracing::warn!(%error, "failed to finish the prompt line");
            }
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survival_core::{CharacterId, Event, Position, Weapon};

    #[derive(Default)]
    struct Prompts(Vec<String>);

    impl RenderingBackend for Prompts {
        fn present(&mut self, _scene: &Scene) -> Result<()> {
            Ok(())
        }

        fn report(&mut self, _events: &[Event]) -> Result<()> {
            Ok(())
        }

        fn prompt(&mut self, character: &CharacterSnapshot) -> Result<()> {
            self.0.push(character.name.clone());
            Ok(())
        }
    }

    fn sylas() -> CharacterSnapshot {
        CharacterSnapshot {
            id: CharacterId::new(0),
            name: "Sylas".to_owned(),
            health: 100,
            position: Position::new(0, 0),
            weapon: Weapon::sword(),
        }
    }

    #[test]
    fn tokens_are_split_on_whitespace_and_blank_lines_skipped() {
        let mut reader = io::Cursor::new("\n  w  d\n\nS\n");
        let mut prompts = Prompts::default();
        let mut input = TerminalInput::new(&mut reader, &mut prompts);
        let character = sylas();

        let tokens: Vec<_> = (0..4)
            .map(|_| input.next_command(&character))
            .collect();

        assert_eq!(
            tokens,
            vec![
                Some("w".to_owned()),
                Some("d".to_owned()),
                Some("S".to_owned()),
                None,
            ]
        );
        assert_eq!(prompts.0.len(), 4);
    }

    #[test]
    fn arguments_default_to_the_classic_board() {
        let args = Args::parse_from(["zombie-survival"]);
        assert_eq!((args.width, args.height, args.obstacle_odds), (7, 7, 30));
        assert_eq!(args.pause_ms, 500);
        assert!(args.seed.is_none());
    }
}
