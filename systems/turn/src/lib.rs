#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestrator that drives one full game turn at a time.
//!
//! A tick walks the phases of [`TurnPhase`] in order: every character moves
//! sequentially on a command pulled from the [`CommandSource`], every zombie
//! then moves concurrently, fights are resolved once on the settled board, and
//! finally the game-over predicate decides whether another tick follows.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use survival_core::{CharacterId, CharacterSnapshot, Command, Event};
use survival_system_combat::Combat;
use survival_system_movement::{Movement, Pursuit};
use survival_world::{self as world, query, World, WorldError};
use thiserror::Error;

/// External collaborator that supplies one raw command token per character turn.
pub trait CommandSource {
    /// Returns the token for `character`, or `None` once input is exhausted.
    fn next_command(&mut self, character: &CharacterSnapshot) -> Option<String>;
}

/// Phases of a tick, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    /// Characters move one after another on external commands.
    AwaitingCharacterMoves,
    /// Zombies move concurrently.
    ZombiesMoving,
    /// Fights between co-located pairs are resolved.
    ResolvingCombat,
    /// The game-over predicate is evaluated.
    CheckingGameOver,
    /// No zombie with positive health remains.
    Terminal,
}

/// Failures that abort a tick.
#[derive(Debug, Error)]
pub enum TurnError {
    /// The command source ran dry before a character could move.
    #[error("input closed before {name} could move")]
    InputExhausted {
        /// Character that was waiting for a command.
        character: CharacterId,
        /// Display name of that character.
        name: String,
    },
    /// The concurrent zombie phase failed.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Configuration parameters required to construct the orchestrator.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration seeding zombie wandering and combat rolls.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Drives the game one tick at a time.
#[derive(Debug)]
pub struct Turn {
    phase: TurnPhase,
    ticks: u64,
    rng: ChaCha8Rng,
    movement: Movement,
    combat: Combat,
    commands: Vec<Command>,
    next_character: usize,
}

impl Turn {
    /// Creates an orchestrator waiting for the first round of character moves.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            phase: TurnPhase::AwaitingCharacterMoves,
            ticks: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            movement: Movement::new(),
            combat: Combat::new(),
            commands: Vec::new(),
            next_character: 0,
        }
    }

    /// Phase the next call to [`Turn::advance`] starts from.
    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Number of completed ticks.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Reports whether the game has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == TurnPhase::Terminal
    }

    /// Runs one full tick and returns the phase the game rests in afterwards.
    ///
    /// Events are appended to `out` in the order they happened. Once the game
    /// is over every further call returns [`TurnPhase::Terminal`] immediately.
    ///
    /// An error leaves the tick resumable: after [`TurnError::InputExhausted`]
    /// the next call asks only the characters that have not moved yet, and
    /// after a failed zombie phase it continues with combat, since the zombies
    /// whose tasks succeeded have already moved.
    pub fn advance(
        &mut self,
        world: &mut World,
        input: &mut dyn CommandSource,
        out: &mut Vec<Event>,
    ) -> Result<TurnPhase, TurnError> {
        if self.phase == TurnPhase::AwaitingCharacterMoves
            && self.next_character == 0
            && query::is_game_over(world)
        {
            self.finish(out);
        }

        loop {
            tracing::debug!(tick = self.ticks, phase = ?self.phase, "entering phase");
            match self.phase {
                TurnPhase::AwaitingCharacterMoves => {
                    self.move_characters(world, input, out)?;
                    self.phase = TurnPhase::ZombiesMoving;
                }
                TurnPhase::ZombiesMoving => {
                    let pursuit = Pursuit::new(self.rng.gen());
                    let moved = world::advance_zombies(
                        world,
                        |zombie, surroundings| pursuit.destination(zombie, surroundings),
                        out,
                    );
                    self.phase = TurnPhase::ResolvingCombat;
                    moved?;
                }
                TurnPhase::ResolvingCombat => {
                    self.resolve_combat(world, out);
                    self.phase = TurnPhase::CheckingGameOver;
                }
                TurnPhase::CheckingGameOver => {
                    self.ticks = self.ticks.saturating_add(1);
                    if query::is_game_over(world) {
                        self.finish(out);
                    } else {
                        self.phase = TurnPhase::AwaitingCharacterMoves;
                    }
                    return Ok(self.phase);
                }
                TurnPhase::Terminal => return Ok(TurnPhase::Terminal),
            }
        }
    }

    fn move_characters(
        &mut self,
        world: &mut World,
        input: &mut dyn CommandSource,
        out: &mut Vec<Event>,
    ) -> Result<(), TurnError> {
        let characters = query::character_view(world);
        for character in characters.iter().skip(self.next_character) {
            let Some(token) = input.next_command(character) else {
                return Err(TurnError::InputExhausted {
                    character: character.id,
                    name: character.name.clone(),
                });
            };

            self.commands.clear();
            if self
                .movement
                .handle(character.id, &token, &mut self.commands)
                .is_err()
            {
                out.push(Event::MoveRejected {
                    character: character.id,
                    input: token,
                });
            } else {
                for command in self.commands.drain(..) {
                    world::apply(world, command, out);
                }
            }
            self.next_character += 1;
        }
        self.next_character = 0;
        Ok(())
    }

    fn resolve_combat(&mut self, world: &mut World, out: &mut Vec<Event>) {
        self.commands.clear();
        self.combat.handle(
            &query::character_view(world),
            &query::zombie_view(world),
            &mut self.rng,
            &mut self.commands,
        );
        for command in self.commands.drain(..) {
            world::apply(world, command, out);
        }
    }

    fn finish(&mut self, out: &mut Vec<Event>) {
        tracing::info!(ticks = self.ticks, "every zombie has been defeated");
        self.phase = TurnPhase::Terminal;
        out.push(Event::GameOver { ticks: self.ticks });
    }
}
