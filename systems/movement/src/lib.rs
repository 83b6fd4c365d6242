#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement policy for both sides of the game.
//!
//! Characters move on external `W`/`A`/`S`/`D` commands translated by
//! [`Movement`]; zombies decide their own step through [`Pursuit`]. Neither
//! mutates the world: character steps become [`Command::StepCharacter`] and
//! zombie steps are answered as destinations to the world's concurrent
//! zombie phase, which performs the final validity check.

mod pursuit;

pub use pursuit::{Pursuit, PursuitDecision, ZONE_SCAN_ORDER};

use survival_core::{CharacterId, Command, Direction, DirectionError};

/// Pure system that turns raw input tokens into character step commands.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits a step command for `character` when `input` names a direction.
    ///
    /// Unrecognised input leaves `out` untouched and is returned to the caller
    /// so it can be reported; the character forfeits its move.
    pub fn handle(
        &self,
        character: CharacterId,
        input: &str,
        out: &mut Vec<Command>,
    ) -> Result<Direction, DirectionError> {
        let direction = Direction::from_token(input)?;
        out.push(Command::StepCharacter {
            character,
            direction,
        });
        Ok(direction)
    }
}
