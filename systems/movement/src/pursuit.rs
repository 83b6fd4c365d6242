//! Zone-based pursuit heuristic for zombies.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use survival_core::{Direction, Position, Surroundings, ZombieSnapshot};

/// Offsets `(dx, dy)` scanned around a zombie, highest priority first.
///
/// Own cell, then east, west, north, south, north-east, south-west,
/// south-east and north-west.
pub const ZONE_SCAN_ORDER: [(i32, i32); 9] = [
    (0, 0),
    (0, 1),
    (0, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (1, -1),
    (1, 1),
    (-1, -1),
];

/// Largest Manhattan distance at which a character can still sit in the 3x3 zone.
const ZONE_REACH: u32 = 2;

/// Outcome of a single zombie's decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PursuitDecision {
    /// A character shares the zombie's cell; stay and fight.
    Hold,
    /// A character stands on this neighbouring cell; jump onto it.
    Pounce(Position),
    /// Nobody nearby; try one step in this direction.
    Wander(Direction),
}

/// Per-tick pursuit policy.
///
/// Random walks draw from a `ChaCha8Rng` seeded with the tick seed and using
/// the zombie id as stream, so a zombie's choice does not depend on the order
/// in which concurrent tasks run.
#[derive(Clone, Copy, Debug)]
pub struct Pursuit {
    tick_seed: u64,
}

impl Pursuit {
    /// Creates the policy for one tick.
    #[must_use]
    pub const fn new(tick_seed: u64) -> Self {
        Self { tick_seed }
    }

    /// Decides what the zombie wants to do this tick.
    #[must_use]
    pub fn decide(&self, zombie: &ZombieSnapshot, surroundings: &Surroundings<'_>) -> PursuitDecision {
        let origin = zombie.position;
        let nearby = surroundings
            .characters
            .closest_to(origin)
            .is_some_and(|closest| origin.manhattan_distance(closest.position) <= ZONE_REACH);

        if nearby {
            for (dx, dy) in ZONE_SCAN_ORDER {
                let Some(cell) = origin.offset(dx, dy) else {
                    continue;
                };
                if surroundings.characters.at(cell).is_some() {
                    return if cell == origin {
                        PursuitDecision::Hold
                    } else {
                        PursuitDecision::Pounce(cell)
                    };
                }
            }
        }

        PursuitDecision::Wander(self.wander_direction(zombie))
    }

    /// Resolves the decision into the cell the zombie should occupy next.
    ///
    /// Invalid destinations keep the zombie where it is.
    #[must_use]
    pub fn destination(&self, zombie: &ZombieSnapshot, surroundings: &Surroundings<'_>) -> Position {
        let origin = zombie.position;
        let decision = self.decide(zombie, surroundings);
        let target = match decision {
            PursuitDecision::Hold => None,
            PursuitDecision::Pounce(cell) => Some(cell),
            PursuitDecision::Wander(direction) => origin.step(direction),
        };

        tracing::debug!(zombie = zombie.id.get(), ?decision, "zombie decided");
        target
            .filter(|cell| surroundings.grid.is_valid_position(*cell))
            .unwrap_or(origin)
    }

    fn wander_direction(&self, zombie: &ZombieSnapshot) -> Direction {
        let mut rng = ChaCha8Rng::seed_from_u64(self.tick_seed);
        rng.set_stream(u64::from(zombie.id.get()));
        Direction::CARDINAL[rng.gen_range(0..Direction::CARDINAL.len())]
    }
}
