#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that populates a freshly generated world.

use rand::Rng;
use serde::Deserialize;
use survival_core::{Command, GridView, Position, Weapon};
use survival_world::{query, World};
use thiserror::Error;

/// Character entry of a roster.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CharacterSpec {
    /// Display name.
    pub name: String,
    /// Starting health.
    pub health: u32,
    /// Equipped weapon; a sword when omitted.
    #[serde(default = "Weapon::sword")]
    pub weapon: Weapon,
}

/// Zombie entry of a roster.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ZombieSpec {
    /// Display name.
    pub name: String,
    /// Starting health.
    pub health: u32,
}

/// Everyone who takes part in a game, in spawn order.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Roster {
    /// Player-controlled characters.
    #[serde(default)]
    pub characters: Vec<CharacterSpec>,
    /// Autonomous zombies.
    #[serde(default)]
    pub zombies: Vec<ZombieSpec>,
}

impl Roster {
    /// Checks that every entry can take part in a game.
    pub fn validate(&self) -> Result<(), RosterError> {
        if self.zombies.is_empty() {
            return Err(RosterError::NoZombies);
        }

        let names = self
            .characters
            .iter()
            .map(|character| (&character.name, character.health))
            .chain(self.zombies.iter().map(|zombie| (&zombie.name, zombie.health)));
        for (name, health) in names {
            if name.trim().is_empty() {
                return Err(RosterError::UnnamedEntry);
            }
            if health == 0 {
                return Err(RosterError::NoHealth(name.clone()));
            }
        }
        Ok(())
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            characters: vec![
                CharacterSpec {
                    name: "Sylas".to_owned(),
                    health: 100,
                    weapon: Weapon::sword(),
                },
                CharacterSpec {
                    name: "Elsa".to_owned(),
                    health: 80,
                    weapon: Weapon::sword(),
                },
            ],
            zombies: vec![
                ZombieSpec {
                    name: "Walker".to_owned(),
                    health: 10,
                },
                ZombieSpec {
                    name: "Runner".to_owned(),
                    health: 15,
                },
            ],
        }
    }
}

/// Reasons a roster cannot start a game.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RosterError {
    /// The game would be over before it began.
    #[error("the roster must contain at least one zombie")]
    NoZombies,
    /// An entry has an empty name.
    #[error("every roster entry needs a name")]
    UnnamedEntry,
    /// An entry starts without health.
    #[error("'{0}' must start with positive health")]
    NoHealth(String),
}

/// Produces data required to greet the player and seed the world.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Emits one spawn command per roster entry, characters first.
    ///
    /// Starting positions are drawn uniformly over the whole grid, `x` then
    /// `y`, without re-rolling cells that hold an obstacle.
    pub fn populate<R>(&self, roster: &Roster, grid: GridView<'_>, rng: &mut R, out: &mut Vec<Command>)
    where
        R: Rng + ?Sized,
    {
        let (width, height) = grid.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        out.reserve(roster.characters.len() + roster.zombies.len());
        for character in &roster.characters {
            out.push(Command::SpawnCharacter {
                name: character.name.clone(),
                health: character.health,
                weapon: character.weapon.clone(),
                position: random_position(width, height, rng),
            });
        }
        for zombie in &roster.zombies {
            out.push(Command::SpawnZombie {
                name: zombie.name.clone(),
                health: zombie.health,
                position: random_position(width, height, rng),
            });
        }
    }
}

fn random_position<R>(width: u32, height: u32, rng: &mut R) -> Position
where
    R: Rng + ?Sized,
{
    let x = rng.gen_range(0..width);
    let y = rng.gen_range(0..height);
    Position::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use survival_world::Grid;

    #[test]
    fn default_roster_is_valid() {
        assert_eq!(Roster::default().validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_unplayable_rosters() {
        let mut roster = Roster::default();
        roster.zombies.clear();
        assert_eq!(roster.validate(), Err(RosterError::NoZombies));

        let mut roster = Roster::default();
        roster.characters[1].health = 0;
        assert_eq!(roster.validate(), Err(RosterError::NoHealth("Elsa".to_owned())));

        let mut roster = Roster::default();
        roster.zombies[0].name = "  ".to_owned();
        assert_eq!(roster.validate(), Err(RosterError::UnnamedEntry));
    }

    #[test]
    fn populate_emits_characters_before_zombies_inside_bounds() {
        let grid = Grid::open(4, 6);
        let mut commands = Vec::new();
        Bootstrap.populate(
            &Roster::default(),
            grid.view(),
            &mut ChaCha8Rng::seed_from_u64(99),
            &mut commands,
        );

        assert_eq!(commands.len(), 4);
        for (index, command) in commands.iter().enumerate() {
            let position = match (index, command) {
                (0 | 1, Command::SpawnCharacter { position, .. }) => *position,
                (2 | 3, Command::SpawnZombie { position, .. }) => *position,
                other => panic!("unexpected command order: {other:?}"),
            };
            assert!(position.x() < 4 && position.y() < 6, "{position}");
        }
    }

    #[test]
    fn populate_skips_empty_grids() {
        let grid = Grid::open(0, 0);
        let mut commands = Vec::new();
        Bootstrap.populate(
            &Roster::default(),
            grid.view(),
            &mut ChaCha8Rng::seed_from_u64(1),
            &mut commands,
        );
        assert!(commands.is_empty());
    }
}
